use std::net::{Ipv4Addr, SocketAddr};

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// Accept invalid TLS certificates on outbound fetches.
    pub insecure_ssl: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::var("PORT").ok(),
            std::env::var("OG_PREVIEW_INSECURE_SSL").ok(),
        )
    }

    pub fn from_vars(port: Option<String>, insecure_ssl: Option<String>) -> Result<Self, ConfigError> {
        let port = match port.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_PORT,
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.to_string()))?,
        };

        Ok(Self {
            port,
            insecure_ssl: insecure_ssl.as_deref() == Some("1"),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}
