use reqwest::header::{self, HeaderMap, HeaderValue};
use url::Url;

// ── Constants ────────────────────────────────────────────────────────────────

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "it-IT,it;q=0.9,en;q=0.8";
const ACCEPT_ENCODING: &str = "gzip, deflate, br";
const MAX_REDIRECTS: usize = 10;

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),
    #[error("{0}")]
    Request(String),
}

// ── Fetcher ──────────────────────────────────────────────────────────────────

/// Outbound HTTP client that presents itself as a desktop browser.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(insecure_ssl: bool) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE));
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static(ACCEPT_ENCODING));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let mut builder = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .default_headers(headers);

        if insecure_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self { client })
    }

    /// GETs `url` and returns the whole body as text.
    pub async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let url = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Request(format!("TimeoutError: {}", e))
            } else if e.is_connect() {
                FetchError::Request(format!("ConnectError: {}", e))
            } else {
                FetchError::Request(format!("RequestError: {}", e))
            }
        })?;

        let status = response.status();
        tracing::debug!(%url, %status, "fetched page");

        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_fetch_sends_browser_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/product")
            .match_header("user-agent", Matcher::Regex("Chrome/120".into()))
            .match_header("accept-language", ACCEPT_LANGUAGE)
            .match_header("upgrade-insecure-requests", "1")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<title>Widget</title>")
            .create_async()
            .await;

        let fetcher = PageFetcher::new(false).unwrap();
        let body = fetcher
            .fetch_html(&format!("{}/product", server.url()))
            .await
            .unwrap();

        assert_eq!(body, "<title>Widget</title>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = PageFetcher::new(false).unwrap();
        let err = fetcher
            .fetch_html(&format!("{}/missing", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status(s) if s.as_u16() == 404));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let fetcher = PageFetcher::new(false).unwrap();
        let err = fetcher.fetch_html("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
        assert!(err.to_string().starts_with("Invalid URL"));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        let fetcher = PageFetcher::new(false).unwrap();
        let err = fetcher.fetch_html("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, FetchError::Request(_)));
    }
}
