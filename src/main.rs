mod config;
mod extract;
mod fetch;
mod models;
mod routes;

use config::Config;
use fetch::PageFetcher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env().map_err(|e| {
        tracing::error!("invalid configuration: {}", e);
        e
    })?;

    let fetcher = PageFetcher::new(config.insecure_ssl)?;
    let app = routes::router(fetcher);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
