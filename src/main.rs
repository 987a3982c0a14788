mod analytics;
mod config;
mod entrypoints;
mod error;
mod handlers;
mod holiday_api;
mod server;
mod time_api;

use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::server::AppState;

/// Loads configuration, builds the shared state once and serves the metered
/// entrypoints until the process is stopped.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tz_meter=info")),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: time provider {}, holiday provider {}",
        config.time_api_url, config.holiday_api_url
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = server::app(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
