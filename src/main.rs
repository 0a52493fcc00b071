//! Prensa-Oxide service entrypoint
//!
//! Boots the HTTP API in front of the extraction pipeline: tracing, config
//! from environment, then the axum server with graceful shutdown.

use prensa_oxide::config::Config;
use prensa_oxide::server;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first; the log level may come from it
    let config = Config::from_env()?;

    // RUST_LOG wins over the configured level
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.parse::<Level>().ok())
        .or_else(|| config.log_level.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    info!("Prensa-Oxide Server v{}", prensa_oxide::VERSION);
    info!(
        "Configuration loaded: host={}, port={}, headless={}",
        config.host, config.port, config.headless
    );

    server::serve(config).await?;

    Ok(())
}
