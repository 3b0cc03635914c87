// HVAC directory server entry point
//
// Usage: cargo run --bin api_server
// Configuration: PORT, HVAC_SITE_URL, HVAC_DATA_SOURCE, HVAC_TABLE_PATH

use hvac_directory::{create_router, AppConfig, AppState, DataSourceConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "hvac_directory=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting HVAC directory server...");

    let config = AppConfig::from_env()?;

    tracing::info!("Configuration:");
    tracing::info!("  PORT: {}", config.port);
    tracing::info!("  HVAC_SITE_URL: {}", config.site_url);
    match &config.data_source {
        DataSourceConfig::Sample => tracing::info!("  HVAC_DATA_SOURCE: sample"),
        DataSourceConfig::Table { path } => {
            tracing::info!("  HVAC_DATA_SOURCE: table");
            tracing::info!("  HVAC_TABLE_PATH: {}", path.display());
        }
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!("Initializing application state...");
    let state = AppState::new(config).await?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
