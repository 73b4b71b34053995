//! Vatrec API Server
//!
//! Main entry point for the VAT reconciliation service.

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vatrec_api::{AppState, create_router};
use vatrec_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vatrec=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Access policy is fixed for the lifetime of the process
    let state = AppState::from_config(&config);
    if state.api_key.is_enforced() {
        info!("API key authentication enabled");
    } else {
        warn!("No API key configured; all requests are accepted");
    }
    info!(
        tolerance = %config.vat.tolerance,
        known_rates = ?config.vat.known_rates,
        max_rows = config.vat.max_rows,
        "VAT engine configured"
    );

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
