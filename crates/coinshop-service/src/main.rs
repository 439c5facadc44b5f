//! Coinshop Service - HTTP API for coin transfers and merch purchases
//!
//! This is the main entry point for the coinshop service.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coinshop_service::{create_router, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,coinshop=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Coinshop Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env()?;

    tracing::info!(
        listen_addr = %config.listen_addr,
        storage_backend = ?config.storage_backend,
        database_configured = %config.database_url.is_some(),
        items_path = ?config.items_path,
        token_ttl_seconds = config.token_ttl_seconds,
        "Service configuration loaded"
    );

    // Open the store, load the catalog, set up token signing
    let state = AppState::from_config(config.clone()).await?;

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
