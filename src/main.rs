//! NexoPark API
//! Mission: Authenticate parking administrators and gate the vehicle registry by role

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use nexopark_backend::{
    api::{create_router, AppState},
    config::{AppConfig, Cli},
};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    // Configuration errors are fatal: never serve traffic without a signing key
    let config = AppConfig::try_from(Cli::parse()).map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!("NexoPark API starting (issuer: {})", config.jwt_issuer);

    let state = AppState::from_config(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("API server listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("NexoPark API stopped");
    Ok(())
}

/// Initialize tracing with an env-overridable filter
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nexopark_backend=debug,nexopark=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // Standard dotenv search (cwd + parents); a missing file is fine
    let _ = dotenv();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
