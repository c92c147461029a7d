//! FleetScan Server — FMCSA carrier data extraction service.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use fleetscan_api::{AppState, build_router};
use fleetscan_core::config::AppConfig;
use fleetscan_core::error::AppError;
use fleetscan_engine::ExtractionEngine;
use fleetscan_store::JobStore;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("FLEETSCAN_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting FleetScan v{}", env!("CARGO_PKG_VERSION"));

    let request_timeout = Duration::from_secs(config.engine.request_timeout_seconds);
    let provider = fleetscan_provider::build_provider(&config.provider, request_timeout)?;
    tracing::info!(
        "Lookup provider: '{}', rate limit: {}/min, concurrency: {}",
        provider.name(),
        config.engine.requests_per_minute,
        config.engine.concurrency
    );

    let store = Arc::new(JobStore::new());
    let engine = Arc::new(ExtractionEngine::new(
        config.engine.clone(),
        Arc::clone(&store),
        provider,
    ));

    let config = Arc::new(config);
    let state = AppState::new(Arc::clone(&config), engine);
    let router = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolve when a shutdown signal arrives.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
