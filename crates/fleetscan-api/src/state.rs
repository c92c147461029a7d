//! Application state shared across all handlers.

use std::sync::Arc;

use fleetscan_core::config::AppConfig;
use fleetscan_engine::ExtractionEngine;
use fleetscan_store::JobStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// The job store, for snapshot reads.
    pub store: Arc<JobStore>,
    /// The extraction engine, for submissions and cancels.
    pub engine: Arc<ExtractionEngine>,
}

impl AppState {
    /// Assemble the state from its already-constructed parts.
    pub fn new(config: Arc<AppConfig>, engine: Arc<ExtractionEngine>) -> Self {
        let store = Arc::clone(engine.store());
        Self {
            config,
            store,
            engine,
        }
    }
}
