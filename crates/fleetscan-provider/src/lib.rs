//! # fleetscan-provider
//!
//! The lookup provider capability: given one MC number, return a
//! structured carrier record or a classified failure.
//!
//! Two interchangeable implementations exist — the public carrier
//! snapshot portal and a hosted extraction API — selected at startup by
//! configuration. The engine only sees the [`LookupProvider`] trait.

pub mod error;
pub mod hosted;
pub mod portal;
pub mod traits;

use std::sync::Arc;
use std::time::Duration;

use fleetscan_core::config::provider::ProviderConfig;
use fleetscan_core::{AppError, AppResult};

pub use error::LookupError;
pub use hosted::HostedApiProvider;
pub use portal::SaferPortalProvider;
pub use traits::LookupProvider;

/// Build the configured lookup provider strategy.
///
/// `timeout` bounds each outbound request; the engine additionally wraps
/// every lookup in the same timeout so no attempt can block past it.
pub fn build_provider(
    config: &ProviderConfig,
    timeout: Duration,
) -> AppResult<Arc<dyn LookupProvider>> {
    match config.mode.as_str() {
        "portal" => {
            let provider = SaferPortalProvider::new(&config.portal_base_url, timeout)?;
            Ok(Arc::new(provider))
        }
        "hosted" => {
            if config.hosted_api_key.is_empty() {
                return Err(AppError::configuration(
                    "provider.hosted_api_key is required when provider.mode = \"hosted\"",
                ));
            }
            let provider = HostedApiProvider::new(
                &config.hosted_base_url,
                &config.hosted_actor_id,
                &config.hosted_api_key,
                timeout,
            )?;
            Ok(Arc::new(provider))
        }
        other => Err(AppError::configuration(format!(
            "Unknown provider mode '{other}' (expected \"portal\" or \"hosted\")"
        ))),
    }
}
