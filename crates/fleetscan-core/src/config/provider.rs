//! Lookup provider configuration.

use serde::{Deserialize, Serialize};

/// Lookup provider selection and endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Which provider implementation to use: `"portal"` or `"hosted"`.
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Base URL of the public carrier-snapshot portal.
    #[serde(default = "default_portal_base_url")]
    pub portal_base_url: String,
    /// Base URL of the hosted extraction API.
    #[serde(default = "default_hosted_base_url")]
    pub hosted_base_url: String,
    /// Actor/task identifier on the hosted API.
    #[serde(default = "default_hosted_actor_id")]
    pub hosted_actor_id: String,
    /// Bearer token for the hosted API. Required when `mode = "hosted"`.
    #[serde(default)]
    pub hosted_api_key: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            portal_base_url: default_portal_base_url(),
            hosted_base_url: default_hosted_base_url(),
            hosted_actor_id: default_hosted_actor_id(),
            hosted_api_key: String::new(),
        }
    }
}

fn default_mode() -> String {
    "portal".to_string()
}

fn default_portal_base_url() -> String {
    "https://mobile.fmcsa.dot.gov/qc/services".to_string()
}

fn default_hosted_base_url() -> String {
    "https://api.apify.com/v2".to_string()
}

fn default_hosted_actor_id() -> String {
    "fmcsa-scraper".to_string()
}
