//! Extraction engine configuration.

use serde::{Deserialize, Serialize};

/// Extraction engine configuration.
///
/// `requests_per_minute` caps the sustained outbound lookup rate for the
/// whole process; `concurrency` bounds simultaneous in-flight lookups per
/// job and should stay small relative to the rate ceiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Token bucket capacity: sustained lookups per minute.
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
    /// Maximum lookup attempts per identifier.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Per-lookup timeout in seconds; also the fixed delay between
    /// retry attempts.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Number of concurrent in-flight lookups per job.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            max_retries: default_max_retries(),
            request_timeout_seconds: default_request_timeout(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_requests_per_minute() -> u32 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_request_timeout() -> u64 {
    30
}

fn default_concurrency() -> usize {
    4
}
