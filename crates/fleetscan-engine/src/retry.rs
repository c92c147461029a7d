//! Per-attempt retry policy.

use std::time::Duration;

use fleetscan_provider::LookupError;

/// Failure reason recorded when a record exhausts its attempt budget.
pub const MAX_RETRIES_EXCEEDED: &str = "max_retries_exceeded";

/// What to do with a record after a failed lookup attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Re-queue the record after the delay.
    Retry {
        /// Fixed pause before the next attempt.
        delay: Duration,
    },
    /// Finalize the record as failed with this reason.
    GiveUp {
        /// Terminal failure classification.
        reason: String,
    },
}

/// Decides, after each failed attempt, whether an identifier gets
/// another try.
///
/// Transient failures are retried up to `max_attempts` with a fixed
/// delay; the global rate limiter is the pacing authority, so the delay
/// does not grow. Permanent failures give up immediately.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    retry_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy with an attempt budget and fixed inter-attempt delay.
    pub fn new(max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    /// Maximum attempts per identifier.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decide the fate of a record whose `attempt`-th lookup just failed.
    pub fn decide(&self, attempt: u32, error: &LookupError) -> RetryDecision {
        if !error.is_transient() {
            return RetryDecision::GiveUp {
                reason: error.reason().to_string(),
            };
        }
        if attempt >= self.max_attempts {
            return RetryDecision::GiveUp {
                reason: MAX_RETRIES_EXCEEDED.to_string(),
            };
        }
        RetryDecision::Retry {
            delay: self.retry_delay,
        }
    }
}
