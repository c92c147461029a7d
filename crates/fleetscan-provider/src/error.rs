//! Lookup failure taxonomy.

use thiserror::Error;

/// Failure of a single lookup attempt.
///
/// Transient variants are retried by the engine's retry policy;
/// permanent ones finalize the record immediately.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// The attempt did not complete within the request timeout.
    #[error("lookup timed out")]
    Timeout,

    /// The identifier has no carrier behind it.
    #[error("carrier not found")]
    NotFound,

    /// The provider asked us to back off.
    #[error("provider rate limit hit")]
    RateLimited,

    /// A 5xx-equivalent or transport-level failure.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The provider answered with something we cannot interpret.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl LookupError {
    /// Whether the retry policy may try this identifier again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::RateLimited | Self::Unavailable(_)
        )
    }

    /// Short classification string stored as a record's failure reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Unavailable(_) => "unavailable",
            Self::Malformed(_) => "malformed_response",
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        if err.is_decode() {
            return Self::Malformed(err.to_string());
        }
        Self::Unavailable(err.to_string())
    }
}

/// Map an HTTP status the provider returned into a lookup error.
pub(crate) fn from_status(status: reqwest::StatusCode) -> LookupError {
    if status == reqwest::StatusCode::NOT_FOUND {
        LookupError::NotFound
    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        LookupError::RateLimited
    } else {
        LookupError::Unavailable(format!("HTTP {status}"))
    }
}
