//! Identifier source failure taxonomy.

use thiserror::Error;

use fleetscan_core::AppError;

/// Failure to produce an identifier list.
///
/// Source failures surface at job creation time; no partial job is ever
/// persisted when one occurs.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The source exists but could not be reached or read.
    #[error("identifier source unavailable: {0}")]
    Unavailable(String),

    /// The requested file or repository does not exist.
    #[error("identifier source not found: {0}")]
    NotFound(String),
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Unavailable(message) => AppError::service_unavailable(message),
            SourceError::NotFound(message) => AppError::not_found(message),
        }
    }
}
