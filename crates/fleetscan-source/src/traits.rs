//! The identifier source interface.

use async_trait::async_trait;

use crate::error::SourceError;

/// Anything that can produce an ordered sequence of raw MC numbers.
#[async_trait]
pub trait IdentifierSource: Send + Sync {
    /// Produce the identifier list, already normalized and de-duplicated
    /// in first-occurrence order. An empty result is not an error here;
    /// job creation rejects it.
    async fn fetch_identifiers(&self) -> Result<Vec<String>, SourceError>;
}
