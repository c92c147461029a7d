//! Identifier source over caller-supplied text.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::parse;
use crate::traits::IdentifierSource;

/// Wraps the body of an uploaded file or pasted text.
pub struct InlineSource {
    content: String,
}

impl InlineSource {
    /// Wrap raw text content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[async_trait]
impl IdentifierSource for InlineSource {
    async fn fetch_identifiers(&self) -> Result<Vec<String>, SourceError> {
        Ok(parse::extract_identifiers(&self.content))
    }
}
