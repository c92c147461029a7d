//! The lookup capability interface.

use async_trait::async_trait;

use fleetscan_entity::carrier::model::CarrierRecord;

use crate::error::LookupError;

/// A strategy that resolves one MC number into a carrier record.
///
/// Implementations must fail rather than block past their configured
/// timeout; the engine treats an elapsed timeout as a transient failure.
#[async_trait]
pub trait LookupProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Look up a single carrier by its normalized MC number.
    async fn lookup(&self, mc_number: &str) -> Result<CarrierRecord, LookupError>;
}
