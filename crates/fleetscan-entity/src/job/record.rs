//! Per-identifier record entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::carrier::model::CarrierRecord;

use super::status::RecordStatus;

/// The lifecycle of a single identifier inside a job.
///
/// Records are created together with their job and keep the submission
/// order; the payload, once assigned, is never mutated again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Normalized carrier identifier (MC number), unique within the job.
    pub identifier: String,
    /// Current record status.
    pub status: RecordStatus,
    /// Number of lookup attempts started so far.
    pub attempts: u32,
    /// Successful lookup result.
    pub payload: Option<CarrierRecord>,
    /// Last failure classification, retained for diagnostics and export.
    pub failure_reason: Option<String>,
    /// When the record reached a terminal state.
    pub finished_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Create a pending record for `identifier`.
    pub fn new(identifier: String) -> Self {
        Self {
            identifier,
            status: RecordStatus::Pending,
            attempts: 0,
            payload: None,
            failure_reason: None,
            finished_at: None,
        }
    }
}
