//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fleetscan_core::types::JobId;
use fleetscan_entity::job::model::Job;

/// Job status as returned by creation, status, history, and cancel
/// endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    /// Job identifier, used for all subsequent queries.
    pub job_id: JobId,
    /// Lifecycle status string.
    pub status: String,
    /// Identifiers in the batch after de-duplication.
    pub total_count: usize,
    /// Successfully extracted records so far.
    pub processed_count: usize,
    /// Failed records so far.
    pub failed_count: usize,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Terminal transition time, when reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Wholesale failure message, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.id,
            status: job.status.to_string(),
            total_count: job.total_count,
            processed_count: job.processed_count,
            failed_count: job.failed_count,
            created_at: job.created_at,
            completed_at: job.completed_at,
            error_message: job.error_message,
        }
    }
}
