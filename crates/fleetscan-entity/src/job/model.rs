//! Job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fleetscan_core::types::JobId;

use super::status::JobStatus;

/// An extraction job: one submitted batch of carrier identifiers.
///
/// Counters are mutated only by the job store under its per-job critical
/// section; every copy handed to callers is a point-in-time snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier, assigned at creation.
    pub id: JobId,
    /// Current job status.
    pub status: JobStatus,
    /// Number of identifiers in the batch, fixed at creation.
    pub total_count: usize,
    /// Records that finished with a successful lookup.
    pub processed_count: usize,
    /// Records that finished without a payload.
    pub failed_count: usize,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// When the job reached a terminal state. Set exactly once.
    pub completed_at: Option<DateTime<Utc>>,
    /// Error message when the whole batch failed to start.
    pub error_message: Option<String>,
}

impl Job {
    /// Create a new pending job for `total_count` identifiers.
    pub fn new(total_count: usize) -> Self {
        Self {
            id: JobId::new(),
            status: JobStatus::Pending,
            total_count,
            processed_count: 0,
            failed_count: 0,
            created_at: Utc::now(),
            completed_at: None,
            error_message: None,
        }
    }

    /// Number of records that still have no terminal outcome counted.
    pub fn remaining_count(&self) -> usize {
        self.total_count
            .saturating_sub(self.processed_count + self.failed_count)
    }
}

/// A consistent point-in-time copy of a job and all its records, in
/// submission order. Produced by the job store for exports and detail
/// views; never a live reference into store state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// The job header.
    pub job: Job,
    /// All records, submission order preserved.
    pub records: Vec<crate::job::record::Record>,
}
