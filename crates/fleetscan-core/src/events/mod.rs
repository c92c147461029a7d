//! Domain events emitted by the extraction engine.
//!
//! Events are published on a broadcast channel when a job reaches a
//! terminal state. Progress reporting is pull-based via the job store;
//! the event channel exists so presentation glue can push updates
//! without the engine knowing about any transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::JobId;

/// Terminal-state transition of an extraction job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    /// The job that transitioned.
    pub job_id: JobId,
    /// The terminal status the job reached (`completed`, `failed`, `cancelled`).
    pub status: String,
    /// Number of successfully processed records at transition time.
    pub processed_count: usize,
    /// Number of failed records at transition time.
    pub failed_count: usize,
    /// Total records in the job.
    pub total_count: usize,
    /// When the transition occurred.
    pub timestamp: DateTime<Utc>,
}
