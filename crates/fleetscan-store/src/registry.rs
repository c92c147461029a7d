//! In-memory job arena.

use std::collections::HashMap;

use chrono::Utc;
use dashmap::DashMap;

use fleetscan_core::types::JobId;
use fleetscan_core::{AppError, AppResult};
use fleetscan_entity::carrier::mc;
use fleetscan_entity::carrier::model::CarrierRecord;
use fleetscan_entity::job::model::{Job, JobSnapshot};
use fleetscan_entity::job::record::Record;
use fleetscan_entity::job::status::{JobStatus, RecordStatus};

/// A state change applied to one record of a job.
#[derive(Debug, Clone)]
pub enum RecordUpdate {
    /// A lookup attempt is starting: `pending`/`retrying` → `in_flight`,
    /// attempt counter incremented.
    Attempt,
    /// The lookup succeeded; the payload is owned by the record from here on.
    Success(Box<CarrierRecord>),
    /// A transient failure occurred and the record will be re-queued.
    Retry {
        /// Failure classification for diagnostics.
        reason: String,
    },
    /// The record is done without a payload.
    Failure {
        /// Terminal failure classification.
        reason: String,
    },
}

/// Internal per-job state: the job header plus its owned records.
#[derive(Debug)]
struct JobState {
    job: Job,
    records: Vec<Record>,
    /// identifier → position in `records`, for O(1) updates.
    index: HashMap<String, usize>,
    /// Number of records in a terminal state.
    terminal_count: usize,
}

/// Process-wide registry of extraction jobs.
///
/// The dashmap entry lock is the single per-job critical section:
/// concurrent workers updating different identifiers of the same job
/// serialize here, and workers on different jobs do not contend.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: DashMap<JobId, JobState>,
}

impl JobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            jobs: DashMap::new(),
        }
    }

    /// Create a job from a batch of raw identifiers.
    ///
    /// Identifiers are normalized and de-duplicated preserving first
    /// occurrence order. Fails with a validation error when the batch is
    /// empty after normalization or contains a malformed identifier.
    pub fn create_job(&self, identifiers: &[String]) -> AppResult<Job> {
        let mut seen = HashMap::new();
        let mut records = Vec::new();

        for raw in identifiers {
            let normalized = mc::normalize(raw)
                .ok_or_else(|| AppError::validation(format!("Invalid MC number: '{raw}'")))?;
            if seen.contains_key(&normalized) {
                continue;
            }
            seen.insert(normalized.clone(), records.len());
            records.push(Record::new(normalized));
        }

        if records.is_empty() {
            return Err(AppError::validation("No valid MC numbers in input"));
        }

        let job = Job::new(records.len());
        tracing::info!(
            "Created job {} with {} identifiers",
            job.id,
            job.total_count
        );

        self.jobs.insert(
            job.id,
            JobState {
                job: job.clone(),
                records,
                index: seen,
                terminal_count: 0,
            },
        );

        Ok(job)
    }

    /// Get a snapshot of one job's header.
    pub fn get_job(&self, id: &JobId) -> AppResult<Job> {
        self.jobs
            .get(id)
            .map(|state| state.job.clone())
            .ok_or_else(|| AppError::not_found(format!("Job {id} not found")))
    }

    /// Get a consistent snapshot of a job and all its records.
    pub fn snapshot(&self, id: &JobId) -> AppResult<JobSnapshot> {
        self.jobs
            .get(id)
            .map(|state| JobSnapshot {
                job: state.job.clone(),
                records: state.records.clone(),
            })
            .ok_or_else(|| AppError::not_found(format!("Job {id} not found")))
    }

    /// List job snapshots, newest first.
    pub fn list_jobs(&self, limit: usize) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.iter().map(|state| state.job.clone()).collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(limit);
        jobs
    }

    /// Mark a pending job as running. No-op for any other state.
    pub fn mark_running(&self, id: &JobId) -> AppResult<()> {
        let mut state = self
            .jobs
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Job {id} not found")))?;
        if state.job.status == JobStatus::Pending {
            state.job.status = JobStatus::Running;
        }
        Ok(())
    }

    /// Apply a state change to one record, atomically recomputing the
    /// job's aggregate counters and status.
    ///
    /// Returns the post-update job snapshot. Fails with `NotFound` for an
    /// unknown job or identifier and with `Conflict` when an attempt is
    /// started on a record that already reached a terminal state (this
    /// closes the race between a cancel request and a worker that had
    /// just dequeued the identifier).
    pub fn update_record(
        &self,
        id: &JobId,
        identifier: &str,
        update: RecordUpdate,
    ) -> AppResult<Job> {
        let mut state = self
            .jobs
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Job {id} not found")))?;
        let state = &mut *state;

        let position = *state.index.get(identifier).ok_or_else(|| {
            AppError::not_found(format!("Record '{identifier}' not found in job {id}"))
        })?;
        let record = &mut state.records[position];

        match update {
            RecordUpdate::Attempt => {
                if record.status.is_terminal() {
                    return Err(AppError::conflict(format!(
                        "Record '{identifier}' is already {}",
                        record.status
                    )));
                }
                record.status = RecordStatus::InFlight;
                record.attempts += 1;
            }
            RecordUpdate::Success(payload) => {
                record.status = RecordStatus::Success;
                record.payload = Some(*payload);
                record.finished_at = Some(Utc::now());
                state.terminal_count += 1;
                state.job.processed_count += 1;
            }
            RecordUpdate::Retry { reason } => {
                if state.job.status == JobStatus::Cancelled {
                    // The job was cancelled while this lookup was in
                    // flight; there will be no further attempts.
                    record.status = RecordStatus::Cancelled;
                    record.failure_reason = Some(reason);
                    record.finished_at = Some(Utc::now());
                    state.terminal_count += 1;
                } else {
                    record.status = RecordStatus::Retrying;
                    record.failure_reason = Some(reason);
                }
            }
            RecordUpdate::Failure { reason } => {
                record.status = RecordStatus::Failed;
                record.failure_reason = Some(reason);
                record.finished_at = Some(Utc::now());
                state.terminal_count += 1;
                state.job.failed_count += 1;
            }
        }

        // Terminal transition happens exactly once, when the last record
        // lands and the job was not already cancelled or failed wholesale.
        if state.terminal_count == state.job.total_count && !state.job.status.is_terminal() {
            state.job.status = JobStatus::Completed;
            state.job.completed_at = Some(Utc::now());
            tracing::info!(
                "Job {} completed: {} succeeded, {} failed",
                id,
                state.job.processed_count,
                state.job.failed_count
            );
        }

        Ok(state.job.clone())
    }

    /// Cancel a job: every record not yet in flight becomes `cancelled`,
    /// the job transitions to `cancelled`, and in-flight lookups are left
    /// to finish and record their outcome.
    pub fn cancel_job(&self, id: &JobId) -> AppResult<Job> {
        let mut state = self
            .jobs
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Job {id} not found")))?;
        let state = &mut *state;

        if state.job.status.is_terminal() {
            return Ok(state.job.clone());
        }

        let mut skipped = 0;
        for record in &mut state.records {
            if matches!(
                record.status,
                RecordStatus::Pending | RecordStatus::Retrying
            ) {
                record.status = RecordStatus::Cancelled;
                record.finished_at = Some(Utc::now());
                state.terminal_count += 1;
                skipped += 1;
            }
        }

        state.job.status = JobStatus::Cancelled;
        state.job.completed_at = Some(Utc::now());
        tracing::info!("Job {} cancelled, {} records skipped", id, skipped);

        Ok(state.job.clone())
    }

    /// Fail a job wholesale (e.g. the provider was unreachable at start).
    pub fn fail_job(&self, id: &JobId, message: impl Into<String>) -> AppResult<Job> {
        let mut state = self
            .jobs
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Job {id} not found")))?;

        if !state.job.status.is_terminal() {
            state.job.status = JobStatus::Failed;
            state.job.error_message = Some(message.into());
            state.job.completed_at = Some(Utc::now());
        }
        Ok(state.job.clone())
    }
}
