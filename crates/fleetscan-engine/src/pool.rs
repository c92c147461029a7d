//! Per-job worker pool.
//!
//! Each running job gets `concurrency` workers over a shared work queue.
//! Workers mark records in flight, pass the process-wide rate limiter,
//! invoke the lookup provider bounded by the request timeout, and route
//! every outcome through the retry policy. The queue is drained when no
//! item is pending and none is in flight.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, watch};

use fleetscan_core::error::ErrorKind;
use fleetscan_core::events::JobEvent;
use fleetscan_core::types::JobId;
use fleetscan_entity::carrier::enrich;
use fleetscan_provider::{LookupError, LookupProvider};
use fleetscan_store::{JobStore, RecordUpdate};

use crate::rate_limit::RateLimiter;
use crate::retry::{RetryDecision, RetryPolicy};

/// How long an idle worker waits before re-checking the queue while
/// other workers still have items in flight.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One queued unit of work: an identifier and the attempts it has
/// already consumed.
#[derive(Debug)]
struct WorkItem {
    identifier: String,
    attempts: u32,
}

/// Shared queue state. The mutex is only held for pointer-sized
/// bookkeeping, never across an await.
#[derive(Debug)]
struct WorkQueue {
    inner: Mutex<QueueState>,
}

#[derive(Debug)]
struct QueueState {
    pending: VecDeque<WorkItem>,
    in_flight: usize,
}

impl WorkQueue {
    fn new(identifiers: Vec<String>) -> Self {
        let pending = identifiers
            .into_iter()
            .map(|identifier| WorkItem {
                identifier,
                attempts: 0,
            })
            .collect();
        Self {
            inner: Mutex::new(QueueState {
                pending,
                in_flight: 0,
            }),
        }
    }

    /// Pop the next item and count it as in flight, atomically, so a
    /// sibling worker never observes an empty queue with zero in flight
    /// while an item is between states.
    fn pop(&self) -> PopResult {
        let mut state = self.inner.lock().unwrap();
        match state.pending.pop_front() {
            Some(item) => {
                state.in_flight += 1;
                PopResult::Item(item)
            }
            None if state.in_flight > 0 => PopResult::Busy,
            None => PopResult::Drained,
        }
    }

    fn finish(&self) {
        let mut state = self.inner.lock().unwrap();
        state.in_flight -= 1;
    }

    fn requeue(&self, item: WorkItem) {
        let mut state = self.inner.lock().unwrap();
        state.pending.push_back(item);
        state.in_flight -= 1;
    }
}

enum PopResult {
    Item(WorkItem),
    /// Nothing pending, but in-flight items may still re-queue.
    Busy,
    Drained,
}

/// Drives one job's records to completion.
pub(crate) struct JobRunner {
    pub store: Arc<JobStore>,
    pub provider: Arc<dyn LookupProvider>,
    pub limiter: Arc<RateLimiter>,
    pub policy: RetryPolicy,
    pub concurrency: usize,
    pub request_timeout: Duration,
    pub job_id: JobId,
    pub identifiers: Vec<String>,
    pub events: broadcast::Sender<JobEvent>,
}

impl JobRunner {
    /// Run the pool until every record is terminal or the job is
    /// cancelled, then publish the terminal event.
    pub async fn run(self, cancel: watch::Receiver<bool>) {
        if let Err(e) = self.store.mark_running(&self.job_id) {
            tracing::error!("Job {} could not start: {}", self.job_id, e);
            return;
        }

        let queue = Arc::new(WorkQueue::new(self.identifiers.clone()));
        let concurrency = self.concurrency.max(1);
        let context = Arc::new(WorkerContext {
            store: Arc::clone(&self.store),
            provider: Arc::clone(&self.provider),
            limiter: Arc::clone(&self.limiter),
            policy: self.policy.clone(),
            request_timeout: self.request_timeout,
            job_id: self.job_id,
        });

        tracing::info!(
            "Job {} started: {} identifiers, {} workers via provider '{}'",
            self.job_id,
            self.identifiers.len(),
            concurrency,
            self.provider.name()
        );

        let mut handles = Vec::with_capacity(concurrency);
        for _ in 0..concurrency {
            let context = Arc::clone(&context);
            let queue = Arc::clone(&queue);
            let cancel = cancel.clone();
            handles.push(tokio::spawn(worker_loop(context, queue, cancel)));
        }
        for handle in handles {
            let _ = handle.await;
        }

        let terminal = match self.store.get_job(&self.job_id) {
            Ok(job) if job.status.is_terminal() => job,
            Ok(job) => {
                // The pool never drains with work left over; if it does,
                // surface it as a wholesale failure instead of leaving the
                // job running forever.
                tracing::error!(
                    "Job {} pool drained in non-terminal state '{}'",
                    job.id,
                    job.status
                );
                match self
                    .store
                    .fail_job(&self.job_id, "worker pool exited with unfinished records")
                {
                    Ok(job) => job,
                    Err(e) => {
                        tracing::error!("Job {} could not be failed: {}", self.job_id, e);
                        return;
                    }
                }
            }
            Err(e) => {
                tracing::error!("Job {} vanished from store: {}", self.job_id, e);
                return;
            }
        };

        let _ = self.events.send(JobEvent {
            job_id: terminal.id,
            status: terminal.status.to_string(),
            processed_count: terminal.processed_count,
            failed_count: terminal.failed_count,
            total_count: terminal.total_count,
            timestamp: Utc::now(),
        });
    }
}

/// Everything a worker needs, shared across the pool.
struct WorkerContext {
    store: Arc<JobStore>,
    provider: Arc<dyn LookupProvider>,
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
    request_timeout: Duration,
    job_id: JobId,
}

async fn worker_loop(
    context: Arc<WorkerContext>,
    queue: Arc<WorkQueue>,
    cancel: watch::Receiver<bool>,
) {
    loop {
        // The cancel flag is checked cooperatively between dequeues;
        // an item already being processed finishes normally.
        if *cancel.borrow() {
            break;
        }

        match queue.pop() {
            PopResult::Item(item) => {
                process_item(&context, &queue, &cancel, item).await;
            }
            PopResult::Busy => {
                tokio::time::sleep(IDLE_POLL_INTERVAL).await;
            }
            PopResult::Drained => break,
        }
    }
}

async fn process_item(
    context: &WorkerContext,
    queue: &WorkQueue,
    cancel: &watch::Receiver<bool>,
    item: WorkItem,
) {
    let attempt = item.attempts + 1;
    let identifier = item.identifier;

    match context
        .store
        .update_record(&context.job_id, &identifier, RecordUpdate::Attempt)
    {
        Ok(_) => {}
        Err(e) if e.kind == ErrorKind::Conflict => {
            // Lost the race with a cancel: the record is already terminal.
            queue.finish();
            return;
        }
        Err(e) => {
            tracing::error!("Job {}: failed to mark '{}' in flight: {}", context.job_id, identifier, e);
            queue.finish();
            return;
        }
    }

    context.limiter.acquire().await;

    let outcome = match tokio::time::timeout(
        context.request_timeout,
        context.provider.lookup(&identifier),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(LookupError::Timeout),
    };

    match outcome {
        Ok(mut payload) => {
            enrich::enrich(&mut payload);
            if let Err(e) = context.store.update_record(
                &context.job_id,
                &identifier,
                RecordUpdate::Success(Box::new(payload)),
            ) {
                tracing::error!("Job {}: failed to record success for '{}': {}", context.job_id, identifier, e);
            } else {
                tracing::info!("Extracted MC {} (attempt {})", identifier, attempt);
            }
            queue.finish();
        }
        Err(error) => match context.policy.decide(attempt, &error) {
            RetryDecision::Retry { delay } => {
                tracing::warn!(
                    "MC {} attempt {}/{} failed ({}), retrying",
                    identifier,
                    attempt,
                    context.policy.max_attempts(),
                    error
                );
                if let Err(e) = context.store.update_record(
                    &context.job_id,
                    &identifier,
                    RecordUpdate::Retry {
                        reason: error.reason().to_string(),
                    },
                ) {
                    tracing::error!("Job {}: failed to mark '{}' retrying: {}", context.job_id, identifier, e);
                    queue.finish();
                    return;
                }

                if *cancel.borrow() {
                    // The cancel already marked this retrying record.
                    queue.finish();
                    return;
                }
                let mut cancel = cancel.clone();
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {
                        queue.requeue(WorkItem { identifier, attempts: attempt });
                    }
                    _ = cancel.changed() => {
                        queue.finish();
                    }
                }
            }
            RetryDecision::GiveUp { reason } => {
                tracing::error!("MC {} failed after {} attempt(s): {}", identifier, attempt, reason);
                if let Err(e) = context.store.update_record(
                    &context.job_id,
                    &identifier,
                    RecordUpdate::Failure { reason },
                ) {
                    tracing::error!("Job {}: failed to record failure for '{}': {}", context.job_id, identifier, e);
                }
                queue.finish();
            }
        },
    }
}
