//! The extraction engine facade.
//!
//! This is the job query surface the presentation layer consumes:
//! submit a batch, poll status, export via the store's snapshots,
//! cancel, and subscribe to terminal-state events.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{broadcast, watch};

use fleetscan_core::config::engine::EngineConfig;
use fleetscan_core::events::JobEvent;
use fleetscan_core::types::JobId;
use fleetscan_core::AppResult;
use fleetscan_entity::job::model::Job;
use fleetscan_provider::LookupProvider;
use fleetscan_source::IdentifierSource;
use fleetscan_store::JobStore;

use crate::pool::JobRunner;
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;

/// Capacity of the terminal-event broadcast channel. Slow subscribers
/// miss old events rather than backpressuring the engine.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Orchestrates extraction jobs over a shared store, provider, and
/// process-wide rate limiter.
pub struct ExtractionEngine {
    store: Arc<JobStore>,
    provider: Arc<dyn LookupProvider>,
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
    config: EngineConfig,
    events: broadcast::Sender<JobEvent>,
    cancels: Arc<DashMap<JobId, watch::Sender<bool>>>,
}

impl ExtractionEngine {
    /// Build an engine from configuration.
    pub fn new(
        config: EngineConfig,
        store: Arc<JobStore>,
        provider: Arc<dyn LookupProvider>,
    ) -> Self {
        let request_timeout = Duration::from_secs(config.request_timeout_seconds);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            provider,
            limiter: Arc::new(RateLimiter::per_minute(config.requests_per_minute)),
            policy: RetryPolicy::new(config.max_retries, request_timeout),
            config,
            events,
            cancels: Arc::new(DashMap::new()),
        }
    }

    /// The job store backing this engine.
    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    /// Create a job from raw identifiers and start processing it in the
    /// background. Fails without persisting anything when the batch is
    /// empty or malformed.
    pub fn submit(&self, identifiers: &[String]) -> AppResult<Job> {
        let job = self.store.create_job(identifiers)?;
        let snapshot = self.store.snapshot(&job.id)?;
        let identifiers: Vec<String> = snapshot
            .records
            .iter()
            .map(|record| record.identifier.clone())
            .collect();

        let (cancel_tx, cancel_rx) = watch::channel(false);
        self.cancels.insert(job.id, cancel_tx);

        let runner = JobRunner {
            store: Arc::clone(&self.store),
            provider: Arc::clone(&self.provider),
            limiter: Arc::clone(&self.limiter),
            policy: self.policy.clone(),
            concurrency: self.config.concurrency,
            request_timeout: Duration::from_secs(self.config.request_timeout_seconds),
            job_id: job.id,
            identifiers,
            events: self.events.clone(),
        };

        let cancels = Arc::clone(&self.cancels);
        let job_id = job.id;
        tokio::spawn(async move {
            runner.run(cancel_rx).await;
            cancels.remove(&job_id);
        });

        Ok(job)
    }

    /// Fetch identifiers from a source and submit them as a job.
    /// A source failure propagates; no partial job is persisted.
    pub async fn submit_from_source(&self, source: &dyn IdentifierSource) -> AppResult<Job> {
        let identifiers = source.fetch_identifiers().await?;
        self.submit(&identifiers)
    }

    /// Current snapshot of a job's header.
    pub fn status(&self, id: &JobId) -> AppResult<Job> {
        self.store.get_job(id)
    }

    /// Request cancellation: pending records are marked cancelled
    /// immediately, in-flight lookups finish and record their outcome.
    /// Idempotent on terminal jobs.
    pub fn cancel(&self, id: &JobId) -> AppResult<Job> {
        let job = self.store.cancel_job(id)?;
        if let Some(sender) = self.cancels.get(id) {
            let _ = sender.send(true);
        }
        Ok(job)
    }

    /// Subscribe to terminal-state transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }
}
