//! Shared test helpers: a scripted lookup provider and engine assembly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use fleetscan_core::config::AppConfig;
use fleetscan_core::config::engine::EngineConfig;
use fleetscan_core::types::JobId;
use fleetscan_engine::ExtractionEngine;
use fleetscan_entity::carrier::model::CarrierRecord;
use fleetscan_entity::job::model::Job;
use fleetscan_provider::{LookupError, LookupProvider};
use fleetscan_store::JobStore;

/// Outcome of one scripted lookup attempt.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Succeed with a minimal payload.
    Ok,
    /// Fail with this error.
    Err(LookupError),
}

/// A lookup provider driven by a per-identifier outcome script.
///
/// Outcomes are consumed one per attempt; once a script is exhausted
/// (or for unscripted identifiers) every attempt succeeds. An optional
/// artificial latency simulates slow lookups.
pub struct MockProvider {
    scripts: Mutex<HashMap<String, Vec<MockOutcome>>>,
    latency: Duration,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Script the outcomes of successive attempts for one identifier.
    pub fn script(self, identifier: &str, outcomes: Vec<MockOutcome>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(identifier.to_string(), outcomes);
        self
    }
}

#[async_trait]
impl LookupProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn lookup(&self, mc_number: &str) -> Result<CarrierRecord, LookupError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let outcome = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(mc_number) {
                Some(outcomes) if !outcomes.is_empty() => outcomes.remove(0),
                _ => MockOutcome::Ok,
            }
        };

        match outcome {
            MockOutcome::Ok => {
                let mut record = CarrierRecord::empty(mc_number);
                record.company_name = Some(format!("CARRIER {mc_number} LLC"));
                record.authority_status = Some("ACTIVE".to_string());
                Ok(record)
            }
            MockOutcome::Err(error) => Err(error),
        }
    }
}

/// Engine configuration for tests: a rate ceiling high enough to stay
/// out of the way unless a test is about throttling.
pub fn test_engine_config() -> EngineConfig {
    EngineConfig {
        requests_per_minute: 600,
        max_retries: 3,
        request_timeout_seconds: 5,
        concurrency: 3,
    }
}

/// Assemble an engine over a fresh store and the given provider.
pub fn test_engine(provider: MockProvider) -> (Arc<ExtractionEngine>, Arc<JobStore>) {
    test_engine_with_config(provider, test_engine_config())
}

pub fn test_engine_with_config(
    provider: MockProvider,
    config: EngineConfig,
) -> (Arc<ExtractionEngine>, Arc<JobStore>) {
    let store = Arc::new(JobStore::new());
    let engine = Arc::new(ExtractionEngine::new(
        config,
        Arc::clone(&store),
        Arc::new(provider),
    ));
    (engine, store)
}

/// Default application config wired to the test engine settings.
pub fn test_app_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.engine = test_engine_config();
    config
}

/// Poll the store until the job reaches a terminal state.
///
/// Tests run under paused time, so the polling sleeps cost nothing.
pub async fn wait_for_terminal(store: &Arc<JobStore>, id: &JobId) -> Job {
    tokio::time::timeout(Duration::from_secs(3600), async {
        loop {
            let job = store.get_job(id).expect("job disappeared");
            if job.status.is_terminal() {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .expect("job never reached a terminal state")
}

pub fn ids(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}
