//! Extraction engine end-to-end scenarios against a scripted provider.

use std::time::Duration;

use fleetscan_engine::MAX_RETRIES_EXCEEDED;
use fleetscan_entity::job::status::{JobStatus, RecordStatus};
use fleetscan_provider::LookupError;

use crate::helpers::{MockOutcome, MockProvider, ids, test_engine, wait_for_terminal};

#[tokio::test(start_paused = true)]
async fn test_batch_completes_with_all_successes() {
    let (engine, store) = test_engine(MockProvider::new());
    let job = engine
        .submit(&ids(&["111111", "222222", "333333"]))
        .unwrap();

    let done = wait_for_terminal(&store, &job.id).await;
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.processed_count, 3);
    assert_eq!(done.failed_count, 0);
    assert_eq!(done.processed_count + done.failed_count, done.total_count);
    assert!(done.completed_at.is_some());

    let snapshot = store.snapshot(&job.id).unwrap();
    for record in &snapshot.records {
        assert_eq!(record.status, RecordStatus::Success);
        assert_eq!(record.attempts, 1);
        let payload = record.payload.as_ref().unwrap();
        // Enrichment ran before the payload was stored.
        assert_eq!(payload.authority_status.as_deref(), Some("Active"));
        assert_eq!(payload.safety_score, 10.0);
    }
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_identifiers_are_deduplicated() {
    let (engine, store) = test_engine(MockProvider::new());
    let job = engine
        .submit(&ids(&["111111", "222222", "111111"]))
        .unwrap();
    assert_eq!(job.total_count, 2);

    let done = wait_for_terminal(&store, &job.id).await;
    assert_eq!(done.processed_count, 2);

    let snapshot = store.snapshot(&job.id).unwrap();
    let identifiers: Vec<&str> = snapshot
        .records
        .iter()
        .map(|r| r.identifier.as_str())
        .collect();
    assert_eq!(identifiers, vec!["111111", "222222"]);
}

#[tokio::test(start_paused = true)]
async fn test_empty_batch_is_rejected_without_a_job() {
    let (engine, store) = test_engine(MockProvider::new());
    assert!(engine.submit(&[]).is_err());
    assert!(store.list_jobs(10).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_not_found_fails_record_on_first_attempt() {
    let provider =
        MockProvider::new().script("999999", vec![MockOutcome::Err(LookupError::NotFound)]);
    let (engine, store) = test_engine(provider);
    let job = engine.submit(&ids(&["999999"])).unwrap();

    let done = wait_for_terminal(&store, &job.id).await;
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.failed_count, 1);
    assert_eq!(done.processed_count, 0);

    let snapshot = store.snapshot(&job.id).unwrap();
    let record = &snapshot.records[0];
    assert_eq!(record.status, RecordStatus::Failed);
    assert_eq!(record.attempts, 1);
    assert_eq!(record.failure_reason.as_deref(), Some("not_found"));
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_retry_then_succeed() {
    let provider = MockProvider::new().script(
        "111111",
        vec![
            MockOutcome::Err(LookupError::Timeout),
            MockOutcome::Err(LookupError::Timeout),
            MockOutcome::Ok,
        ],
    );
    let (engine, store) = test_engine(provider);
    let job = engine.submit(&ids(&["111111"])).unwrap();

    let done = wait_for_terminal(&store, &job.id).await;
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.processed_count, 1);
    assert_eq!(done.failed_count, 0);

    let snapshot = store.snapshot(&job.id).unwrap();
    let record = &snapshot.records[0];
    assert_eq!(record.status, RecordStatus::Success);
    assert_eq!(record.attempts, 3);
    assert!(record.payload.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_attempts_fail_with_max_retries_exceeded() {
    let provider = MockProvider::new().script(
        "111111",
        vec![
            MockOutcome::Err(LookupError::Timeout),
            MockOutcome::Err(LookupError::RateLimited),
            MockOutcome::Err(LookupError::Unavailable("HTTP 502".into())),
        ],
    );
    let (engine, store) = test_engine(provider);
    let job = engine.submit(&ids(&["111111"])).unwrap();

    let done = wait_for_terminal(&store, &job.id).await;
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.failed_count, 1);

    let snapshot = store.snapshot(&job.id).unwrap();
    let record = &snapshot.records[0];
    assert_eq!(record.status, RecordStatus::Failed);
    assert_eq!(record.attempts, 3);
    assert_eq!(record.failure_reason.as_deref(), Some(MAX_RETRIES_EXCEEDED));
}

#[tokio::test(start_paused = true)]
async fn test_mixed_outcomes_complete_even_when_everything_fails() {
    let provider = MockProvider::new()
        .script("111111", vec![MockOutcome::Err(LookupError::NotFound)])
        .script(
            "222222",
            vec![MockOutcome::Err(LookupError::Malformed("bad json".into()))],
        );
    let (engine, store) = test_engine(provider);
    let job = engine.submit(&ids(&["111111", "222222"])).unwrap();

    // A job with only failed records is still lifecycle-completed.
    let done = wait_for_terminal(&store, &job.id).await;
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.processed_count, 0);
    assert_eq!(done.failed_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_mid_run_skips_pending_and_finishes_in_flight() {
    // Slow (but not timing-out) lookups keep records in flight while the
    // cancel arrives.
    let provider = MockProvider::new().with_latency(Duration::from_secs(2));
    let (engine, store) = test_engine(provider);

    let identifiers: Vec<String> = (0..10).map(|i| format!("10000{i}")).collect();
    let job = engine.submit(&identifiers).unwrap();

    // Let the three workers pick up their first items.
    tokio::time::sleep(Duration::from_secs(1)).await;
    let cancelled = engine.cancel(&job.id).unwrap();
    assert_eq!(cancelled.status, JobStatus::Cancelled);

    // The job is terminal immediately; the in-flight lookups land their
    // outcomes over the next second.
    let done = wait_for_terminal(&store, &job.id).await;
    assert_eq!(done.status, JobStatus::Cancelled);
    tokio::time::sleep(Duration::from_secs(3)).await;

    let done = store.get_job(&job.id).unwrap();
    let snapshot = store.snapshot(&job.id).unwrap();
    let successes = snapshot
        .records
        .iter()
        .filter(|r| r.status == RecordStatus::Success)
        .count();
    let cancelled_records = snapshot
        .records
        .iter()
        .filter(|r| r.status == RecordStatus::Cancelled)
        .count();

    // The in-flight lookups finished normally; everything queued was skipped.
    assert_eq!(successes, 3);
    assert_eq!(cancelled_records, 7);
    assert_eq!(done.processed_count, 3);
    assert_eq!(done.failed_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_is_idempotent_and_unknown_jobs_404() {
    let (engine, store) = test_engine(MockProvider::new());
    let job = engine.submit(&ids(&["111111"])).unwrap();
    wait_for_terminal(&store, &job.id).await;

    // Cancelling a terminal job leaves it untouched.
    let after = engine.cancel(&job.id).unwrap();
    assert_eq!(after.status, JobStatus::Completed);

    let unknown = fleetscan_core::types::JobId::new();
    assert!(engine.status(&unknown).is_err());
    assert!(engine.cancel(&unknown).is_err());
}

#[tokio::test(start_paused = true)]
async fn test_progress_counters_are_monotonic_while_running() {
    let provider = MockProvider::new().with_latency(Duration::from_millis(200));
    let (engine, store) = test_engine(provider);
    let identifiers: Vec<String> = (0..8).map(|i| format!("20000{i}")).collect();
    let job = engine.submit(&identifiers).unwrap();

    let mut last_processed = 0;
    let mut last_failed = 0;
    loop {
        let seen = store.get_job(&job.id).unwrap();
        assert!(seen.processed_count + seen.failed_count <= seen.total_count);
        assert!(seen.processed_count >= last_processed);
        assert!(seen.failed_count >= last_failed);
        last_processed = seen.processed_count;
        last_failed = seen.failed_count;

        if seen.status.is_terminal() {
            assert_eq!(seen.processed_count + seen.failed_count, seen.total_count);
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_terminal_event_is_published() {
    let (engine, store) = test_engine(MockProvider::new());
    let mut events = engine.subscribe();

    let job = engine.submit(&ids(&["111111", "222222"])).unwrap();
    wait_for_terminal(&store, &job.id).await;

    let event = events.recv().await.unwrap();
    assert_eq!(event.job_id, job.id);
    assert_eq!(event.status, "completed");
    assert_eq!(event.processed_count, 2);
    assert_eq!(event.total_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limiter_paces_a_large_batch() {
    use fleetscan_core::config::engine::EngineConfig;

    // 10 requests/minute with 20 lookups: the second half is refill-paced,
    // so the whole batch cannot finish inside a minute.
    let config = EngineConfig {
        requests_per_minute: 10,
        max_retries: 3,
        request_timeout_seconds: 5,
        concurrency: 4,
    };
    let provider = MockProvider::new();
    let (engine, store) = crate::helpers::test_engine_with_config(provider, config);

    let identifiers: Vec<String> = (10..30).map(|i| format!("3000{i}")).collect();
    let started = tokio::time::Instant::now();
    let job = engine.submit(&identifiers).unwrap();
    let done = wait_for_terminal(&store, &job.id).await;

    assert_eq!(done.processed_count, 20);
    assert!(started.elapsed() >= Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_retry_delay_is_fixed_not_exponential() {
    let provider = MockProvider::new().script(
        "111111",
        vec![
            MockOutcome::Err(LookupError::Timeout),
            MockOutcome::Err(LookupError::Timeout),
            MockOutcome::Ok,
        ],
    );
    let (engine, store) = test_engine(provider);

    let started = tokio::time::Instant::now();
    let job = engine.submit(&ids(&["111111"])).unwrap();
    wait_for_terminal(&store, &job.id).await;

    // Two retries at the fixed 5s delay (the configured request timeout):
    // well under what exponential growth would produce, and at least 10s.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(10));
    assert!(elapsed < Duration::from_secs(20));
}
