//! HTTP surface tests over an in-process engine with a scripted provider.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use tower::ServiceExt;

use fleetscan_api::{AppState, build_router};
use fleetscan_provider::LookupError;
use fleetscan_store::JobStore;

use crate::helpers::{MockOutcome, MockProvider, test_app_config, test_engine};

fn test_app(provider: MockProvider) -> (Router, Arc<JobStore>) {
    let (engine, store) = test_engine(provider);
    let state = AppState::new(Arc::new(test_app_config()), engine);
    (build_router(state), store)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn get(router: &Router, uri: &str) -> axum::response::Response {
    router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn poll_until_terminal(router: &Router, job_id: &str) -> serde_json::Value {
    loop {
        let response = get(router, &format!("/api/jobs/{job_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let status = body["status"].as_str().unwrap();
        if ["completed", "failed", "cancelled"].contains(&status) {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_create_job_from_text_upload() {
    let (router, _store) = test_app(MockProvider::new());

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/jobs")
                .body(Body::from("111111\n222222\n111111\n"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["total_count"], 2);
    assert_eq!(body["processed_count"], 0);

    let job_id = body["job_id"].as_str().unwrap().to_string();
    let done = poll_until_terminal(&router, &job_id).await;
    assert_eq!(done["status"], "completed");
    assert_eq!(done["processed_count"], 2);
    assert_eq!(done["failed_count"], 0);
}

#[tokio::test(start_paused = true)]
async fn test_create_job_from_json_body() {
    let (router, _store) = test_app(MockProvider::new());

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/jobs")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"identifiers": ["MC-111111", "222222"]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["total_count"], 2);
}

#[tokio::test(start_paused = true)]
async fn test_create_job_with_no_identifiers_is_rejected() {
    let (router, store) = test_app(MockProvider::new());

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/jobs")
                .body(Body::from("company,name\nno,numbers\n"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(store.list_jobs(10).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_export_results_as_csv_and_json() {
    let provider =
        MockProvider::new().script("999999", vec![MockOutcome::Err(LookupError::NotFound)]);
    let (router, _store) = test_app(provider);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/jobs")
                .body(Body::from("111111\n999999\n"))
                .unwrap(),
        )
        .await
        .unwrap();
    let job_id = body_json(response).await["job_id"]
        .as_str()
        .unwrap()
        .to_string();
    poll_until_terminal(&router, &job_id).await;

    // CSV export keeps submission order and carries the attachment headers.
    let response = get(&router, &format!("/api/jobs/{job_id}/export?format=csv")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("extracted_carriers_"));

    let csv = body_text(response).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert!(lines[0].starts_with("mc_number,status,"));
    assert!(lines[1].starts_with("111111,success,"));
    assert!(lines[2].starts_with("999999,failed,"));

    // Export is idempotent: a second call is byte-identical.
    let again = body_text(get(&router, &format!("/api/jobs/{job_id}/export?format=csv")).await).await;
    assert_eq!(csv, again);

    let response = get(&router, &format!("/api/jobs/{job_id}/export?format=json")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let parsed: Vec<serde_json::Value> =
        serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0]["mc_number"], "111111");

    let response = get(&router, &format!("/api/jobs/{job_id}/export?format=xml")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn test_export_failed_only() {
    let provider =
        MockProvider::new().script("999999", vec![MockOutcome::Err(LookupError::NotFound)]);
    let (router, _store) = test_app(provider);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/jobs")
                .body(Body::from("111111\n999999\n"))
                .unwrap(),
        )
        .await
        .unwrap();
    let job_id = body_json(response).await["job_id"]
        .as_str()
        .unwrap()
        .to_string();
    poll_until_terminal(&router, &job_id).await;

    let response = get(&router, &format!("/api/jobs/{job_id}/failed")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let csv = body_text(response).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "mc_number,failure_reason,attempts,failed_at");
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("999999,not_found,1,"));
}

#[tokio::test(start_paused = true)]
async fn test_history_lists_jobs_newest_first() {
    let (router, _store) = test_app(MockProvider::new());

    let mut created_ids = Vec::new();
    for mc in ["111111", "222222"] {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/jobs")
                    .body(Body::from(mc.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        created_ids.push(body_json(response).await["job_id"].as_str().unwrap().to_string());
        // Creation timestamps come from the wall clock, so keep the two
        // jobs measurably apart.
        std::thread::sleep(Duration::from_millis(5));
    }

    let response = get(&router, "/api/jobs?limit=10").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["job_id"].as_str().unwrap(), created_ids[1]);
    assert_eq!(listed[1]["job_id"].as_str().unwrap(), created_ids[0]);

    let response = get(&router, "/api/jobs?limit=1").await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_over_http() {
    let provider = MockProvider::new().with_latency(Duration::from_secs(2));
    let (router, _store) = test_app(provider);

    let identifiers: String = (0..10).map(|i| format!("40000{i}\n")).collect();
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/jobs")
                .body(Body::from(identifiers))
                .unwrap(),
        )
        .await
        .unwrap();
    let job_id = body_json(response).await["job_id"]
        .as_str()
        .unwrap()
        .to_string();

    tokio::time::sleep(Duration::from_secs(1)).await;
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/jobs/{job_id}/cancel"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "cancelled");

    let done = poll_until_terminal(&router, &job_id).await;
    assert_eq!(done["status"], "cancelled");
}

#[tokio::test(start_paused = true)]
async fn test_unknown_job_is_404() {
    let (router, _store) = test_app(MockProvider::new());
    let unknown = fleetscan_core::types::JobId::new();

    for uri in [
        format!("/api/jobs/{unknown}"),
        format!("/api/jobs/{unknown}/export"),
        format!("/api/jobs/{unknown}/failed"),
    ] {
        let response = get(&router, &uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test(start_paused = true)]
async fn test_health_endpoint() {
    let (router, _store) = test_app(MockProvider::new());
    let response = get(&router, "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}
