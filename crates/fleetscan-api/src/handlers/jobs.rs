//! Job creation, status, export, history, and cancel handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};

use fleetscan_core::AppError;
use fleetscan_core::types::JobId;
use fleetscan_source::{InlineSource, RemoteRepoSource};

use crate::dto::request::{CreateJobRequest, ExportParams, HistoryParams, RemoteJobParams};
use crate::dto::response::JobResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// Default number of jobs returned by the history endpoint.
const DEFAULT_HISTORY_LIMIT: usize = 100;

/// POST /api/jobs
///
/// Accepts either a JSON body (`{"identifiers": [...]}`) or raw
/// CSV/plain text, and starts an extraction job.
pub async fn create_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, Json<JobResponse>), ApiError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    let job = if is_json {
        let request: CreateJobRequest = serde_json::from_str(&body)
            .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))?;
        state.engine.submit(&request.identifiers)?
    } else {
        let source = InlineSource::new(body);
        state.engine.submit_from_source(&source).await?
    };
    tracing::info!("Started extraction job {} via upload", job.id);
    Ok((StatusCode::ACCEPTED, Json(JobResponse::from(job))))
}

/// POST /api/jobs/from-remote
///
/// Reads the MC list from a remote repository file and starts a job.
pub async fn create_job_from_remote(
    State(state): State<AppState>,
    Query(params): Query<RemoteJobParams>,
) -> Result<(StatusCode, Json<JobResponse>), ApiError> {
    let source = RemoteRepoSource::from_config(
        &state.config.source,
        params.repo,
        params.path,
        params.branch,
    )
    .map_err(AppError::from)?;

    let job = state.engine.submit_from_source(&source).await?;
    tracing::info!("Started extraction job {} from remote repository", job.id);
    Ok((StatusCode::ACCEPTED, Json(JobResponse::from(job))))
}

/// GET /api/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Json<Vec<JobResponse>> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let jobs = state
        .store
        .list_jobs(limit)
        .into_iter()
        .map(JobResponse::from)
        .collect();
    Json(jobs)
}

/// GET /api/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = state.engine.status(&id)?;
    Ok(Json(JobResponse::from(job)))
}

/// GET /api/jobs/{id}/export?format=csv|json
pub async fn export_results(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
    Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
    let snapshot = state.store.snapshot(&id)?;
    let format = params.format.as_deref().unwrap_or("csv");

    let (body, content_type, filename) = match format {
        "json" => (
            fleetscan_export::render_json(&snapshot)?,
            "application/json",
            format!("extracted_carriers_{id}.json"),
        ),
        "csv" => (
            fleetscan_export::render_csv(&snapshot)?,
            "text/csv",
            format!("extracted_carriers_{id}.csv"),
        ),
        other => {
            return Err(
                AppError::validation(format!("Unknown export format '{other}'")).into(),
            );
        }
    };

    Ok(download_response(body, content_type, &filename))
}

/// GET /api/jobs/{id}/failed
pub async fn export_failed(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Response, ApiError> {
    let snapshot = state.store.snapshot(&id)?;
    let body = fleetscan_export::render_failed_csv(&snapshot)?;
    let filename = format!("failed_extractions_{id}.csv");
    Ok(download_response(body, "text/csv", &filename))
}

/// POST /api/jobs/{id}/cancel
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = state.engine.cancel(&id)?;
    tracing::info!("Cancel requested for job {}", id);
    Ok(Json(JobResponse::from(job)))
}

fn download_response(body: String, content_type: &str, filename: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
