//! Job routes
//!
//! - `POST /jobs` - Submit a file and run the job to completion
//! - `GET /jobs/:job_id` - Full job record
//! - `GET /jobs/:job_id/status` - Status, progress and message

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::{
    commands::{submit_job, SubmitJobCommand},
    queries::{get_job, get_job_status, GetJobError, GetJobQuery, GetJobStatusQuery},
};
use crate::{
    error::{ApiResult, AppError},
    pipeline::JobRunner,
};

/// Create job routes
pub fn jobs_routes() -> Router<JobRunner> {
    Router::new()
        .route("/jobs", post(submit))
        .route("/jobs/:job_id", get(job_detail))
        .route("/jobs/:job_id/status", get(job_status))
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<GetJobError> for AppError {
    fn from(err: GetJobError) -> Self {
        match err {
            GetJobError::NotFound => AppError::NotFound(err.to_string()),
        }
    }
}

/// Submit a job
///
/// POST /jobs
///
/// ```json
/// { "jobId": "job-42", "filename": "site_a.csv", "studyId": "STUDY-001" }
/// ```
///
/// Pipeline failures still answer `200 OK`; the body carries `"status": "failed"`.
/// An unreadable body is rejected before any job is registered.
#[tracing::instrument(skip_all)]
async fn submit(
    State(runner): State<JobRunner>,
    payload: Result<Json<SubmitJobCommand>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(command) = payload?;
    let response = submit_job::handle(&runner, command).await;

    tracing::info!(
        job_id = %response.job_id,
        status = %response.status,
        "Job finished via API"
    );

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Get a specific job by ID
///
/// GET /jobs/:job_id
async fn job_detail(
    State(runner): State<JobRunner>,
    Path(job_id): Path<String>,
) -> ApiResult<Response> {
    let job = get_job::handle(runner.registry(), GetJobQuery { job_id }).await?;
    Ok((StatusCode::OK, Json(job)).into_response())
}

/// Get the status of a job
///
/// GET /jobs/:job_id/status
async fn job_status(
    State(runner): State<JobRunner>,
    Path(job_id): Path<String>,
) -> ApiResult<Response> {
    let view = get_job_status::handle(runner.registry(), GetJobStatusQuery { job_id }).await?;
    Ok((StatusCode::OK, Json(view)).into_response())
}
