//! Submit job command
//!
//! Registers a job and runs it to completion inside the request. The response
//! always carries a terminal status.

use etl_common::JobStatus;
use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::pipeline::{JobRequest, JobRunner};

/// Command to submit a file for ingestion
///
/// # Examples
///
/// ```rust,ignore
/// let command = SubmitJobCommand {
///     job_id: "job-42".to_string(),
///     filename: "uploads/site_a.csv".to_string(),
///     study_id: Some("STUDY-001".to_string()),
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitJobCommand {
    /// Caller-chosen job id; resubmitting an id replaces the earlier job
    pub job_id: String,

    /// Path of the file to ingest
    pub filename: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_id: Option<String>,
}

/// Terminal outcome of a submitted job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitJobResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub message: String,
}

impl Request<SubmitJobResponse> for SubmitJobCommand {}

#[tracing::instrument(skip(runner, command), fields(job_id = %command.job_id))]
pub async fn handle(runner: &JobRunner, command: SubmitJobCommand) -> SubmitJobResponse {
    let job = runner
        .run(JobRequest {
            job_id: command.job_id,
            filename: command.filename,
            study_id: command.study_id,
        })
        .await;

    SubmitJobResponse {
        job_id: job.job_id,
        status: job.status,
        message: job.message,
    }
}
