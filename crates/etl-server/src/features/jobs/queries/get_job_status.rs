//! Get job status query
//!
//! Compact view of a job: status, progress and message.

use etl_common::JobStatus;
use mediator::Request;
use serde::{Deserialize, Serialize};

use super::get_job::GetJobError;
use crate::pipeline::{Job, JobRegistry};

/// Query to get the status of a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetJobStatusQuery {
    pub job_id: String,
}

/// Status view of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusView {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Job> for JobStatusView {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.job_id,
            status: job.status,
            progress: Some(job.progress),
            message: Some(job.message).filter(|m| !m.is_empty()),
        }
    }
}

impl Request<Result<JobStatusView, GetJobError>> for GetJobStatusQuery {}

pub async fn handle(
    registry: &JobRegistry,
    query: GetJobStatusQuery,
) -> Result<JobStatusView, GetJobError> {
    registry
        .get(&query.job_id)
        .await
        .map(JobStatusView::from)
        .ok_or(GetJobError::NotFound)
}
