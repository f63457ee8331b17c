//! Get job query
//!
//! Returns the full job record by id.

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::pipeline::{Job, JobRegistry};

/// Query to get a job by ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetJobQuery {
    pub job_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GetJobError {
    #[error("Job not found")]
    NotFound,
}

impl Request<Result<Job, GetJobError>> for GetJobQuery {}

pub async fn handle(registry: &JobRegistry, query: GetJobQuery) -> Result<Job, GetJobError> {
    registry.get(&query.job_id).await.ok_or(GetJobError::NotFound)
}
