//! Job queries

pub mod get_job;
pub mod get_job_status;

pub use get_job::{GetJobError, GetJobQuery};
pub use get_job_status::{GetJobStatusQuery, JobStatusView};
