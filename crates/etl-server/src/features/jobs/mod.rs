//! Jobs feature module
//!
//! Submission runs a job to completion; queries read the job registry.

pub mod commands;
pub mod queries;
pub mod routes;


pub use routes::jobs_routes;
