//! Job commands

pub mod submit_job;

pub use submit_job::{SubmitJobCommand, SubmitJobResponse};
