//! Feature modules implementing the ETL API
//!
//! Each feature is a vertical slice with its own `commands/`, `queries/` and
//! `routes.rs`. Commands and queries implement `mediator::Request`.
//!
//! # Features
//!
//! - **jobs**: Job submission and status tracking

pub mod jobs;

use axum::Router;

use crate::pipeline::JobRunner;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Runs submitted jobs and owns the job registry
    pub runner: JobRunner,
}

/// Creates the router with all feature routes mounted at the root
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().merge(jobs::jobs_routes().with_state(state.runner))
}
