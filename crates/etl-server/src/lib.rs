//! ETL Server Library
//!
//! Ingests clinical measurement CSV files into a relational store and tracks
//! each ingestion as a job.
//!
//! # Overview
//!
//! - **Pipeline**: read, validate, sanitize, apply the quality gate, persist
//! - **Jobs API**: submit a file, query job status and detail
//! - **Configuration**: environment-based, loaded once at startup
//! - **Middleware**: CORS and request logging
//!
//! # Architecture
//!
//! Feature slices follow a CQRS layout: `commands/` for job submission,
//! `queries/` for status reads. Jobs run synchronously inside the submitting
//! request; a shared [`pipeline::JobRegistry`] holds the latest snapshot of
//! every job for status queries.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use etl_server::{api, config::Config, pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let runner = pipeline::JobRunner::new(
//!         pipeline::JobRegistry::new(),
//!         Arc::new(pipeline::PostgresStore),
//!         config.pipeline_settings(),
//!     );
//!     api::serve(config, api::AppState { runner }).await
//! }
//! ```
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod pipeline;

pub use error::{ApiResult, AppError};
