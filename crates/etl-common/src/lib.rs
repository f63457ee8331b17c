//! Clinical ETL Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the clinical ETL workspace.
//!
//! # Overview
//!
//! - **Error Handling**: `EtlError` and the shared `Result` alias
//! - **Logging**: `tracing` subscriber setup driven by environment variables
//! - **Types**: job status vocabulary and the required measurement columns
//!
//! # Example
//!
//! ```no_run
//! use etl_common::logging::{init_logging, LogConfig};
//! use etl_common::types::REQUIRED_FIELDS;
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&LogConfig::from_env()?)?;
//!     tracing::info!(fields = ?REQUIRED_FIELDS, "Required columns");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{EtlError, Result};
pub use types::{JobStatus, JobSummary, REQUIRED_FIELDS};
