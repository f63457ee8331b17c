//! Error types for the clinical ETL service

use thiserror::Error;

/// Result type alias for shared ETL operations
pub type Result<T> = std::result::Result<T, EtlError>;

/// Main error type shared by ETL crates
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Parse error: {0}")]
    Parse(String),
}
