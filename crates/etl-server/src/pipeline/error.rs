//! Job failure taxonomy
//!
//! Every variant ends a job in the `failed` state. The `Display` text is the
//! message recorded on the job.

use thiserror::Error;

/// A stage failure that terminates a job
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Could not read file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("No data rows in file")]
    EmptyData,

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Duplicate columns after normalization: {}", .0.join(", "))]
    DuplicateColumns(Vec<String>),

    #[error("Too many invalid rows: {invalid}/{total}")]
    TooManyInvalidRows { invalid: usize, total: usize },

    #[error("DATABASE_URL is not set in the environment")]
    ConfigMissing,

    #[error("Database insert failed: {0}")]
    Persist(#[from] PersistError),

    #[error("Processing job failed: {0}")]
    Internal(String),
}

impl JobError {
    /// Short machine-readable label, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::Read { .. } => "read_error",
            JobError::EmptyData => "empty_data",
            JobError::MissingColumns(_) => "missing_columns",
            JobError::DuplicateColumns(_) => "duplicate_columns",
            JobError::TooManyInvalidRows { .. } => "too_many_invalid_rows",
            JobError::ConfigMissing => "config_missing",
            JobError::Persist(_) => "persist_error",
            JobError::Internal(_) => "internal",
        }
    }

    pub(crate) fn read(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        JobError::Read {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for JobError {
    fn from(err: tokio::task::JoinError) -> Self {
        JobError::Internal(err.to_string())
    }
}

/// Failure appending rows to the destination store
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("could not connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("{0}")]
    Write(#[from] sqlx::Error),

    #[error("{0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_lists_every_name() {
        let err = JobError::MissingColumns(vec!["value".into(), "site_id".into()]);
        assert_eq!(err.to_string(), "Missing required columns: value, site_id");
    }

    #[test]
    fn test_too_many_invalid_rows_reports_counts() {
        let err = JobError::TooManyInvalidRows { invalid: 6, total: 10 };
        assert_eq!(err.to_string(), "Too many invalid rows: 6/10");
        assert_eq!(err.kind(), "too_many_invalid_rows");
    }

    #[test]
    fn test_persist_error_carries_cause() {
        let err: JobError = PersistError::Unavailable("relation does not exist".into()).into();
        assert_eq!(err.to_string(), "Database insert failed: relation does not exist");
    }
}
