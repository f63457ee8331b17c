//! Common types used across the clinical ETL service

use serde::{Deserialize, Serialize};

/// Columns every clinical measurement row must carry.
///
/// The order here is the order used when reporting missing columns.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "study_id",
    "participant_id",
    "measurement_type",
    "value",
    "timestamp",
    "site_id",
];

/// Destination table for accepted measurements.
pub const MEASUREMENTS_TABLE: &str = "clinical_measurements";

// ============================================================================
// Job Types
// ============================================================================

/// Lifecycle status of an ETL job.
///
/// `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = crate::EtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(crate::EtlError::Parse(format!("unknown job status: {}", other))),
        }
    }
}

/// Row counts reported once a job completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    /// Data rows read from the source file
    pub total_rows: u64,
    /// Rows appended to the destination table
    pub rows_inserted: u64,
    /// Rows rejected for a missing required value
    pub invalid_rows: u64,
}

impl JobSummary {
    pub fn new(rows_inserted: u64, invalid_rows: u64) -> Self {
        Self {
            total_rows: rows_inserted + invalid_rows,
            rows_inserted,
            invalid_rows,
        }
    }
}
