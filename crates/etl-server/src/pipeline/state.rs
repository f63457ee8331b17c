//! Job record and its state transitions
//!
//! ```text
//! pending -> running -> completed
//!                    \-> failed
//! ```
//!
//! Jobs are created already `running`. While running, progress only moves
//! forward through the stage checkpoints. A terminal job rejects every
//! further transition.

use chrono::{DateTime, Utc};
use etl_common::{JobStatus, JobSummary};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::JobError;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Read,
    Clean,
    Persist,
}

impl Stage {
    /// Progress reported when the stage begins.
    pub fn checkpoint(self) -> u8 {
        match self {
            Stage::Read => 10,
            Stage::Clean => 40,
            Stage::Persist => 80,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Stage::Read => "Reading file",
            Stage::Clean => "Cleaning data",
            Stage::Persist => "Inserting rows into database",
        }
    }
}

/// Rejected state change
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("job '{job_id}' is already {status}")]
    Terminal { job_id: String, status: JobStatus },

    #[error("job '{job_id}' cannot move progress back from {current} to {requested}")]
    Regression {
        job_id: String,
        current: u8,
        requested: u8,
    },
}

/// One ETL job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_id: Option<String>,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    /// Present once the job completes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<JobSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// A freshly submitted job: `running`, progress 0.
    pub fn start(job_id: String, filename: String, study_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            job_id,
            filename,
            study_id,
            status: JobStatus::Running,
            progress: 0,
            message: "Job started".to_string(),
            summary: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Move to the checkpoint of `stage`.
    pub fn enter_stage(&mut self, stage: Stage) -> Result<(), TransitionError> {
        self.ensure_active()?;

        let requested = stage.checkpoint();
        if requested < self.progress {
            return Err(TransitionError::Regression {
                job_id: self.job_id.clone(),
                current: self.progress,
                requested,
            });
        }

        self.progress = requested;
        self.message = stage.message().to_string();
        self.touch();
        Ok(())
    }

    /// Terminal failure: progress resets to 0, message is the error text.
    pub fn fail(&mut self, error: &JobError) -> Result<(), TransitionError> {
        self.ensure_active()?;

        self.status = JobStatus::Failed;
        self.progress = 0;
        self.message = error.to_string();
        self.finish();
        Ok(())
    }

    /// Terminal success with the final row counts.
    pub fn complete(&mut self, summary: JobSummary) -> Result<(), TransitionError> {
        self.ensure_active()?;

        self.status = JobStatus::Completed;
        self.progress = 100;
        self.message = format!(
            "Completed: {} rows inserted, {} invalid rows",
            summary.rows_inserted, summary.invalid_rows
        );
        self.summary = Some(summary);
        self.finish();
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError::Terminal {
                job_id: self.job_id.clone(),
                status: self.status,
            });
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn finish(&mut self) {
        self.touch();
        self.completed_at = Some(self.updated_at);
    }
}
