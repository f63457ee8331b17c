//! Job orchestration
//!
//! [`JobRunner::run`] drives one job through read, clean and persist, and
//! returns only when the job is terminal. The runner owns the job while it
//! runs and publishes a registry snapshot after every transition. Once the
//! job id is resubmitted, the older run stops publishing.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use etl_common::types::MEASUREMENTS_TABLE;
use etl_common::JobSummary;
use futures::FutureExt;
use tracing::Instrument;

use super::error::JobError;
use super::persister::MeasurementStore;
use super::registry::{JobRegistry, RunId};
use super::rowset::RowSet;
use super::sanitizer::{self, Sanitized};
use super::state::{Job, Stage};
use super::{policy, reader, schema};

/// Inputs for one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub job_id: String,
    pub filename: String,
    pub study_id: Option<String>,
}

/// Settings every job shares
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Destination connection string; `None` fails every job at persist time
    pub database_url: Option<String>,
    /// Base directory for relative filenames
    pub data_dir: Option<PathBuf>,
    pub table: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            database_url: None,
            data_dir: None,
            table: MEASUREMENTS_TABLE.to_string(),
        }
    }
}

impl PipelineSettings {
    /// Resolve a submitted filename against `data_dir`.
    pub fn resolve(&self, filename: &str) -> PathBuf {
        let path = Path::new(filename);
        match self.data_dir {
            Some(ref dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Runs submitted jobs against a store
#[derive(Clone)]
pub struct JobRunner {
    registry: JobRegistry,
    store: Arc<dyn MeasurementStore>,
    settings: Arc<PipelineSettings>,
}

impl JobRunner {
    pub fn new(
        registry: JobRegistry,
        store: Arc<dyn MeasurementStore>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            registry,
            store,
            settings: Arc::new(settings),
        }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Register `request` as a new job and process it to a terminal state.
    pub async fn run(&self, request: JobRequest) -> Job {
        let span = tracing::info_span!("etl_job", job_id = %request.job_id);
        self.run_job(request).instrument(span).await
    }

    async fn run_job(&self, request: JobRequest) -> Job {
        let path = self.settings.resolve(&request.filename);
        let mut job = Job::start(request.job_id, request.filename, request.study_id);

        let registration = self.registry.register(job.clone()).await;
        if let Some(previous) = registration.replaced {
            tracing::warn!(previous_status = %previous.status, "Replacing job with the same id");
        }
        let run = registration.run;
        tracing::info!(path = %path.display(), "Job started");

        let outcome = AssertUnwindSafe(self.execute(run, &mut job, &path))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(JobError::Internal(panic_message(panic))));

        let finished = match outcome {
            Ok(summary) => {
                tracing::info!(
                    rows_inserted = summary.rows_inserted,
                    invalid_rows = summary.invalid_rows,
                    "Job completed"
                );
                job.complete(summary)
            },
            Err(err) => {
                tracing::warn!(error_kind = err.kind(), error = %err, "Job failed");
                job.fail(&err)
            },
        };

        if let Err(violation) = finished {
            tracing::error!(error = %violation, "Invalid job transition");
        }

        if !self.registry.publish(run, &job).await {
            tracing::warn!("Job was resubmitted while running; result not recorded");
        }
        job
    }

    async fn execute(&self, run: RunId, job: &mut Job, path: &Path) -> Result<JobSummary, JobError> {
        self.advance(run, job, Stage::Read).await?;
        let owned_path = path.to_path_buf();
        let rows = blocking(move || schema::validate(reader::read_rowset(&owned_path)?)).await?;

        self.advance(run, job, Stage::Clean).await?;
        let Sanitized {
            valid,
            invalid_count,
            total_count,
        } = blocking(move || Ok(sanitizer::sanitize(rows))).await?;
        policy::enforce(invalid_count, total_count)?;

        self.advance(run, job, Stage::Persist).await?;
        let database_url = self
            .settings
            .database_url
            .as_deref()
            .ok_or(JobError::ConfigMissing)?;
        self.persist(database_url, &valid).await?;

        Ok(JobSummary::new(valid.len() as u64, invalid_count as u64))
    }

    async fn persist(&self, database_url: &str, valid: &RowSet) -> Result<(), JobError> {
        let written = self
            .store
            .append(database_url, &self.settings.table, valid)
            .await?;

        if written != valid.len() as u64 {
            tracing::warn!(expected = valid.len(), written, "Store reported a different row count");
        }
        Ok(())
    }

    async fn advance(&self, run: RunId, job: &mut Job, stage: Stage) -> Result<(), JobError> {
        job.enter_stage(stage).map_err(|violation| {
            tracing::error!(error = %violation, "Invalid job transition");
            JobError::Internal(violation.to_string())
        })?;
        tracing::info!(progress = job.progress, stage = ?stage, "{}", stage.message());
        self.registry.publish(run, job).await;
        Ok(())
    }
}

/// Run CPU or file bound work off the async workers. A panic becomes
/// [`JobError::Internal`].
async fn blocking<T, F>(work: F) -> Result<T, JobError>
where
    F: FnOnce() -> Result<T, JobError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected panic".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::pipeline::error::PersistError;
    use crate::pipeline::persister::InMemoryStore;
    use async_trait::async_trait;
    use etl_common::JobStatus;
    use std::io::Write;

    const HEADER: &str = "study_id,participant_id,measurement_type,value,timestamp,site_id";

    fn csv_file(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", body).unwrap();
        file
    }

    fn runner(store: Arc<dyn MeasurementStore>, database_url: Option<&str>) -> JobRunner {
        JobRunner::new(
            JobRegistry::new(),
            store,
            PipelineSettings {
                database_url: database_url.map(str::to_string),
                ..PipelineSettings::default()
            },
        )
    }

    fn request(id: &str, path: &Path) -> JobRequest {
        JobRequest {
            job_id: id.to_string(),
            filename: path.display().to_string(),
            study_id: None,
        }
    }

    /// Blocks the first append until released
    #[derive(Default)]
    struct GatedStore {
        entered: tokio::sync::Notify,
        release: tokio::sync::Notify,
    }

    #[async_trait]
    impl MeasurementStore for GatedStore {
        async fn append(&self, _: &str, _: &str, rows: &RowSet) -> Result<u64, PersistError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(rows.len() as u64)
        }
    }

    struct PanickingStore;

    #[async_trait]
    impl MeasurementStore for PanickingStore {
        async fn append(&self, _: &str, _: &str, _: &RowSet) -> Result<u64, PersistError> {
            panic!("store exploded");
        }
    }

    #[test]
    fn test_resolve_relative_paths() {
        let settings = PipelineSettings {
            data_dir: Some(PathBuf::from("/data/uploads")),
            ..PipelineSettings::default()
        };
        assert_eq!(settings.resolve("a.csv"), PathBuf::from("/data/uploads/a.csv"));
        assert_eq!(settings.resolve("/tmp/a.csv"), PathBuf::from("/tmp/a.csv"));
        assert_eq!(PipelineSettings::default().resolve("a.csv"), PathBuf::from("a.csv"));
    }

    #[tokio::test]
    async fn test_successful_job_publishes_terminal_state() {
        let file = csv_file(&format!("{HEADER}\nS1,P1,hr,72,2024-01-01,A\nS1,P2,hr,,2024-01-01,A\n"));
        let store = Arc::new(InMemoryStore::new());
        let runner = runner(store.clone(), Some("postgres://localhost/etl"));

        let job = runner.run(request("ok", file.path())).await;

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.message, "Completed: 1 rows inserted, 1 invalid rows");
        assert_eq!(store.row_count(), 1);
        assert_eq!(store.appended()[0].0, MEASUREMENTS_TABLE);
        assert_eq!(runner.registry().get("ok").await.unwrap(), job);
    }

    #[tokio::test]
    async fn test_missing_database_url_fails_at_persist() {
        let file = csv_file(&format!("{HEADER}\nS1,P1,hr,72,2024-01-01,A\n"));
        let store = Arc::new(InMemoryStore::new());
        let runner = runner(store.clone(), None);

        let job = runner.run(request("cfg", file.path())).await;

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.progress, 0);
        assert_eq!(job.message, "DATABASE_URL is not set in the environment");
        assert_eq!(store.row_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_recorded() {
        let file = csv_file(&format!("{HEADER}\nS1,P1,hr,72,2024-01-01,A\n"));
        let store = Arc::new(InMemoryStore::failing("relation \"clinical_measurements\" does not exist"));
        let runner = runner(store, Some("postgres://localhost/etl"));

        let job = runner.run(request("db", file.path())).await;

        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.message.starts_with("Database insert failed: relation"));
    }

    #[tokio::test]
    async fn test_panic_is_recorded_as_failure() {
        let file = csv_file(&format!("{HEADER}\nS1,P1,hr,72,2024-01-01,A\n"));
        let runner = runner(Arc::new(PanickingStore), Some("postgres://localhost/etl"));

        let job = runner.run(request("boom", file.path())).await;

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.progress, 0);
        assert_eq!(job.message, "Processing job failed: store exploded");
    }

    #[tokio::test]
    async fn test_resubmitted_id_keeps_latest_run() {
        let slow = csv_file(&format!("{HEADER}\nS1,P1,hr,72,2024-01-01,A\n"));
        let empty = csv_file(&format!("{HEADER}\n"));
        let store = Arc::new(GatedStore::default());
        let runner = runner(store.clone(), Some("postgres://localhost/etl"));

        let first = tokio::spawn({
            let runner = runner.clone();
            let path = slow.path().to_path_buf();
            async move { runner.run(request("same", &path)).await }
        });
        store.entered.notified().await;

        let second = runner.run(request("same", empty.path())).await;
        assert_eq!(second.status, JobStatus::Failed);

        store.release.notify_one();
        let first = first.await.unwrap();
        assert_eq!(first.status, JobStatus::Completed);

        let current = runner.registry().get("same").await.unwrap();
        assert_eq!(current, second);
        assert_eq!(runner.registry().len().await, 1);
    }
}
