//! Process-wide job registry
//!
//! Lives for the lifetime of the process and is never persisted. Runners
//! publish snapshots of their job; readers only ever see whole snapshots.
//!
//! Every registration gets a fresh [`RunId`]. Resubmitting a job id starts a
//! new run, and snapshots from the replaced run are dropped.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::state::Job;

/// Identifies one registration of a job id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(u64);

/// Result of [`JobRegistry::register`]
#[derive(Debug)]
pub struct Registration {
    /// Token the new run publishes with
    pub run: RunId,
    /// Job that held the id before, if any
    pub replaced: Option<Job>,
}

#[derive(Debug, Default)]
struct Entries {
    next_run: u64,
    jobs: HashMap<String, (RunId, Job)>,
}

/// Shared map from job id to the latest job snapshot
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    inner: Arc<RwLock<Entries>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a newly submitted job, replacing any job with the same id.
    pub async fn register(&self, job: Job) -> Registration {
        let mut entries = self.inner.write().await;
        entries.next_run += 1;
        let run = RunId(entries.next_run);
        let replaced = entries
            .jobs
            .insert(job.job_id.clone(), (run, job))
            .map(|(_, previous)| previous);

        Registration { run, replaced }
    }

    /// Store the current state of a job for `run`.
    ///
    /// Returns `false` and leaves the registry untouched when the id now
    /// belongs to a different run or was never registered.
    pub async fn publish(&self, run: RunId, job: &Job) -> bool {
        let mut entries = self.inner.write().await;
        match entries.jobs.get_mut(&job.job_id) {
            Some((current, slot)) if *current == run => {
                *slot = job.clone();
                true
            },
            _ => {
                tracing::debug!(job_id = %job.job_id, "Dropping snapshot from a replaced run");
                false
            },
        }
    }

    pub async fn get(&self, job_id: &str) -> Option<Job> {
        self.inner
            .read()
            .await
            .jobs
            .get(job_id)
            .map(|(_, job)| job.clone())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.jobs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.jobs.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::pipeline::state::Stage;

    #[tokio::test]
    async fn test_unknown_id_is_absent() {
        let registry = JobRegistry::new();
        assert!(registry.get("nope").await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_publish_replaces_snapshot() {
        let registry = JobRegistry::new();
        let mut job = Job::start("a".into(), "f.csv".into(), None);
        let registration = registry.register(job.clone()).await;
        assert!(registration.replaced.is_none());

        job.enter_stage(Stage::Read).unwrap();
        assert!(registry.publish(registration.run, &job).await);

        assert_eq!(registry.get("a").await.unwrap().progress, 10);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_submission_overwrites() {
        let registry = JobRegistry::new();
        registry.register(Job::start("a".into(), "first.csv".into(), None)).await;

        let replaced = registry
            .register(Job::start("a".into(), "second.csv".into(), None))
            .await
            .replaced
            .unwrap();

        assert_eq!(replaced.filename, "first.csv");
        assert_eq!(registry.get("a").await.unwrap().filename, "second.csv");
    }

    #[tokio::test]
    async fn test_replaced_run_cannot_publish() {
        let registry = JobRegistry::new();
        let mut first = Job::start("a".into(), "first.csv".into(), None);
        let first_run = registry.register(first.clone()).await.run;
        let second_run = registry
            .register(Job::start("a".into(), "second.csv".into(), None))
            .await
            .run;
        assert_ne!(first_run, second_run);

        first.enter_stage(Stage::Read).unwrap();
        assert!(!registry.publish(first_run, &first).await);

        let current = registry.get("a").await.unwrap();
        assert_eq!(current.filename, "second.csv");
        assert_eq!(current.progress, 0);
    }

    #[tokio::test]
    async fn test_publish_without_register_is_ignored() {
        let registry = JobRegistry::new();
        let run = registry.register(Job::start("a".into(), "a.csv".into(), None)).await.run;

        let stray = Job::start("b".into(), "b.csv".into(), None);
        assert!(!registry.publish(run, &stray).await);
        assert!(registry.get("b").await.is_none());
    }
}
