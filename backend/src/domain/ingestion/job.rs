//! Ingestion job lifecycle and the in-process job registry.
//!
//! A submitted upload becomes a job running on its own tokio task; the
//! request path never awaits it. Callers poll the registry for a snapshot
//! or await the job through [`IngestionJobs::wait`]. Jobs flow
//! `running → completed | failed`; a failed job still carries the partial
//! report assembled before the stream broke.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tokio::task::JoinHandle;
use utoipa::ToSchema;
use uuid::Uuid;

use super::report::IngestionReport;

/// Status of an ingestion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// The job is walking the row sequence.
    Running,
    /// The row sequence was exhausted and every flush succeeded.
    Completed,
    /// The stream broke, the payload could not be decoded, or a batch
    /// flush failed.
    Failed,
}

impl JobStatus {
    /// Returns true once the job will no longer change.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Final outcome handed back by an ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionOutcome {
    pub report: IngestionReport,
    /// False whenever `report.job_errors` gained an entry: a stream break,
    /// an undecodable payload, or a failed batch flush.
    pub completed: bool,
}

impl IngestionOutcome {
    fn status(&self) -> JobStatus {
        if self.completed {
            JobStatus::Completed
        } else {
            JobStatus::Failed
        }
    }
}

/// Point-in-time view of one job, safe to hand to transport layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub id: Uuid,
    pub status: JobStatus,
    /// Present once the job reaches a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<IngestionReport>,
}

struct JobEntry {
    status: JobStatus,
    report: Option<IngestionReport>,
    handle: Option<JoinHandle<()>>,
}

/// Registry of ingestion jobs for the lifetime of the process.
///
/// Snapshots of completed jobs are retained; cancellation is not supported.
#[derive(Clone, Default)]
pub struct IngestionJobs {
    inner: Arc<RwLock<HashMap<Uuid, JobEntry>>>,
}

impl IngestionJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `job` on its own task and return the handle id immediately.
    pub fn submit<F>(&self, job: F) -> Uuid
    where
        F: Future<Output = IngestionOutcome> + Send + 'static,
    {
        let id = Uuid::new_v4();
        // Register before spawning so a fast job cannot finish first and
        // find no entry to record its outcome in.
        self.with_entries(|entries| {
            entries.insert(
                id,
                JobEntry {
                    status: JobStatus::Running,
                    report: None,
                    handle: None,
                },
            );
        });

        let registry = Self {
            inner: Arc::clone(&self.inner),
        };
        let handle = tokio::spawn(async move {
            let outcome = job.await;
            registry.with_entries(|entries| {
                if let Some(entry) = entries.get_mut(&id) {
                    entry.status = outcome.status();
                    entry.report = Some(outcome.report);
                }
            });
        });

        self.with_entries(|entries| {
            if let Some(entry) = entries.get_mut(&id) {
                entry.handle = Some(handle);
            }
        });
        id
    }

    /// Current snapshot of a job, or `None` for an unknown id.
    pub fn snapshot(&self, id: Uuid) -> Option<JobSnapshot> {
        let entries = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        entries.get(&id).map(|entry| JobSnapshot {
            id,
            status: entry.status,
            report: entry.report.clone(),
        })
    }

    /// Await a job's completion and return its terminal snapshot.
    ///
    /// Returns `None` for an unknown id. A job whose task panicked is
    /// reported as failed.
    pub async fn wait(&self, id: Uuid) -> Option<JobSnapshot> {
        let handle = self.with_entries(|entries| entries.get_mut(&id).and_then(|e| e.handle.take()));
        if let Some(handle) = handle {
            if handle.await.is_err() {
                self.with_entries(|entries| {
                    if let Some(entry) = entries.get_mut(&id) {
                        entry.status = JobStatus::Failed;
                    }
                });
            }
        }
        self.snapshot(id)
    }

    fn with_entries<T>(&self, f: impl FnOnce(&mut HashMap<Uuid, JobEntry>) -> T) -> T {
        let mut entries = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut entries)
    }
}
