//! In-process job store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use massval_core::verification::{JobStatus, JobStore, JobStoreError};

struct StoredJob {
    status: JobStatus,
    updated_at: DateTime<Utc>,
}

/// Keeps job statuses in memory. Finished jobs are dropped by
/// [`retention::run`](crate::retention::run) once they expire.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared between the HTTP handlers and the verification tasks.
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<String, StoredJob>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// When the job was last written.
    pub async fn updated_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.jobs.read().await.get(id).map(|job| job.updated_at)
    }

    /// Remove done jobs last written at or before `cutoff`. Running jobs are
    /// kept whatever their age. Returns the number of jobs removed.
    pub async fn purge_done_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| !(job.status.is_done() && job.updated_at <= cutoff));
        before - jobs.len()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

impl Default for InMemoryJobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn put(&self, status: JobStatus) -> Result<(), JobStoreError> {
        let mut jobs = self.jobs.write().await;
        if jobs.get(&status.id).is_some_and(|job| job.status.is_done()) {
            tracing::warn!(job_id = %status.id, "Refusing to overwrite a finished job");
            return Err(JobStoreError::Finalized { id: status.id });
        }
        jobs.insert(
            status.id.clone(),
            StoredJob {
                status,
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<JobStatus>, JobStoreError> {
        Ok(self.jobs.read().await.get(id).map(|job| job.status.clone()))
    }
}
