use ratings_core::{Job, JobStatus, JobStore, RatingsError, RatingsResult};
use std::sync::Arc;
use uuid::Uuid;

/// Owns the persisted lifecycle of ingestion jobs.
///
/// Writes are plain overwrites. Monotonic progress and the terminal-state rule
/// are upheld by the single task that owns a job, not re-checked here.
#[derive(Clone)]
pub struct JobTracker {
    store: Arc<dyn JobStore>,
}

impl JobTracker {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Persist a new pending job.
    pub async fn create(&self, job_type: &str) -> RatingsResult<Job> {
        let job = Job::new(job_type);
        self.store.create(&job).await?;
        tracing::info!("Created {} job {}", job.job_type, job.id);
        Ok(job)
    }

    pub async fn advance(
        &self,
        id: Uuid,
        status: JobStatus,
        progress: i64,
        total_items: i64,
    ) -> RatingsResult<()> {
        self.store.update_status(id, status, progress, total_items).await
    }

    pub async fn complete(&self, id: Uuid) -> RatingsResult<()> {
        self.store.mark_completed(id).await
    }

    pub async fn fail(&self, id: Uuid, message: &str) -> RatingsResult<()> {
        self.store.mark_failed(id, message).await
    }

    pub async fn get(&self, id: Uuid) -> RatingsResult<Job> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| RatingsError::NotFound(format!("job {}", id)))
    }
}
