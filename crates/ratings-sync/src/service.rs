use ratings_core::{ExternalFeed, Job, JobStore, RatingStore, RatingsResult};
use ratings_feed::FeedPager;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::{IngestionPipeline, JobTracker, SyncConfig};

/// Entry point for feed synchronisation: trigger a run, then look up its job.
///
/// Overlapping triggers are not deduplicated; each one gets its own job and task.
#[derive(Clone)]
pub struct SyncService {
    tracker: JobTracker,
    pipeline: IngestionPipeline,
    config: SyncConfig,
}

impl SyncService {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        ratings: Arc<dyn RatingStore>,
        feed: Arc<dyn ExternalFeed>,
        config: SyncConfig,
    ) -> Self {
        let tracker = JobTracker::new(jobs);
        let pipeline = IngestionPipeline::new(
            tracker.clone(),
            FeedPager::new(feed),
            ratings,
            config.chunk_size,
        );

        Self {
            tracker,
            pipeline,
            config,
        }
    }

    /// Create a pending job and start ingesting in the background.
    ///
    /// Returns as soon as the job is persisted. Later failures are only visible on the job.
    pub async fn trigger_sync(&self) -> RatingsResult<Job> {
        let job = self.tracker.create(&self.config.job_type).await?;
        self.spawn_run(job.id);
        Ok(job)
    }

    pub async fn get_job(&self, id: Uuid) -> RatingsResult<Job> {
        self.tracker.get(id).await
    }

    /// Poll a job until it reaches a terminal state or `max_wait` runs out,
    /// returning the last observed state either way.
    pub async fn wait_for_terminal(
        &self,
        id: Uuid,
        poll_interval: Duration,
        max_wait: Duration,
    ) -> RatingsResult<Job> {
        let deadline = tokio::time::Instant::now() + max_wait;
        loop {
            let job = self.tracker.get(id).await?;
            if job.status.is_terminal() || tokio::time::Instant::now() >= deadline {
                return Ok(job);
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    fn spawn_run(&self, job_id: Uuid) {
        let pipeline = self.pipeline.clone();
        let deadline = self.config.deadline;

        tokio::spawn(async move {
            // Exceeding the deadline drops the run; the job keeps its last recorded state.
            if tokio::time::timeout(deadline, pipeline.run(job_id)).await.is_err() {
                tracing::warn!(
                    "Job {} exceeded its {}s deadline and was abandoned",
                    job_id,
                    deadline.as_secs()
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{records, MemoryJobStore, MemoryRatingStore, StaticFeed};
    use async_trait::async_trait;
    use ratings_core::{FeedPage, JobStatus, RatingsError};

    const POLL: Duration = Duration::from_millis(5);
    const WAIT: Duration = Duration::from_secs(5);

    fn service(feed: impl ExternalFeed + 'static, config: SyncConfig) -> (SyncService, Arc<MemoryRatingStore>) {
        let ratings = Arc::new(MemoryRatingStore::default());
        let svc = SyncService::new(
            Arc::new(MemoryJobStore::default()),
            ratings.clone(),
            Arc::new(feed),
            config,
        );
        (svc, ratings)
    }

    /// Never answers, so the run can only end through the deadline.
    struct StalledFeed;

    #[async_trait]
    impl ExternalFeed for StalledFeed {
        async fn fetch_page(&self, _cursor: Option<&str>) -> RatingsResult<FeedPage> {
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    #[tokio::test]
    async fn test_trigger_returns_pending_job_then_completes() {
        let (svc, ratings) = service(StaticFeed::new(records(130), 50), SyncConfig::default().with_chunk_size(100));

        let job = svc.trigger_sync().await.unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.job_type, "external_api_sync");

        let done = svc.wait_for_terminal(job.id, POLL, WAIT).await.unwrap();
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!((done.progress, done.total_items), (130, 130));
        assert_eq!(ratings.len(), 130);
    }

    #[tokio::test]
    async fn test_failed_run_is_reported_on_the_job_only() {
        let (svc, _) = service(StaticFeed::failing(), SyncConfig::default());

        let job = svc.trigger_sync().await.unwrap();
        let done = svc.wait_for_terminal(job.id, POLL, WAIT).await.unwrap();

        assert_eq!(done.status, JobStatus::Failed);
        assert!(done.error_message.is_some());
    }

    #[tokio::test]
    async fn test_overlapping_triggers_run_independently() {
        let (svc, ratings) = service(StaticFeed::new(records(20), 20), SyncConfig::default());

        let first = svc.trigger_sync().await.unwrap();
        let second = svc.trigger_sync().await.unwrap();
        assert_ne!(first.id, second.id);

        for id in [first.id, second.id] {
            let done = svc.wait_for_terminal(id, POLL, WAIT).await.unwrap();
            assert_eq!(done.status, JobStatus::Completed);
        }
        assert_eq!(ratings.len(), 40);
    }

    #[tokio::test]
    async fn test_deadline_leaves_last_recorded_state() {
        let config = SyncConfig::default().with_deadline(Duration::from_millis(20));
        let (svc, _) = service(StalledFeed, config);

        let job = svc.trigger_sync().await.unwrap();

        // wait for the run to reach the feed, however slowly it gets scheduled
        let started = tokio::time::Instant::now();
        loop {
            let current = svc.get_job(job.id).await.unwrap();
            if current.status == JobStatus::Processing {
                break;
            }
            assert!(started.elapsed() < WAIT, "job never started processing");
            tokio::time::sleep(POLL).await;
        }

        // well past the deadline, nothing moved the job on
        tokio::time::sleep(Duration::from_millis(100)).await;
        let after = svc.get_job(job.id).await.unwrap();
        assert_eq!(after.status, JobStatus::Processing);
        assert!(after.error_message.is_none());
        assert!(after.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_get_unknown_job_is_not_found() {
        let (svc, _) = service(StaticFeed::new(Vec::new(), 1), SyncConfig::default());
        assert!(matches!(
            svc.get_job(Uuid::new_v4()).await,
            Err(RatingsError::NotFound(_))
        ));
    }
}
