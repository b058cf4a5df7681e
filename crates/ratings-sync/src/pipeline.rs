use ratings_core::{JobStatus, RatingStore};
use ratings_feed::FeedPager;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::JobTracker;

/// How a single ingestion run ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SyncOutcome {
    Completed { items: usize, chunks: usize },
    Failed { message: String },
}

/// Feed drain followed by chunked batch commits, with progress recorded on the job.
///
/// A failure at any stage stops the run and marks the job failed. Chunks committed
/// before the failing one stay committed.
#[derive(Clone)]
pub struct IngestionPipeline {
    tracker: JobTracker,
    pager: FeedPager,
    ratings: Arc<dyn RatingStore>,
    chunk_size: usize,
}

impl IngestionPipeline {
    pub fn new(
        tracker: JobTracker,
        pager: FeedPager,
        ratings: Arc<dyn RatingStore>,
        chunk_size: usize,
    ) -> Self {
        Self {
            tracker,
            pager,
            ratings,
            chunk_size: chunk_size.max(1),
        }
    }

    pub async fn run(&self, job_id: Uuid) -> SyncOutcome {
        let started = Instant::now();

        if let Err(e) = self.tracker.advance(job_id, JobStatus::Processing, 0, 0).await {
            return self
                .fail(job_id, format!("Failed to update job status: {}", e))
                .await;
        }

        let items = match self.pager.drain().await {
            Ok(items) => items,
            Err(e) => {
                return self
                    .fail(job_id, format!("Failed to get items from external API: {}", e))
                    .await;
            }
        };

        let total = items.len() as i64;
        if let Err(e) = self.tracker.advance(job_id, JobStatus::Processing, 0, total).await {
            return self
                .fail(job_id, format!("Failed to update job progress: {}", e))
                .await;
        }

        let mut processed = 0i64;
        let mut chunks = 0usize;

        for (index, chunk) in items.chunks(self.chunk_size).enumerate() {
            let start = index * self.chunk_size;
            let end = start + chunk.len();

            if let Err(e) = self.ratings.create_batch(chunk).await {
                return self
                    .fail(job_id, format!("Failed to store chunk {}-{}: {}", start, end, e))
                    .await;
            }

            processed += chunk.len() as i64;
            chunks += 1;
            tracing::debug!("Job {}: committed chunk {}-{} ({}/{})", job_id, start, end, processed, total);

            if let Err(e) = self
                .tracker
                .advance(job_id, JobStatus::Processing, processed, total)
                .await
            {
                return self
                    .fail(job_id, format!("Failed to update job progress: {}", e))
                    .await;
            }
        }

        if let Err(e) = self.tracker.complete(job_id).await {
            return self
                .fail(job_id, format!("Failed to mark job as completed: {}", e))
                .await;
        }

        tracing::info!(
            "Job {} completed: {} ratings in {} chunks ({:.1}s)",
            job_id,
            processed,
            chunks,
            started.elapsed().as_secs_f64()
        );

        SyncOutcome::Completed {
            items: processed as usize,
            chunks,
        }
    }

    async fn fail(&self, job_id: Uuid, message: String) -> SyncOutcome {
        tracing::warn!("Job {} failed: {}", job_id, message);
        if let Err(e) = self.tracker.fail(job_id, &message).await {
            tracing::error!("Job {}: could not record failure: {}", job_id, e);
        }
        SyncOutcome::Failed { message }
    }
}
