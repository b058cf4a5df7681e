use async_trait::async_trait;
use uuid::Uuid;

use crate::{FeedPage, Job, JobStatus, RatingRecord, RatingsResult};

/// Storage for analyst rating observations.
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Insert one record, returning its assigned id.
    async fn create(&self, record: &RatingRecord) -> RatingsResult<i64>;

    /// Insert a batch as one atomic unit. Callers do their own chunking.
    async fn create_batch(&self, records: &[RatingRecord]) -> RatingsResult<()>;

    async fn get_by_id(&self, id: i64) -> RatingsResult<Option<RatingRecord>>;

    /// All records for a ticker, in insertion order.
    async fn get_by_ticker(&self, ticker: &str) -> RatingsResult<Vec<RatingRecord>>;

    async fn get_latest_by_ticker(&self, ticker: &str) -> RatingsResult<Option<RatingRecord>>;

    /// A stable offset/limit window over every stored record.
    async fn get_page(&self, offset: i64, limit: i64) -> RatingsResult<Vec<RatingRecord>>;

    async fn count(&self) -> RatingsResult<i64>;
}

/// Storage for ingestion job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: &Job) -> RatingsResult<()>;

    async fn get_by_id(&self, id: Uuid) -> RatingsResult<Option<Job>>;

    async fn update_status(
        &self,
        id: Uuid,
        status: JobStatus,
        progress: i64,
        total_items: i64,
    ) -> RatingsResult<()>;

    async fn mark_completed(&self, id: Uuid) -> RatingsResult<()>;

    async fn mark_failed(&self, id: Uuid, message: &str) -> RatingsResult<()>;
}

/// A cursor-paginated source of rating records.
#[async_trait]
pub trait ExternalFeed: Send + Sync {
    /// Fetch the page at `cursor`, or the first page when `cursor` is `None`.
    async fn fetch_page(&self, cursor: Option<&str>) -> RatingsResult<FeedPage>;
}
