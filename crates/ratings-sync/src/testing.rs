//! In-memory collaborators with injectable failures.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use ratings_core::{
    ExternalFeed, FeedPage, Job, JobStatus, JobStore, RatingRecord, RatingStore, RatingsError,
    RatingsResult,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<Uuid, Job>>,
    /// (status, progress, total) for every `update_status` call, in order
    updates: Mutex<Vec<(JobStatus, i64, i64)>>,
    update_calls: AtomicUsize,
    /// 1-based `update_status` call that should fail
    pub fail_update_on: Option<usize>,
}

impl MemoryJobStore {
    pub fn failing_update(call: usize) -> Self {
        Self {
            fail_update_on: Some(call),
            ..Default::default()
        }
    }

    pub fn updates(&self) -> Vec<(JobStatus, i64, i64)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn job(&self, id: Uuid) -> Job {
        self.jobs.lock().unwrap()[&id].clone()
    }

    fn with_job(&self, id: Uuid, f: impl FnOnce(&mut Job)) -> RatingsResult<()> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| RatingsError::NotFound(format!("job {}", id)))?;
        f(job);
        job.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, job: &Job) -> RatingsResult<()> {
        self.jobs.lock().unwrap().insert(job.id, job.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> RatingsResult<Option<Job>> {
        Ok(self.jobs.lock().unwrap().get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: JobStatus,
        progress: i64,
        total_items: i64,
    ) -> RatingsResult<()> {
        let call = self.update_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_update_on == Some(call) {
            return Err(RatingsError::Persistence("job table locked".into()));
        }
        self.updates.lock().unwrap().push((status, progress, total_items));
        self.with_job(id, |job| {
            job.status = status;
            job.progress = progress;
            job.total_items = total_items;
        })
    }

    async fn mark_completed(&self, id: Uuid) -> RatingsResult<()> {
        self.with_job(id, |job| {
            job.status = JobStatus::Completed;
            job.completed_at = Some(Utc::now());
        })
    }

    async fn mark_failed(&self, id: Uuid, message: &str) -> RatingsResult<()> {
        self.with_job(id, |job| {
            job.status = JobStatus::Failed;
            job.error_message = Some(message.to_string());
        })
    }
}

#[derive(Default)]
pub struct MemoryRatingStore {
    records: Mutex<Vec<RatingRecord>>,
    batch_calls: AtomicUsize,
    /// 1-based `create_batch` call that should fail
    pub fail_batch_on: Option<usize>,
}

impl MemoryRatingStore {
    pub fn failing_batch(call: usize) -> Self {
        Self {
            fail_batch_on: Some(call),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RatingStore for MemoryRatingStore {
    async fn create(&self, record: &RatingRecord) -> RatingsResult<i64> {
        let mut records = self.records.lock().unwrap();
        records.push(record.clone());
        Ok(records.len() as i64)
    }

    async fn create_batch(&self, batch: &[RatingRecord]) -> RatingsResult<()> {
        let call = self.batch_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_batch_on == Some(call) {
            return Err(RatingsError::Persistence("disk full".into()));
        }
        self.records.lock().unwrap().extend_from_slice(batch);
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> RatingsResult<Option<RatingRecord>> {
        Ok(self.records.lock().unwrap().get((id - 1) as usize).cloned())
    }

    async fn get_by_ticker(&self, ticker: &str) -> RatingsResult<Vec<RatingRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.ticker == ticker)
            .cloned()
            .collect())
    }

    async fn get_latest_by_ticker(&self, ticker: &str) -> RatingsResult<Option<RatingRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.ticker == ticker)
            .max_by_key(|r| r.time)
            .cloned())
    }

    async fn get_page(&self, offset: i64, limit: i64) -> RatingsResult<Vec<RatingRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> RatingsResult<i64> {
        Ok(self.len() as i64)
    }
}

/// Serves `items` split into pages of `page_size`, or fails every fetch.
pub struct StaticFeed {
    items: Vec<RatingRecord>,
    page_size: usize,
    fail: bool,
}

impl StaticFeed {
    pub fn new(items: Vec<RatingRecord>, page_size: usize) -> Self {
        Self {
            items,
            page_size,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            items: Vec::new(),
            page_size: 1,
            fail: true,
        }
    }
}

#[async_trait]
impl ExternalFeed for StaticFeed {
    async fn fetch_page(&self, cursor: Option<&str>) -> RatingsResult<FeedPage> {
        if self.fail {
            return Err(RatingsError::ExternalFetch("unexpected status code: 503".into()));
        }
        let start: usize = cursor.and_then(|c| c.parse().ok()).unwrap_or(0);
        let end = (start + self.page_size).min(self.items.len());
        Ok(FeedPage {
            items: self.items[start..end].to_vec(),
            next_page: (end < self.items.len()).then(|| end.to_string()),
        })
    }
}

pub fn records(n: usize) -> Vec<RatingRecord> {
    (0..n)
        .map(|i| RatingRecord {
            id: None,
            ticker: format!("TK{}", i % 7),
            target_from: format!("${}.00", 10 + i % 13),
            target_to: format!("${}.00", 12 + i % 13),
            company: "Test Co".to_string(),
            action: "target raised by".to_string(),
            brokerage: "Acme".to_string(),
            rating_from: "Buy".to_string(),
            rating_to: "Buy".to_string(),
            time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(i as i64),
        })
        .collect()
}
