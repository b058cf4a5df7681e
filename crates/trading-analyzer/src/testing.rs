//! Read-only rating store fixture.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use ratings_core::{RatingRecord, RatingStore, RatingsError, RatingsResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, d, 0, 0, 0).unwrap()
}

pub fn rating(ticker: &str, d: u32, target_from: &str) -> RatingRecord {
    RatingRecord {
        id: None,
        ticker: ticker.to_string(),
        target_from: target_from.to_string(),
        target_to: String::new(),
        company: format!("{} Inc.", ticker),
        action: format!("action-{}", d),
        brokerage: format!("broker-{}", d),
        rating_from: format!("rating-{}", d),
        rating_to: "Buy".to_string(),
        time: day(d),
    }
}

#[derive(Default)]
pub struct FixtureStore {
    records: Vec<RatingRecord>,
    page_calls: AtomicUsize,
    page_offsets: Mutex<Vec<i64>>,
    failing_ticker: Option<String>,
}

impl FixtureStore {
    pub fn new(records: Vec<RatingRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub fn failing_for(mut self, ticker: &str) -> Self {
        self.failing_ticker = Some(ticker.to_string());
        self
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn page_offsets(&self) -> Vec<i64> {
        self.page_offsets.lock().unwrap().clone()
    }
}

#[async_trait]
impl RatingStore for FixtureStore {
    async fn create(&self, _record: &RatingRecord) -> RatingsResult<i64> {
        Err(RatingsError::Persistence("fixture is read-only".into()))
    }

    async fn create_batch(&self, _records: &[RatingRecord]) -> RatingsResult<()> {
        Err(RatingsError::Persistence("fixture is read-only".into()))
    }

    async fn get_by_id(&self, id: i64) -> RatingsResult<Option<RatingRecord>> {
        Ok(self.records.iter().find(|r| r.id == Some(id)).cloned())
    }

    async fn get_by_ticker(&self, ticker: &str) -> RatingsResult<Vec<RatingRecord>> {
        if self.failing_ticker.as_deref() == Some(ticker) {
            return Err(RatingsError::Persistence("connection reset".into()));
        }
        Ok(self.records.iter().filter(|r| r.ticker == ticker).cloned().collect())
    }

    async fn get_latest_by_ticker(&self, ticker: &str) -> RatingsResult<Option<RatingRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.ticker == ticker)
            .max_by_key(|r| r.time)
            .cloned())
    }

    async fn get_page(&self, offset: i64, limit: i64) -> RatingsResult<Vec<RatingRecord>> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.page_offsets.lock().unwrap().push(offset);
        Ok(self
            .records
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> RatingsResult<i64> {
        Ok(self.records.len() as i64)
    }
}
