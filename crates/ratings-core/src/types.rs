use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{RatingsError, RatingsResult};

/// Tag recorded on jobs created by the external feed sync.
pub const EXTERNAL_API_SYNC: &str = "external_api_sync";

/// A single analyst rating observation, as delivered by the feed and as stored.
///
/// `target_from` / `target_to` are kept verbatim; they are not guaranteed to be numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub ticker: String,
    #[serde(default)]
    pub target_from: String,
    #[serde(default)]
    pub target_to: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub brokerage: String,
    #[serde(default)]
    pub rating_from: String,
    #[serde(default)]
    pub rating_to: String,
    pub time: DateTime<Utc>,
}

/// One page of the external feed. An empty or absent `next_page` ends the drain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub items: Vec<RatingRecord>,
    #[serde(default)]
    pub next_page: Option<String>,
}

impl FeedPage {
    /// The cursor for the following page, if the feed reported one.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_page.as_deref().filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Completed and failed jobs accept no further updates.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = RatingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(RatingsError::Validation(format!("unknown job status '{}'", other))),
        }
    }
}

/// Persisted record of one asynchronous ingestion attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    #[serde(rename = "type")]
    pub job_type: String,
    pub progress: i64,
    pub total_items: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// A fresh pending job with a newly allocated id.
    pub fn new(job_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: JobStatus::Pending,
            job_type: job_type.into(),
            progress: 0,
            total_items: 0,
            error_message: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }
}

/// A parsed, analyzable price observation derived from a rating record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: f64,
    pub time: DateTime<Utc>,
    pub brokerage: String,
    pub action: String,
    pub rating: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Best single buy/sell pair found over an analyzed window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingRecommendation {
    pub ticker: String,
    pub buy_price: f64,
    pub sell_price: f64,
    pub max_profit: f64,
    pub profit_percentage: f64,
    pub buy_time: DateTime<Utc>,
    pub sell_time: DateTime<Utc>,
    pub buy_brokerage: String,
    pub sell_brokerage: String,
    pub buy_action: String,
    pub sell_action: String,
    pub buy_rating: String,
    pub sell_rating: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_ticker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_ticker: Option<String>,
    pub total_data_points: usize,
    /// Records inside the window whose target price could not be parsed
    pub skipped_points: usize,
    pub date_range: DateRange,
}

/// Optional inclusive time bounds applied to rating observations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateWindow {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Rejects a window whose start lies after its end.
    pub fn validate(&self) -> RatingsResult<()> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => Err(RatingsError::Validation(format!(
                "start date {} is after end date {}",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ))),
            _ => Ok(()),
        }
    }

    /// Both bounds are inclusive.
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if time < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if time > end {
                return false;
            }
        }
        true
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Parse a `YYYY-MM-DD` bound into midnight UTC of that day.
pub fn parse_date_bound(value: &str) -> RatingsResult<DateTime<Utc>> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| RatingsError::Validation(format!("invalid date '{}', use YYYY-MM-DD", value)))
}

/// One page of stored ratings plus navigation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedRatings {
    pub data: Vec<RatingRecord>,
    pub page: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginatedRatings {
    pub fn new(data: Vec<RatingRecord>, page: i64, page_size: i64, total_count: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total_count + page_size - 1) / page_size
        } else {
            0
        };
        Self {
            data,
            page,
            page_size,
            total_count,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}
