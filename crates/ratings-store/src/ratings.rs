use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ratings_core::{RatingRecord, RatingStore, RatingsResult};
use sqlx::FromRow;

use crate::db::{persistence, RatingsDb};

const SELECT_COLUMNS: &str = "SELECT id, ticker, target_from, target_to, company, action, brokerage, \
     rating_from, rating_to, time FROM stock_ratings";

const INSERT_RATING: &str = r#"
    INSERT INTO stock_ratings (ticker, target_from, target_to, company, action, brokerage, rating_from, rating_to, time)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

#[derive(Debug, FromRow)]
struct RatingRow {
    id: i64,
    ticker: String,
    target_from: String,
    target_to: String,
    company: String,
    action: String,
    brokerage: String,
    rating_from: String,
    rating_to: String,
    time: DateTime<Utc>,
}

impl From<RatingRow> for RatingRecord {
    fn from(row: RatingRow) -> Self {
        RatingRecord {
            id: Some(row.id),
            ticker: row.ticker,
            target_from: row.target_from,
            target_to: row.target_to,
            company: row.company,
            action: row.action,
            brokerage: row.brokerage,
            rating_from: row.rating_from,
            rating_to: row.rating_to,
            time: row.time,
        }
    }
}

/// SQLite-backed rating storage. Stored records are never updated.
#[derive(Clone)]
pub struct SqliteRatingStore {
    db: RatingsDb,
}

impl SqliteRatingStore {
    pub fn new(db: RatingsDb) -> Self {
        Self { db }
    }
}

fn insert(record: &RatingRecord) -> sqlx::query::Query<'_, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
    sqlx::query(INSERT_RATING)
        .bind(&record.ticker)
        .bind(&record.target_from)
        .bind(&record.target_to)
        .bind(&record.company)
        .bind(&record.action)
        .bind(&record.brokerage)
        .bind(&record.rating_from)
        .bind(&record.rating_to)
        .bind(record.time)
}

#[async_trait]
impl RatingStore for SqliteRatingStore {
    async fn create(&self, record: &RatingRecord) -> RatingsResult<i64> {
        let result = insert(record)
            .execute(self.db.pool())
            .await
            .map_err(persistence("insert rating"))?;

        Ok(result.last_insert_rowid())
    }

    async fn create_batch(&self, records: &[RatingRecord]) -> RatingsResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(persistence("begin rating batch"))?;

        for record in records {
            insert(record)
                .execute(&mut *tx)
                .await
                .map_err(persistence("insert rating batch"))?;
        }

        tx.commit().await.map_err(persistence("commit rating batch"))?;
        tracing::debug!("Committed batch of {} ratings", records.len());
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> RatingsResult<Option<RatingRecord>> {
        let row = sqlx::query_as::<_, RatingRow>(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(persistence("get rating by id"))?;

        Ok(row.map(RatingRecord::from))
    }

    async fn get_by_ticker(&self, ticker: &str) -> RatingsResult<Vec<RatingRecord>> {
        let rows = sqlx::query_as::<_, RatingRow>(&format!(
            "{} WHERE ticker = ? ORDER BY id ASC",
            SELECT_COLUMNS
        ))
        .bind(ticker)
        .fetch_all(self.db.pool())
        .await
        .map_err(persistence("get ratings by ticker"))?;

        Ok(rows.into_iter().map(RatingRecord::from).collect())
    }

    async fn get_latest_by_ticker(&self, ticker: &str) -> RatingsResult<Option<RatingRecord>> {
        let row = sqlx::query_as::<_, RatingRow>(&format!(
            "{} WHERE ticker = ? ORDER BY time DESC, id DESC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(ticker)
        .fetch_optional(self.db.pool())
        .await
        .map_err(persistence("get latest rating by ticker"))?;

        Ok(row.map(RatingRecord::from))
    }

    async fn get_page(&self, offset: i64, limit: i64) -> RatingsResult<Vec<RatingRecord>> {
        let rows = sqlx::query_as::<_, RatingRow>(&format!(
            "{} ORDER BY id ASC LIMIT ? OFFSET ?",
            SELECT_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.db.pool())
        .await
        .map_err(persistence("get ratings page"))?;

        Ok(rows.into_iter().map(RatingRecord::from).collect())
    }

    async fn count(&self) -> RatingsResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stock_ratings")
            .fetch_one(self.db.pool())
            .await
            .map_err(persistence("count ratings"))?;

        Ok(count)
    }
}
