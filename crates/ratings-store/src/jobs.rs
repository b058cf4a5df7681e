use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ratings_core::{Job, JobStatus, JobStore, RatingsError, RatingsResult};
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::{persistence, RatingsDb};

#[derive(Debug, FromRow)]
struct JobRow {
    id: String,
    status: String,
    job_type: String,
    progress: i64,
    total_items: i64,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<JobRow> for Job {
    type Error = RatingsError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| RatingsError::Persistence(format!("corrupt job id '{}': {}", row.id, e)))?;

        Ok(Job {
            id,
            status: row.status.parse()?,
            job_type: row.job_type,
            progress: row.progress,
            total_items: row.total_items,
            error_message: row.error_message,
            created_at: row.created_at,
            updated_at: row.updated_at,
            completed_at: row.completed_at,
        })
    }
}

/// SQLite-backed job storage. Every update is a plain overwrite.
#[derive(Clone)]
pub struct SqliteJobStore {
    db: RatingsDb,
}

impl SqliteJobStore {
    pub fn new(db: RatingsDb) -> Self {
        Self { db }
    }
}

fn ensure_found(rows_affected: u64, id: Uuid) -> RatingsResult<()> {
    if rows_affected == 0 {
        return Err(RatingsError::NotFound(format!("job {}", id)));
    }
    Ok(())
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn create(&self, job: &Job) -> RatingsResult<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, status, job_type, progress, total_items, error_message, created_at, updated_at, completed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(job.id.to_string())
        .bind(job.status.as_str())
        .bind(&job.job_type)
        .bind(job.progress)
        .bind(job.total_items)
        .bind(&job.error_message)
        .bind(job.created_at)
        .bind(job.updated_at)
        .bind(job.completed_at)
        .execute(self.db.pool())
        .await
        .map_err(persistence("create job"))?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> RatingsResult<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, status, job_type, progress, total_items, error_message, created_at, updated_at, completed_at
            FROM jobs
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.db.pool())
        .await
        .map_err(persistence("get job"))?;

        row.map(Job::try_from).transpose()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: JobStatus,
        progress: i64,
        total_items: i64,
    ) -> RatingsResult<()> {
        let result = sqlx::query(
            "UPDATE jobs SET status = ?, progress = ?, total_items = ?, updated_at = ? WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(progress)
        .bind(total_items)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(self.db.pool())
        .await
        .map_err(persistence("update job status"))?;

        ensure_found(result.rows_affected(), id)
    }

    async fn mark_completed(&self, id: Uuid) -> RatingsResult<()> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE jobs SET status = ?, completed_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(JobStatus::Completed.as_str())
        .bind(now)
        .bind(now)
        .bind(id.to_string())
        .execute(self.db.pool())
        .await
        .map_err(persistence("mark job completed"))?;

        ensure_found(result.rows_affected(), id)
    }

    async fn mark_failed(&self, id: Uuid, message: &str) -> RatingsResult<()> {
        let result = sqlx::query(
            "UPDATE jobs SET status = ?, error_message = ?, updated_at = ? WHERE id = ?",
        )
        .bind(JobStatus::Failed.as_str())
        .bind(message)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(self.db.pool())
        .await
        .map_err(persistence("mark job failed"))?;

        ensure_found(result.rows_affected(), id)
    }
}
