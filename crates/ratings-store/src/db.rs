use ratings_core::{RatingsError, RatingsResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

#[derive(Clone)]
pub struct RatingsDb {
    pool: SqlitePool,
}

impl RatingsDb {
    /// Connect and apply the schema.
    pub async fn new(database_url: &str) -> RatingsResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(persistence("parse database url"))?
            .create_if_missing(true);

        // Every in-memory connection is its own database, so keep exactly one alive.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(persistence("connect to database"))?;

        let db = Self { pool };
        db.init_schema().await?;

        Ok(db)
    }

    async fn init_schema(&self) -> RatingsResult<()> {
        let schema = include_str!("../schema.sql");

        // sqlx executes one statement per query
        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt)
                    .execute(&self.pool)
                    .await
                    .map_err(persistence("apply schema"))?;
            }
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Wrap a sqlx failure with the operation that produced it.
pub(crate) fn persistence(operation: &'static str) -> impl Fn(sqlx::Error) -> RatingsError {
    move |e| RatingsError::Persistence(format!("failed to {}: {}", operation, e))
}
