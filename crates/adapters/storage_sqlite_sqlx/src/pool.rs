//! Accessory cache database: pool setup, pragmas and migrations.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};

use crate::accessory_repo::SqliteAccessoryRepository;
use crate::error::StorageError;

/// Writers wait this long for a lock held by another connection.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the accessory cache lives.
pub struct Config {
    /// `SQLite` connection URL (e.g. `sqlite:hcbridge.db` or `sqlite::memory:`).
    pub database_url: String,
}

impl Config {
    /// Open the cache database, creating the file if missing, and bring its
    /// schema up to date.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the URL is invalid, the connection fails
    /// or a migration fails.
    pub async fn build(self) -> Result<Database, StorageError> {
        let options = SqliteConnectOptions::from_str(&self.database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePool::connect_with(options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        let cached: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accessories")
            .fetch_one(&pool)
            .await?;
        tracing::info!(database_url = %self.database_url, cached, "accessory cache ready");
        Ok(Database { pool })
    }
}

/// An open accessory cache.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Borrow the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The accessory store backed by this database, serving as both the
    /// host registration store and the startup cache.
    #[must_use]
    pub fn accessories(&self) -> SqliteAccessoryRepository {
        SqliteAccessoryRepository::new(self.pool.clone())
    }
}
