//! Database module for persistent storage.
//!
//! Provides async SQLite database access using SQLx for:
//! - Custom commands, quotes and timers (loaded in bulk at startup)
//! - Bad-word rules for the moderation filter
//! - The append-only ban history audit table

mod commands;
mod moderation;
mod quotes;
mod timers;

pub use commands::{CommandRepository, CommandRow};
pub use moderation::{BadWordRow, BanHistoryRow, ModerationRepository};
pub use quotes::{QuoteRepository, QuoteRow};
pub use timers::{TimerRepository, TimerRow};

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Database errors.
///
/// Anything other than [`DbError::Duplicate`] means the persistence layer is
/// unusable; callers treat those as fatal since continuing would let memory
/// silently diverge from storage.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),
    #[error("migration error: {0}")]
    Migration(sqlx::migrate::MigrateError),
    #[error("the item '{0}' already exists")]
    Duplicate(String),
}

impl DbError {
    /// Translate a unique-constraint violation on `key` into
    /// [`DbError::Duplicate`]; pass everything else through.
    fn from_insert(err: sqlx::Error, key: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return DbError::Duplicate(key.to_string());
            }
        }
        DbError::Sqlx(err)
    }
}

/// Database handle with connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connection acquire timeout - prevents a wedged pool from blocking forever.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Create a new database connection, running migrations if needed.
    pub async fn new(path: &str) -> Result<Self, DbError> {
        let pool = if path == ":memory:" {
            // Uniquely named shared-cache memory database per call;
            // `file::memory:` is global-ish and collides across parallel tests.
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let memdb_uri = format!(
                "file:chatwarden-memdb-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );

            let options = SqliteConnectOptions::new()
                .filename(&memdb_uri)
                .shared_cache(true)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .connect_with(options)
                .await?
        } else {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = std::fs::create_dir_all(parent) {
                        tracing::warn!(path = %parent.display(), error = %e, "Failed to create database directory");
                    }
                }
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .connect_with(options)
                .await?
        };

        info!(path = %path, "Database connected");

        Self::run_migrations(&pool).await?;

        // WAL lets the inspection API read while the main loop writes.
        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
        sqlx::query("PRAGMA synchronous=NORMAL")
            .execute(&pool)
            .await?;

        Ok(Self { pool })
    }

    /// Run embedded migrations.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(DbError::Migration)?;

        info!("Database migrations checked/applied");
        Ok(())
    }

    /// Get command repository.
    pub fn commands(&self) -> CommandRepository<'_> {
        CommandRepository::new(&self.pool)
    }

    /// Get quote repository.
    pub fn quotes(&self) -> QuoteRepository<'_> {
        QuoteRepository::new(&self.pool)
    }

    /// Get timer repository.
    pub fn timers(&self) -> TimerRepository<'_> {
        TimerRepository::new(&self.pool)
    }

    /// Get moderation repository (bad words and ban history).
    pub fn moderation(&self) -> ModerationRepository<'_> {
        ModerationRepository::new(&self.pool)
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        DbError::Sqlx(err)
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(err)
    }
}
