//! Timer repository for database queries.

use super::DbError;
use sqlx::SqlitePool;

/// One persisted recurring timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerRow {
    /// Timer name including the leading `!`.
    pub name: String,
    /// Message sent to chat on every tick.
    pub message: String,
    /// Tick interval in minutes.
    pub minutes: i64,
    /// Whether the timer's schedule should be started.
    pub enabled: bool,
}

/// Repository for the `timers` table.
pub struct TimerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TimerRepository<'a> {
    /// Create a new timer repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Load every timer.
    pub async fn load_all(&self) -> Result<Vec<TimerRow>, DbError> {
        let rows = sqlx::query_as::<_, (String, String, i64, bool)>(
            "SELECT timername, message, minutes, enabled FROM timers",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, message, minutes, enabled)| TimerRow {
                name,
                message,
                minutes,
                enabled,
            })
            .collect())
    }

    /// Insert a new timer. Duplicate names surface as [`DbError::Duplicate`].
    pub async fn insert(
        &self,
        name: &str,
        message: &str,
        minutes: i64,
        enabled: bool,
    ) -> Result<(), DbError> {
        sqlx::query("INSERT INTO timers (timername, message, minutes, enabled) VALUES (?, ?, ?, ?)")
            .bind(name)
            .bind(message)
            .bind(minutes)
            .bind(enabled)
            .execute(self.pool)
            .await
            .map_err(|e| DbError::from_insert(e, name))?;
        Ok(())
    }

    /// Delete a timer by name.
    pub async fn delete(&self, name: &str) -> Result<(), DbError> {
        sqlx::query("DELETE FROM timers WHERE timername = ?")
            .bind(name)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
