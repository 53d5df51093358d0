//! Quote repository for database queries.

use super::DbError;
use sqlx::SqlitePool;

/// One persisted quote. The id is assigned by the database on insert and is
/// not guaranteed dense after deletions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRow {
    /// Storage-assigned positive id.
    pub id: i64,
    /// The quoted text.
    pub quote: String,
    /// Submission date, `YYYY-MM-DD`.
    pub timestamp: String,
    /// Handle of the submitting user.
    pub submitter: String,
}

/// Repository for the `quotes` table.
pub struct QuoteRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> QuoteRepository<'a> {
    /// Create a new quote repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Load every quote, keyed by storage-assigned id.
    pub async fn load_all(&self) -> Result<Vec<QuoteRow>, DbError> {
        let rows = sqlx::query_as::<_, (i64, String, String, String)>(
            "SELECT id, quote, timestamp, submitter FROM quotes",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, quote, timestamp, submitter)| QuoteRow {
                id,
                quote,
                timestamp,
                submitter,
            })
            .collect())
    }

    /// Insert a new quote; the id is assigned by the database, so callers
    /// reload the set to observe it.
    pub async fn insert(&self, quote: &str, date: &str, submitter: &str) -> Result<(), DbError> {
        sqlx::query("INSERT INTO quotes (quote, timestamp, submitter) VALUES (?, ?, ?)")
            .bind(quote)
            .bind(date)
            .bind(submitter)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Delete a quote by id.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        sqlx::query("DELETE FROM quotes WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
