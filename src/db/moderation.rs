//! Moderation repository: bad-word rules and the ban history audit table.

use super::DbError;
use sqlx::SqlitePool;

/// One bad-word rule. Rules are evaluated in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadWordRow {
    /// Substring that triggers the rule.
    pub phrase: String,
    /// 0 purges the sender, 1 bans them.
    pub severity: i64,
}

/// One row of the append-only ban audit log.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BanHistoryRow {
    /// Banned user's handle.
    pub user: String,
    /// Why the ban was issued.
    pub reason: String,
    /// When the ban was recorded, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
}

/// Repository for the `badwords` and `ban_history` tables.
pub struct ModerationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ModerationRepository<'a> {
    /// Create a new moderation repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Load bad-word rules in declaration order.
    pub async fn load_bad_words(&self) -> Result<Vec<BadWordRow>, DbError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT phrase, severity FROM badwords ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(phrase, severity)| BadWordRow { phrase, severity })
            .collect())
    }

    /// Append a ban to the audit log. Rows are never mutated or deleted.
    pub async fn record_ban(
        &self,
        user: &str,
        reason: &str,
        timestamp: &str,
    ) -> Result<(), DbError> {
        sqlx::query("INSERT INTO ban_history (user, reason, timestamp) VALUES (?, ?, ?)")
            .bind(user)
            .bind(reason)
            .bind(timestamp)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Read the full ban history, newest first.
    pub async fn ban_history(&self) -> Result<Vec<BanHistoryRow>, DbError> {
        let rows = sqlx::query_as::<_, (String, String, String)>(
            "SELECT user, reason, timestamp FROM ban_history ORDER BY timestamp DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(user, reason, timestamp)| BanHistoryRow {
                user,
                reason,
                timestamp,
            })
            .collect())
    }
}
