//! Command repository for database queries.

use super::DbError;
use sqlx::SqlitePool;

/// One persisted custom command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRow {
    /// Command name including the leading `!`.
    pub name: String,
    /// Response text sent to chat on invocation.
    pub response: String,
    /// Persisted permission name (`all`, `subscriber`, ...).
    pub perm: String,
    /// Invocation counter.
    pub count: i64,
}

/// Repository for the `commands` table.
pub struct CommandRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CommandRepository<'a> {
    /// Create a new command repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Load every command, used to populate the in-memory store at startup.
    pub async fn load_all(&self) -> Result<Vec<CommandRow>, DbError> {
        let rows = sqlx::query_as::<_, (String, String, String, i64)>(
            "SELECT commandname, commandresponse, perm, count FROM commands",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, response, perm, count)| CommandRow {
                name,
                response,
                perm,
                count,
            })
            .collect())
    }

    /// Insert a new command with a zero invocation count.
    ///
    /// A unique-constraint violation on the name surfaces as
    /// [`DbError::Duplicate`].
    pub async fn insert(&self, name: &str, response: &str, perm: &str) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO commands (commandname, commandresponse, perm, count) VALUES (?, ?, ?, 0)",
        )
        .bind(name)
        .bind(response)
        .bind(perm)
        .execute(self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, name))?;
        Ok(())
    }

    /// Replace the response text of an existing command.
    pub async fn update_response(&self, name: &str, response: &str) -> Result<(), DbError> {
        sqlx::query("UPDATE commands SET commandresponse = ? WHERE commandname = ?")
            .bind(response)
            .bind(name)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Delete a command. Returns true when a row was removed.
    pub async fn delete(&self, name: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM commands WHERE commandname = ?")
            .bind(name)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Bump the persisted invocation counter.
    pub async fn increment_count(&self, name: &str) -> Result<(), DbError> {
        sqlx::query("UPDATE commands SET count = count + 1 WHERE commandname = ?")
            .bind(name)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
