//! Custom command store.
//!
//! Consistency contract: reads come from the in-memory map; every mutation
//! writes storage first and mirrors into memory once storage has accepted
//! it. The unique constraint on the command name is the duplicate authority.
//! Invocation counts are written through to both sides synchronously.

use crate::db::{Database, DbError};
use crate::error::{duplicate_or_storage, HandlerError};
use serde::Serialize;
use std::collections::HashMap;
use warden_proto::Rank;

/// One custom command as held in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandRecord {
    /// Response text sent to chat on invocation.
    pub response: String,
    /// Persisted permission name gating invocation.
    pub perm: String,
    /// Invocation counter, monotonically non-decreasing.
    pub count: i64,
}

/// Keyed store of custom commands backed by the `commands` table.
pub struct CommandStore {
    db: Database,
    commands: HashMap<String, CommandRecord>,
}

impl CommandStore {
    /// Load all persisted commands into memory.
    pub async fn load(db: Database) -> Result<Self, DbError> {
        let rows = db.commands().load_all().await?;
        let commands = rows
            .into_iter()
            .map(|row| {
                (
                    row.name,
                    CommandRecord {
                        response: row.response,
                        perm: row.perm,
                        count: row.count,
                    },
                )
            })
            .collect();
        Ok(Self { db, commands })
    }

    /// Add a new command with a zero invocation count.
    ///
    /// Fails with [`HandlerError::DuplicateKey`] when the key already exists
    /// in the persistence layer; the existing record is left untouched.
    pub async fn add(
        &mut self,
        key: &str,
        response: &str,
        required: Rank,
    ) -> Result<(), HandlerError> {
        self.db
            .commands()
            .insert(key, response, required.permission_name())
            .await
            .map_err(duplicate_or_storage)?;

        self.commands.insert(
            key.to_string(),
            CommandRecord {
                response: response.to_string(),
                perm: required.permission_name().to_string(),
                count: 0,
            },
        );
        Ok(())
    }

    /// Replace the response of an existing command, leaving its permission
    /// and count untouched.
    pub async fn edit(&mut self, key: &str, response: &str) -> Result<(), HandlerError> {
        if !self.commands.contains_key(key) {
            return Err(HandlerError::NotFound(key.to_string()));
        }

        self.db.commands().update_response(key, response).await?;
        if let Some(record) = self.commands.get_mut(key) {
            record.response = response.to_string();
        }
        Ok(())
    }

    /// Pure lookup, never mutates.
    pub fn find(&self, key: &str) -> Option<&CommandRecord> {
        self.commands.get(key)
    }

    /// Remove a command from memory and storage.
    ///
    /// Returns false (no-op) for an absent key. A storage failure after the
    /// key was present in memory is a fatal error, distinct from not-found.
    pub async fn remove(&mut self, key: &str) -> Result<bool, HandlerError> {
        if !self.commands.contains_key(key) {
            return Ok(false);
        }

        self.db.commands().delete(key).await?;
        self.commands.remove(key);
        Ok(true)
    }

    /// Bump the invocation counter in storage and memory.
    pub async fn increment_count(&mut self, key: &str) -> Result<(), HandlerError> {
        self.db.commands().increment_count(key).await?;
        if let Some(record) = self.commands.get_mut(key) {
            record.count += 1;
        }
        Ok(())
    }

    /// The rank required to invoke a command, mapped from its persisted
    /// permission name.
    pub fn required_rank(&self, key: &str) -> Result<Rank, HandlerError> {
        let record = self
            .commands
            .get(key)
            .ok_or_else(|| HandlerError::NotFound(key.to_string()))?;
        Rank::from_permission_name(&record.perm)
            .map_err(|e| HandlerError::InvalidPermission(e.0))
    }

    /// Iterate over all commands.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CommandRecord)> {
        self.commands.iter()
    }

    /// Number of commands loaded.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True when no commands exist.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
