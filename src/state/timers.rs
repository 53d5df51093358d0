//! Timer store.
//!
//! Consistency contract: the in-memory map mirrors the `timers` table; adds
//! check the map for duplicates and persist before inserting. The enabled
//! flag is only consulted when schedules start (see the timer engine), so
//! store mutations after startup affect future sessions, not running
//! schedules.

use crate::db::{Database, DbError};
use crate::error::{duplicate_or_storage, HandlerError};
use serde::Serialize;
use std::collections::HashMap;

/// One recurring timer as held in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerRecord {
    /// Message sent to chat on every tick.
    pub message: String,
    /// Tick interval in minutes.
    pub minutes: u64,
    /// Whether the schedule should be started.
    pub enabled: bool,
}

/// Keyed store of recurring timers backed by the `timers` table.
pub struct TimerStore {
    db: Database,
    timers: HashMap<String, TimerRecord>,
}

impl TimerStore {
    /// Load all persisted timers into memory.
    pub async fn load(db: Database) -> Result<Self, DbError> {
        let rows = db.timers().load_all().await?;
        let timers = rows
            .into_iter()
            .map(|row| {
                (
                    row.name,
                    TimerRecord {
                        message: row.message,
                        minutes: row.minutes.max(0) as u64,
                        enabled: row.enabled,
                    },
                )
            })
            .collect();
        Ok(Self { db, timers })
    }

    /// Add a new timer, enabled by default.
    ///
    /// `interval_token` must parse as a positive integer number of minutes,
    /// otherwise the add fails with [`HandlerError::InvalidInterval`] and no
    /// record is created.
    pub async fn add(
        &mut self,
        name: &str,
        interval_token: &str,
        message: &str,
    ) -> Result<(), HandlerError> {
        if self.timers.contains_key(name) {
            return Err(HandlerError::DuplicateKey(name.to_string()));
        }

        let minutes: u64 = interval_token
            .parse()
            .ok()
            .filter(|m| *m > 0)
            .ok_or_else(|| HandlerError::InvalidInterval(interval_token.to_string()))?;

        self.db
            .timers()
            .insert(name, message, minutes as i64, true)
            .await
            .map_err(duplicate_or_storage)?;

        self.timers.insert(
            name.to_string(),
            TimerRecord {
                message: message.to_string(),
                minutes,
                enabled: true,
            },
        );
        Ok(())
    }

    /// Delete a timer from memory and storage.
    pub async fn delete(&mut self, name: &str) -> Result<(), HandlerError> {
        if !self.timers.contains_key(name) {
            return Err(HandlerError::NotFound(name.to_string()));
        }

        self.db.timers().delete(name).await?;
        self.timers.remove(name);
        Ok(())
    }

    /// Iterate over all timers.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TimerRecord)> {
        self.timers.iter()
    }

    /// Number of timers loaded.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// True when no timers exist.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
