//! State management module.
//!
//! Contains the bot's in-memory stores. Each store is an explicit cache in
//! front of the persistence layer with a small, documented consistency
//! contract; all of them are owned and mutated only by the session loop.
//! Read-only observers (the inspection API) get immutable snapshots over a
//! watch channel instead of touching store state.

mod commands;
mod quotes;
mod timers;

pub use commands::{CommandRecord, CommandStore};
pub use quotes::{QuoteRecord, QuoteStore};
pub use timers::{TimerRecord, TimerStore};

use crate::db::{Database, DbError};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::watch;

/// Immutable copy of the in-memory stores, published for the inspection API.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StateSnapshot {
    /// Custom commands keyed by name.
    pub commands: BTreeMap<String, CommandRecord>,
    /// Quotes keyed by storage-assigned id.
    pub quotes: BTreeMap<i64, QuoteRecord>,
    /// Timers keyed by name.
    pub timers: BTreeMap<String, TimerRecord>,
}

/// All mutable bot state: the three keyed stores plus the one-shot
/// link-posting exemption set.
pub struct BotState {
    /// Custom command store.
    pub commands: CommandStore,
    /// Quote store.
    pub quotes: QuoteStore,
    /// Timer store.
    pub timers: TimerStore,
    /// Senders granted a one-time exemption from link purging.
    pub permitted_posters: HashSet<String>,
    snapshot_tx: watch::Sender<StateSnapshot>,
}

impl BotState {
    /// Load every store from the database.
    ///
    /// Returns the state plus the snapshot receiver handed to read-only
    /// observers.
    pub async fn load(db: &Database) -> Result<(Self, watch::Receiver<StateSnapshot>), DbError> {
        let commands = CommandStore::load(db.clone()).await?;
        let quotes = QuoteStore::load(db.clone()).await?;
        let timers = TimerStore::load(db.clone()).await?;

        let state = Self {
            commands,
            quotes,
            timers,
            permitted_posters: HashSet::new(),
            snapshot_tx: watch::channel(StateSnapshot::default()).0,
        };
        let rx = state.snapshot_tx.subscribe();
        state.publish();
        Ok((state, rx))
    }

    /// Build a snapshot of the current store contents.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            commands: self
                .commands
                .iter()
                .map(|(name, record)| (name.clone(), record.clone()))
                .collect(),
            quotes: self
                .quotes
                .iter()
                .map(|(id, record)| (*id, record.clone()))
                .collect(),
            timers: self
                .timers
                .iter()
                .map(|(name, record)| (name.clone(), record.clone()))
                .collect(),
        }
    }

    /// Publish the current snapshot to observers.
    pub fn publish(&self) {
        // Receivers may all be gone (API disabled); that is fine.
        let _ = self.snapshot_tx.send(self.snapshot());
    }
}
