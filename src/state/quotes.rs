//! Quote store.
//!
//! Consistency contract: ids are assigned by the database, so `add` persists
//! first and then reloads the full set to observe the new id. Ids are not
//! dense after deletions; the count-based random/get draws keep that skew
//! rather than silently re-drawing, and a drawn id vacated by a deletion
//! reports not-found.

use crate::db::{Database, DbError};
use crate::error::HandlerError;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;

/// One quote as held in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteRecord {
    /// The quoted text.
    pub text: String,
    /// Submission date, `YYYY-MM-DD`.
    pub submitted_at: String,
    /// Handle of the submitting user.
    pub submitter: String,
}

/// Keyed store of quotes backed by the `quotes` table.
pub struct QuoteStore {
    db: Database,
    quotes: HashMap<i64, QuoteRecord>,
}

impl QuoteStore {
    /// Load all persisted quotes into memory.
    pub async fn load(db: Database) -> Result<Self, DbError> {
        let mut store = Self {
            db,
            quotes: HashMap::new(),
        };
        store.reload().await?;
        Ok(store)
    }

    /// Re-read the full quote set from storage.
    async fn reload(&mut self) -> Result<(), DbError> {
        let rows = self.db.quotes().load_all().await?;
        self.quotes = rows
            .into_iter()
            .map(|row| {
                (
                    row.id,
                    QuoteRecord {
                        text: row.quote,
                        submitted_at: row.timestamp,
                        submitter: row.submitter,
                    },
                )
            })
            .collect();
        Ok(())
    }

    /// Persist a new quote stamped with the current date, then reload the
    /// set to pick up the storage-assigned id.
    pub async fn add(&mut self, text: &str, submitter: &str) -> Result<(), HandlerError> {
        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        self.db.quotes().insert(text, &date, submitter).await?;
        self.reload().await?;
        Ok(())
    }

    /// Render one quote as `"<text> -- <date> [submitted by <submitter>]"`.
    fn render(&self, id: i64) -> Option<String> {
        self.quotes.get(&id).map(|q| {
            format!(
                "{} -- {} [submitted by {}]",
                q.text, q.submitted_at, q.submitter
            )
        })
    }

    /// Pick a random quote.
    ///
    /// Draws uniformly over `1..=count`. Over a sparse id space this is an
    /// approximation, not a uniform draw over surviving quotes; a vacated id
    /// reports not-found instead of re-drawing.
    pub fn random(&self) -> Result<String, HandlerError> {
        if self.quotes.is_empty() {
            return Err(HandlerError::EmptyStore);
        }
        let id = rand::thread_rng().gen_range(1..=self.quotes.len() as i64);
        self.render(id)
            .ok_or_else(|| HandlerError::NotFound(format!("quote {id}")))
    }

    /// Fetch one quote by id.
    pub fn get(&self, id: i64) -> Result<String, HandlerError> {
        if id <= 0 {
            return Err(HandlerError::InvalidIndex(id));
        }
        if id > self.quotes.len() as i64 {
            return Err(HandlerError::IndexOutOfRange {
                id,
                count: self.quotes.len(),
            });
        }
        self.render(id)
            .ok_or_else(|| HandlerError::NotFound(format!("quote {id}")))
    }

    /// Delete a quote from memory (if present) and storage.
    pub async fn delete(&mut self, id: i64) -> Result<(), HandlerError> {
        self.quotes.remove(&id);
        self.db.quotes().delete(id).await?;
        Ok(())
    }

    /// Iterate over all quotes.
    pub fn iter(&self) -> impl Iterator<Item = (&i64, &QuoteRecord)> {
        self.quotes.iter()
    }

    /// Number of quotes loaded.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// True when no quotes exist.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}
