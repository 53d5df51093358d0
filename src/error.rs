//! Unified error handling for chatwarden.
//!
//! This module provides the error hierarchy for the dispatch pipeline and
//! the stores behind it, with chat reply generation and code labeling for
//! structured logs.

use crate::db::DbError;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur while handling a dispatched item.
///
/// Everything except [`HandlerError::Storage`] and [`HandlerError::Send`] is
/// non-fatal: the pipeline renders it as a chat-visible reply and the session
/// keeps processing lines.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("the item '{0}' already exists")]
    DuplicateKey(String),

    #[error("could not find '{0}'")]
    NotFound(String),

    #[error("'{0}' is not a valid permission")]
    InvalidPermission(String),

    #[error("'{0}' is not a valid interval, it must be a positive number of minutes")]
    InvalidInterval(String),

    #[error("the id must be a valid integer greater than 0, got {0}")]
    InvalidIndex(i64),

    #[error("the requested id {id} is greater than the total number of quotes, which is: {count}")]
    IndexOutOfRange {
        /// The id that was asked for.
        id: i64,
        /// How many quotes currently exist.
        count: usize,
    },

    #[error("no quotes were found")]
    EmptyStore,

    /// Persistence layer unreachable or broken. Fatal: continuing would let
    /// the in-memory stores silently diverge from storage.
    #[error("storage unavailable: {0}")]
    Storage(#[from] DbError),

    /// Outbound channel closed; the connection is gone.
    #[error("send error: {0}")]
    Send(#[from] mpsc::error::SendError<String>),
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateKey(_) => "duplicate_key",
            Self::NotFound(_) => "not_found",
            Self::InvalidPermission(_) => "invalid_permission",
            Self::InvalidInterval(_) => "invalid_interval",
            Self::InvalidIndex(_) => "invalid_index",
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::EmptyStore => "empty_store",
            Self::Storage(_) => "storage_unavailable",
            Self::Send(_) => "send_error",
        }
    }

    /// Whether this error must terminate the session instead of becoming a
    /// chat reply.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Send(_))
    }

    /// Convert to a chat-visible reply.
    ///
    /// Returns `None` for fatal errors, which propagate to the session loop
    /// instead of being shown in the channel.
    pub fn to_chat_reply(&self) -> Option<String> {
        if self.is_fatal() {
            return None;
        }
        Some(self.to_string())
    }
}

/// Map a store-level database error: duplicates keep their key, everything
/// else is a fatal storage failure.
pub fn duplicate_or_storage(err: DbError) -> HandlerError {
    match err {
        DbError::Duplicate(key) => HandlerError::DuplicateKey(key),
        other => HandlerError::Storage(other),
    }
}

/// Result type for action handlers: an optional chat reply, or an error.
pub type HandlerResult = Result<Option<String>, HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes() {
        assert_eq!(
            HandlerError::DuplicateKey("!greet".into()).error_code(),
            "duplicate_key"
        );
        assert_eq!(HandlerError::EmptyStore.error_code(), "empty_store");
    }

    #[test]
    fn non_fatal_errors_become_chat_replies() {
        let reply = HandlerError::IndexOutOfRange { id: 9, count: 3 }
            .to_chat_reply()
            .unwrap();
        assert!(reply.contains("9"));
        assert!(reply.contains("3"));
    }

    #[test]
    fn storage_errors_are_fatal_and_silent() {
        let err = HandlerError::Storage(DbError::Sqlx(sqlx::Error::PoolClosed));
        assert!(err.is_fatal());
        assert!(err.to_chat_reply().is_none());
    }

    #[test]
    fn duplicate_maps_to_duplicate_key() {
        let err = duplicate_or_storage(DbError::Duplicate("!greet".into()));
        assert!(matches!(err, HandlerError::DuplicateKey(k) if k == "!greet"));
    }
}
