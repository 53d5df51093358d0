//! Error types for line parsing and the permission vocabulary.

use thiserror::Error;

use crate::rank::Sender;

/// A chat line looked like a command invocation but did not match the
/// invocation grammar.
///
/// Non-fatal: the caller is expected to reply to the sender and keep
/// processing lines. The offending sender is carried so the reply can be
/// addressed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("command invocation failed")]
pub struct ParseError {
    /// Who sent the malformed invocation.
    pub sender: Sender,
}

/// A persisted permission name that is not part of the wire vocabulary
/// (`all`, `subscriber`, `moderator`, `broadcaster`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a valid permission name: {0}")]
pub struct InvalidPermission(pub String);
