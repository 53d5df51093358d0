//! Sender identity and the ordinal permission rank.

use crate::error::InvalidPermission;

/// Privilege rank of a message sender, ordered from least to most powerful.
///
/// Ranks 0-2 are derived from message tags; [`Rank::Broadcaster`] is reserved
/// for the channel owner and assigned by configuration, never by tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    /// Ordinary viewer (ordinal 0). Permission name `all`.
    #[default]
    Viewer = 0,
    /// Channel subscriber (ordinal 1).
    Subscriber = 1,
    /// Channel moderator (ordinal 2).
    Moderator = 2,
    /// The channel owner (ordinal 3).
    Broadcaster = 3,
}

impl Rank {
    /// Map a persisted permission name to its rank.
    ///
    /// The vocabulary is wire-visible: `all`, `subscriber`, `moderator`,
    /// `broadcaster`. Matching is case-insensitive; anything else is an
    /// [`InvalidPermission`] error.
    pub fn from_permission_name(name: &str) -> Result<Self, InvalidPermission> {
        match name.to_ascii_lowercase().as_str() {
            "all" => Ok(Rank::Viewer),
            "subscriber" => Ok(Rank::Subscriber),
            "moderator" => Ok(Rank::Moderator),
            "broadcaster" => Ok(Rank::Broadcaster),
            _ => Err(InvalidPermission(name.to_string())),
        }
    }

    /// The persisted name for this rank.
    pub fn permission_name(self) -> &'static str {
        match self {
            Rank::Viewer => "all",
            Rank::Subscriber => "subscriber",
            Rank::Moderator => "moderator",
            Rank::Broadcaster => "broadcaster",
        }
    }

    /// The ordinal value (0-3) used for gate comparisons.
    pub fn ordinal(self) -> u8 {
        self as u8
    }
}

/// The sender of one chat line: handle plus privilege rank.
///
/// The name is case-normalized (lowercased) at parse time so store lookups
/// and the permitted-poster set never depend on display casing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sender {
    /// Lowercased chat handle.
    pub name: String,
    /// Privilege rank derived from tags and owner configuration.
    pub rank: Rank,
}

impl Sender {
    /// Build a sender with an already-normalized name.
    pub fn new(name: impl Into<String>, rank: Rank) -> Self {
        Self {
            name: name.into(),
            rank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_names_round_trip() {
        for rank in [
            Rank::Viewer,
            Rank::Subscriber,
            Rank::Moderator,
            Rank::Broadcaster,
        ] {
            assert_eq!(
                Rank::from_permission_name(rank.permission_name()).unwrap(),
                rank
            );
        }
    }

    #[test]
    fn permission_name_is_case_insensitive() {
        assert_eq!(
            Rank::from_permission_name("Moderator").unwrap(),
            Rank::Moderator
        );
        assert_eq!(Rank::from_permission_name("ALL").unwrap(), Rank::Viewer);
    }

    #[test]
    fn unknown_permission_name_is_rejected() {
        let err = Rank::from_permission_name("admin").unwrap_err();
        assert_eq!(err.0, "admin");
    }

    #[test]
    fn ranks_are_ordered_by_privilege() {
        assert!(Rank::Viewer < Rank::Subscriber);
        assert!(Rank::Subscriber < Rank::Moderator);
        assert!(Rank::Moderator < Rank::Broadcaster);
        assert_eq!(Rank::Broadcaster.ordinal(), 3);
    }
}
