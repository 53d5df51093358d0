//! # warden-proto
//!
//! Parsing and encoding for the tag-prefixed IRC-style chat lines consumed
//! by chatwarden.
//!
//! The central type is [`Item`]: the parsed intent of one chat line. A raw
//! line is either server/protocol control information, a plain chat message,
//! or a command invocation (`!`-prefixed), and [`parse_line`] classifies it
//! using the channel context supplied by the caller.
//!
//! ## Quick Start
//!
//! ```rust
//! use warden_proto::{parse_line, ChannelContext};
//!
//! let ctx = ChannelContext::new("limeph", "limeph");
//! let raw = "@display-name=Viewer;mod=0;subscriber=1 :v!v@v.example PRIVMSG #limeph :!quote";
//! let item = parse_line(raw, &ctx).unwrap();
//! assert_eq!(item.item_type, "!quote");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod encode;
pub mod error;
pub mod item;
pub mod rank;
pub mod tags;

pub use self::error::{InvalidPermission, ParseError};
pub use self::item::{is_keepalive, parse_line, payload, ChannelContext, Item, COMMAND_MARKER};
pub use self::rank::{Rank, Sender};
pub use self::tags::{parse_tags, tag_value, unescape_tag_value, Tag};
