//! Raw line to [`Item`] parsing.
//!
//! An `Item` is the parsed intent of one chat line. Lines without the
//! channel's chat-payload marker are server/protocol control information;
//! everything else is either plain chat or a `!`-prefixed command
//! invocation tokenized by the grammar in [`parse_line`].

use crate::error::ParseError;
use crate::rank::{Rank, Sender};
use crate::tags::{parse_tags, tag_value};

/// Leading character that marks an invocation token.
pub const COMMAND_MARKER: char = '!';

/// Channel context needed to locate the chat payload within a raw line and
/// to recognize the channel owner.
#[derive(Debug, Clone)]
pub struct ChannelContext {
    channel: String,
    owner_lower: String,
    marker: String,
}

impl ChannelContext {
    /// Build a context for one channel. `owner` is the channel owner's
    /// handle; senders matching it are ranked [`Rank::Broadcaster`].
    pub fn new(channel: &str, owner: &str) -> Self {
        let channel = channel.trim_start_matches('#').to_string();
        Self {
            marker: format!("PRIVMSG #{channel} :"),
            owner_lower: owner.to_lowercase(),
            channel,
        }
    }

    /// The channel name without the `#` sigil.
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

/// Parsed representation of one chat line.
///
/// Field meaning follows the invocation grammar: for
/// `!com add !greet hello there`, `item_type` is `!com`, `command` is
/// `add`, `key` is `!greet` and `contents` is `hello there`. Absent parts
/// are empty strings, mirroring the wire where absence is the empty token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    /// True when the line carried no chat payload; `contents` then holds
    /// the raw line and every other field is empty.
    pub is_server_info: bool,
    /// Leading `!`-token of an invocation, e.g. `!quote`.
    pub item_type: String,
    /// Free-word subcommand, e.g. `add`.
    pub command: String,
    /// `!`-prefixed key operand, e.g. `!greet`.
    pub key: String,
    /// Remaining free text, or the whole message for plain chat.
    pub contents: String,
    /// Who sent the line (empty for server info).
    pub sender: Sender,
}

impl Item {
    /// Wrap a server/protocol control line.
    pub fn server_info(raw: &str) -> Self {
        Self {
            is_server_info: true,
            contents: raw.to_string(),
            ..Self::default()
        }
    }

    /// True when the item is a `!`-prefixed invocation.
    pub fn is_invocation(&self) -> bool {
        !self.item_type.is_empty()
    }
}

/// True when a raw line is a server keepalive probe that must be answered.
pub fn is_keepalive(raw: &str) -> bool {
    raw.starts_with("PING")
}

/// Extract the trimmed chat payload from a raw line, if it carries one.
///
/// The moderation filter uses this to screen the full message text
/// independently of how (or whether) the line parsed into an invocation.
pub fn payload<'a>(raw: &'a str, ctx: &ChannelContext) -> Option<&'a str> {
    raw.find(ctx.marker.as_str())
        .map(|at| raw[at + ctx.marker.len()..].trim())
}

/// Parse one trimmed raw protocol line into an [`Item`].
///
/// Grammar for `!`-prefixed payloads, tokens `T0..Tn` split on whitespace
/// (`T0` always becomes `item_type`):
///
/// - single token: bare invocation.
/// - `T2` present and `!`-prefixed: `command = T1`, `key = T2`, the rest
///   joins into `contents`.
/// - `T1` present and not `!`-prefixed: `command = T1`, the rest joins
///   into `contents`. A two-token payload therefore parses as
///   `command = T1` with empty contents.
/// - anything else fails with [`ParseError`] carrying the sender.
pub fn parse_line(raw: &str, ctx: &ChannelContext) -> Result<Item, ParseError> {
    let Some(payload) = payload(raw, ctx) else {
        return Ok(Item::server_info(raw));
    };

    let sender = parse_sender(raw, &ctx.owner_lower);

    if !payload.starts_with(COMMAND_MARKER) {
        return Ok(Item {
            contents: payload.to_string(),
            sender,
            ..Item::default()
        });
    }

    let tokens: Vec<&str> = payload.split_whitespace().collect();
    let mut item = Item {
        item_type: tokens[0].to_string(),
        sender,
        ..Item::default()
    };

    if tokens.len() == 1 {
        return Ok(item);
    }

    if tokens.len() >= 3 && tokens[2].starts_with(COMMAND_MARKER) {
        item.command = tokens[1].to_string();
        item.key = tokens[2].to_string();
        item.contents = tokens[3..].join(" ");
        return Ok(item);
    }

    if !tokens[1].starts_with(COMMAND_MARKER) {
        item.command = tokens[1].to_string();
        item.contents = tokens[2..].join(" ");
        return Ok(item);
    }

    Err(ParseError { sender: item.sender })
}

/// Extract the sender from the tag block, if any.
///
/// Rank 1 when the subscriber tag is set, rank 2 when the moderator tag is
/// set (moderator dominates), rank 3 when the name matches the configured
/// channel owner. Names are lowercased.
fn parse_sender(raw: &str, owner_lower: &str) -> Sender {
    let Some(tags_str) = raw
        .strip_prefix('@')
        .and_then(|rest| rest.split(' ').next())
    else {
        return Sender::default();
    };

    let tags = parse_tags(tags_str);
    let name = tag_value(&tags, "display-name")
        .unwrap_or_default()
        .to_lowercase();

    let rank = if !owner_lower.is_empty() && name == owner_lower {
        Rank::Broadcaster
    } else if tag_value(&tags, "mod") == Some("1") {
        Rank::Moderator
    } else if tag_value(&tags, "subscriber") == Some("1") {
        Rank::Subscriber
    } else {
        Rank::Viewer
    };

    Sender { name, rank }
}
