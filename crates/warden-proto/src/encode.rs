//! Outbound line construction.
//!
//! Everything the bot writes to the wire is newline-delimited text built
//! here: the login burst, the keepalive answer, channel messages and the
//! moderation slash-commands carried inside channel messages.

/// Build a channel chat message.
pub fn privmsg(channel: &str, text: &str) -> String {
    format!("PRIVMSG #{channel} :{text}")
}

/// Answer a server keepalive probe.
pub fn pong(server: &str) -> String {
    format!("PONG :{server}")
}

/// Authenticate with the chat server. The token is sent with its `oauth:`
/// scheme prefix, added if missing.
pub fn pass(token: &str) -> String {
    if token.starts_with("oauth:") {
        format!("PASS {token}")
    } else {
        format!("PASS oauth:{token}")
    }
}

/// Announce the bot's login name.
pub fn nick(name: &str) -> String {
    format!("NICK {name}")
}

/// Join the moderated channel.
pub fn join(channel: &str) -> String {
    format!("JOIN #{channel}")
}

/// Request the tag and command capabilities needed for sender metadata.
pub fn cap_req(capabilities: &[&str]) -> String {
    format!("CAP REQ :{}", capabilities.join(" "))
}

/// The in-chat command that erases a user's recent messages via a short
/// timeout.
pub fn timeout_command(user: &str, seconds: u32) -> String {
    format!("/timeout {user} {seconds}")
}

/// The in-chat command that permanently bans a user.
pub fn ban_command(user: &str) -> String {
    format!("/ban {user}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_message_format() {
        assert_eq!(privmsg("limeph", "hello"), "PRIVMSG #limeph :hello");
    }

    #[test]
    fn pass_adds_scheme_prefix_once() {
        assert_eq!(pass("abc123"), "PASS oauth:abc123");
        assert_eq!(pass("oauth:abc123"), "PASS oauth:abc123");
    }

    #[test]
    fn moderation_commands() {
        assert_eq!(timeout_command("rando", 1), "/timeout rando 1");
        assert_eq!(ban_command("rando"), "/ban rando");
    }

    #[test]
    fn capability_request() {
        assert_eq!(
            cap_req(&["twitch.tv/tags", "twitch.tv/commands"]),
            "CAP REQ :twitch.tv/tags twitch.tv/commands"
        );
    }
}
