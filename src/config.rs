//! Configuration loading and management.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use warden_proto::Rank;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("post_link_perm is not a valid permission name: {0}")]
    InvalidPermission(String),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bot identity and connection.
    pub bot: BotConfig,
    /// Moderation filter tunables.
    #[serde(default)]
    pub moderation: ModerationConfig,
    /// Inspection API configuration.
    #[serde(default)]
    pub api: ApiConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Bot identity and connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Login name of the bot account.
    pub name: String,
    /// OAuth token for the bot account, with or without the `oauth:` prefix.
    pub oauth_token: String,
    /// Chat server address (host:port, TLS).
    #[serde(default = "default_server_addr")]
    pub server_addr: String,
    /// Channel to moderate, without the `#` sigil.
    pub channel: String,
    /// Channel owner's handle. Defaults to the channel name; senders matching
    /// it get broadcaster rank.
    #[serde(default)]
    pub owner: Option<String>,
}

impl BotConfig {
    /// The handle ranked as broadcaster.
    pub fn owner(&self) -> &str {
        self.owner.as_deref().unwrap_or(&self.channel)
    }

    /// Host portion of `server_addr`, used for TLS server-name verification
    /// and keepalive replies.
    pub fn server_host(&self) -> &str {
        self.server_addr
            .split(':')
            .next()
            .unwrap_or(&self.server_addr)
    }
}

/// Moderation filter settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationConfig {
    /// Purge unauthorized link posters.
    #[serde(default = "default_true")]
    pub purge_for_links: bool,
    /// Purge messages at or above `long_msg_amount` bytes.
    #[serde(default = "default_true")]
    pub purge_for_long_msg: bool,
    /// Length threshold for the long-message purge.
    #[serde(default = "default_long_msg_amount")]
    pub long_msg_amount: usize,
    /// Minimum permission name allowed to post links without a permit.
    #[serde(default = "default_post_link_perm")]
    pub post_link_perm: String,
}

impl ModerationConfig {
    /// The rank gate behind `post_link_perm`.
    pub fn post_link_rank(&self) -> Result<Rank, ConfigError> {
        Rank::from_permission_name(&self.post_link_perm)
            .map_err(|e| ConfigError::InvalidPermission(e.0))
    }
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            purge_for_links: default_true(),
            purge_for_long_msg: default_true(),
            long_msg_amount: default_long_msg_amount(),
            post_link_perm: default_post_link_perm(),
        }
    }
}

/// Inspection API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Serve the read-only JSON API.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Listen port for the API.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            port: default_api_port(),
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_server_addr() -> String {
    "irc.chat.twitch.tv:6697".to_string()
}

fn default_long_msg_amount() -> usize {
    400
}

fn default_post_link_perm() -> String {
    // Subscribers and above may post links without a permit.
    "subscriber".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "chatwarden.db".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(content: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    const MINIMAL: &str = r#"
[bot]
name = "wardenbot"
oauth_token = "abc123"
channel = "limeph"
"#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config = parse(MINIMAL).unwrap();
        assert_eq!(config.bot.server_addr, "irc.chat.twitch.tv:6697");
        assert_eq!(config.bot.server_host(), "irc.chat.twitch.tv");
        assert_eq!(config.bot.owner(), "limeph");
        assert!(config.moderation.purge_for_links);
        assert_eq!(config.moderation.long_msg_amount, 400);
        assert_eq!(config.moderation.post_link_rank().unwrap(), Rank::Subscriber);
        assert!(config.api.enabled);
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.database.path, "chatwarden.db");
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = parse(
            r#"
[bot]
name = "wardenbot"
oauth_token = "abc123"
channel = "limeph"
owner = "LimePH"

[moderation]
purge_for_links = false
long_msg_amount = 200
post_link_perm = "moderator"

[api]
enabled = false
port = 9000

[database]
path = "/var/lib/chatwarden/bot.db"
"#,
        )
        .unwrap();

        assert_eq!(config.bot.owner(), "LimePH");
        assert!(!config.moderation.purge_for_links);
        assert_eq!(config.moderation.post_link_rank().unwrap(), Rank::Moderator);
        assert!(!config.api.enabled);
        assert_eq!(config.database.path, "/var/lib/chatwarden/bot.db");
    }

    #[test]
    fn unknown_post_link_perm_is_rejected_at_use() {
        let config = parse(
            r#"
[bot]
name = "wardenbot"
oauth_token = "abc123"
channel = "limeph"

[moderation]
post_link_perm = "overlord"
"#,
        )
        .unwrap();
        assert!(matches!(
            config.moderation.post_link_rank(),
            Err(ConfigError::InvalidPermission(p)) if p == "overlord"
        ));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        assert!(matches!(
            parse("not = [valid"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.bot.name, "wardenbot");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            Config::load("/nonexistent/config.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
