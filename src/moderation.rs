//! Moderation filter: bad-word, link and long-message screening.
//!
//! The filter runs on every chat line regardless of what the dispatch
//! pipeline does with it. Purges and bans are fire-and-forget: a failure to
//! emit the command is logged and never retried or surfaced to chat, since
//! retrying a moderation action after the fact defeats its purpose.

use crate::db::{Database, DbError};
use crate::messenger::Messenger;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, warn};
use warden_proto::{encode, Rank, Sender};

/// What a matched bad-word rule does to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Short timeout that erases recent messages.
    Purge,
    /// Permanent ban, recorded in the audit log first.
    Ban,
}

impl Severity {
    /// Map the persisted severity ordinal (0 purge, 1 ban).
    pub fn from_ordinal(severity: i64) -> Self {
        if severity == 0 {
            Severity::Purge
        } else {
            Severity::Ban
        }
    }
}

/// One bad-word rule: a substring and what matching it does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadWordRule {
    /// Substring to look for in message content.
    pub phrase: String,
    /// Action taken on a match.
    pub severity: Severity,
}

/// Tunables for the spam screens, taken from configuration.
#[derive(Debug, Clone)]
pub struct FilterSettings {
    /// Purge unauthorized link posters.
    pub purge_for_links: bool,
    /// Purge messages at or above the length limit.
    pub purge_for_long_msg: bool,
    /// Length (in bytes) at which a message counts as too long.
    pub long_msg_limit: usize,
    /// Minimum rank allowed to post links without a permit.
    pub post_link_rank: Rank,
}

/// Screens chat lines and emits purge/ban commands.
pub struct ModerationFilter {
    db: Database,
    rules: Vec<BadWordRule>,
    settings: FilterSettings,
    url_pattern: Regex,
}

impl ModerationFilter {
    /// Build a filter over an explicit rule list.
    pub fn new(db: Database, rules: Vec<BadWordRule>, settings: FilterSettings) -> Self {
        Self {
            db,
            rules,
            settings,
            // https://stackoverflow.com/questions/3809401
            url_pattern: Regex::new(
                r"[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_\+.~#?&//=]*)",
            )
            .expect("url pattern is valid"),
        }
    }

    /// Build a filter with rules loaded from storage, in declaration order.
    pub async fn load(db: Database, settings: FilterSettings) -> Result<Self, DbError> {
        let rules = db
            .moderation()
            .load_bad_words()
            .await?
            .into_iter()
            .map(|row| BadWordRule {
                phrase: row.phrase,
                severity: Severity::from_ordinal(row.severity),
            })
            .collect();
        Ok(Self::new(db, rules, settings))
    }

    /// Check `content` against every rule in declaration order.
    ///
    /// The scan does not stop at the first match: one message can trigger
    /// multiple purges and bans.
    pub async fn scan_for_bad_words(
        &self,
        sender: &str,
        content: &str,
        messenger: &dyn Messenger,
    ) {
        for rule in &self.rules {
            if !content.contains(&rule.phrase) {
                continue;
            }
            match rule.severity {
                Severity::Purge => self.purge(sender, messenger).await,
                Severity::Ban => {
                    let reason = format!("prohibited phrase: {}", rule.phrase);
                    self.ban(sender, &reason, messenger).await;
                }
            }
        }
    }

    /// Screen a message for link and length spam.
    ///
    /// The link and long-message checks are independent; a single message
    /// can be purged by both.
    pub async fn filter_for_spam(
        &self,
        sender: &Sender,
        content: &str,
        permitted: &mut HashSet<String>,
        messenger: &dyn Messenger,
    ) {
        if self.settings.purge_for_links && self.url_pattern.is_match(content) {
            // A one-shot permit is consumed even when rank alone would have
            // allowed the link.
            let had_pass = permitted.remove(&sender.name);
            if had_pass || sender.rank >= self.settings.post_link_rank {
                debug!(user = %sender.name, permitted = had_pass, "Link allowed");
            } else {
                self.purge(&sender.name, messenger).await;
                let notice = format!("{}, you do not have permissions to post links.", sender.name);
                if let Err(e) = messenger.send(&notice).await {
                    warn!(user = %sender.name, error = %e, "Failed to send link warning");
                }
            }
        }

        if self.settings.purge_for_long_msg && content.len() >= self.settings.long_msg_limit {
            self.purge(&sender.name, messenger).await;
        }
    }

    /// Erase a user's recent messages with a one-second timeout.
    async fn purge(&self, user: &str, messenger: &dyn Messenger) {
        debug!(user = %user, "Purging user");
        if let Err(e) = messenger.send(&encode::timeout_command(user, 1)).await {
            warn!(user = %user, error = %e, "Failed to emit purge command");
        }
    }

    /// Ban a user, appending to the audit log before the command goes out.
    async fn ban(&self, user: &str, reason: &str, messenger: &dyn Messenger) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        if let Err(e) = self.db.moderation().record_ban(user, reason, &timestamp).await {
            warn!(user = %user, error = %e, "Failed to record ban in audit log");
        }
        if let Err(e) = messenger.send(&encode::ban_command(user)).await {
            warn!(user = %user, error = %e, "Failed to emit ban command");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messenger::testing::RecordingMessenger;

    fn settings() -> FilterSettings {
        FilterSettings {
            purge_for_links: true,
            purge_for_long_msg: true,
            long_msg_limit: 400,
            post_link_rank: Rank::Subscriber,
        }
    }

    async fn filter_with(rules: Vec<BadWordRule>) -> ModerationFilter {
        let db = Database::new(":memory:").await.unwrap();
        ModerationFilter::new(db, rules, settings())
    }

    fn purge_rule(phrase: &str) -> BadWordRule {
        BadWordRule {
            phrase: phrase.into(),
            severity: Severity::Purge,
        }
    }

    fn ban_rule(phrase: &str) -> BadWordRule {
        BadWordRule {
            phrase: phrase.into(),
            severity: Severity::Ban,
        }
    }

    #[tokio::test]
    async fn purge_rule_emits_one_timeout_per_match() {
        let filter = filter_with(vec![purge_rule("heck")]).await;
        let messenger = RecordingMessenger::new();

        filter
            .scan_for_bad_words("rando", "what the heck", &messenger)
            .await;
        assert_eq!(messenger.sent(), vec!["/timeout rando 1"]);
    }

    #[tokio::test]
    async fn ban_rule_records_audit_entry_before_the_command() {
        let filter = filter_with(vec![ban_rule("slur")]).await;
        let messenger = RecordingMessenger::new();

        filter
            .scan_for_bad_words("rando", "some slur here", &messenger)
            .await;

        assert_eq!(messenger.sent(), vec!["/ban rando"]);
        let history = filter.db.moderation().ban_history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user, "rando");
        assert!(history[0].reason.contains("slur"));
        assert!(!history[0].timestamp.is_empty());
    }

    #[tokio::test]
    async fn scan_does_not_stop_at_the_first_match() {
        let filter = filter_with(vec![purge_rule("one"), ban_rule("two")]).await;
        let messenger = RecordingMessenger::new();

        filter
            .scan_for_bad_words("rando", "one and two", &messenger)
            .await;
        assert_eq!(messenger.sent(), vec!["/timeout rando 1", "/ban rando"]);
    }

    #[tokio::test]
    async fn unauthorized_link_poster_is_purged_and_warned() {
        let filter = filter_with(vec![]).await;
        let messenger = RecordingMessenger::new();
        let sender = Sender::new("rando", Rank::Viewer);
        let mut permitted = HashSet::new();

        filter
            .filter_for_spam(&sender, "go to https://example.com now", &mut permitted, &messenger)
            .await;

        let sent = messenger.sent();
        assert_eq!(sent[0], "/timeout rando 1");
        assert!(sent[1].contains("do not have permissions to post links"));
    }

    #[tokio::test]
    async fn permit_is_consumed_on_use() {
        let filter = filter_with(vec![]).await;
        let sender = Sender::new("rando", Rank::Viewer);
        let mut permitted: HashSet<String> = ["rando".to_string()].into();

        let messenger = RecordingMessenger::new();
        filter
            .filter_for_spam(&sender, "see example.com", &mut permitted, &messenger)
            .await;
        assert!(messenger.sent().is_empty());
        assert!(permitted.is_empty());

        // Second link from the same sender is no longer exempt.
        let messenger = RecordingMessenger::new();
        filter
            .filter_for_spam(&sender, "see example.com", &mut permitted, &messenger)
            .await;
        assert_eq!(messenger.sent()[0], "/timeout rando 1");
    }

    #[tokio::test]
    async fn rank_at_or_above_threshold_may_post_links() {
        let filter = filter_with(vec![]).await;
        let messenger = RecordingMessenger::new();
        let mut permitted = HashSet::new();

        let sender = Sender::new("helper", Rank::Moderator);
        filter
            .filter_for_spam(&sender, "docs at example.com/help", &mut permitted, &messenger)
            .await;
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn long_message_check_fires_independently_of_the_link_check() {
        let filter = filter_with(vec![]).await;
        let messenger = RecordingMessenger::new();
        let sender = Sender::new("rando", Rank::Viewer);
        let mut permitted = HashSet::new();

        let long_spam = format!("example.com {}", "a".repeat(400));
        filter
            .filter_for_spam(&sender, &long_spam, &mut permitted, &messenger)
            .await;

        // Link purge + warning, then an independent long-message purge.
        let sent = messenger.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0], "/timeout rando 1");
        assert_eq!(sent[2], "/timeout rando 1");
    }

    #[tokio::test]
    async fn disabled_screens_do_nothing() {
        let db = Database::new(":memory:").await.unwrap();
        let filter = ModerationFilter::new(
            db,
            vec![],
            FilterSettings {
                purge_for_links: false,
                purge_for_long_msg: false,
                long_msg_limit: 10,
                post_link_rank: Rank::Subscriber,
            },
        );
        let messenger = RecordingMessenger::new();
        let sender = Sender::new("rando", Rank::Viewer);
        let mut permitted = HashSet::new();

        filter
            .filter_for_spam(&sender, "example.com plus a very long message", &mut permitted, &messenger)
            .await;
        assert!(messenger.sent().is_empty());
    }
}
