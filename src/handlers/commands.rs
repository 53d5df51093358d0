//! Custom command invocation and administration handlers.

use super::ActionTaker;
use crate::error::HandlerResult;
use crate::messenger::Messenger;
use crate::state::BotState;
use async_trait::async_trait;
use tracing::debug;
use warden_proto::{Item, Rank};

/// A sender may trigger a command iff their rank meets the requirement.
#[inline]
fn authorized(sender: Rank, required: Rank) -> bool {
    sender >= required
}

/// Generic handler for any named command: looks the item type up in the
/// command store and replies with the stored response.
///
/// Registered first so dedicated handlers (quotes, timers, ...) override it
/// for their own types.
pub struct CustomCommandAction;

#[async_trait]
impl ActionTaker for CustomCommandAction {
    fn condition(&self, item: &Item, _state: &BotState) -> bool {
        item.is_invocation()
    }

    async fn action(
        &self,
        item: &Item,
        state: &mut BotState,
        _messenger: &dyn Messenger,
    ) -> HandlerResult {
        let Some(record) = state.commands.find(&item.item_type) else {
            // Unknown command words are ignored, not errors.
            return Ok(None);
        };
        let response = record.response.clone();

        let required = state.commands.required_rank(&item.item_type)?;
        if !authorized(item.sender.rank, required) {
            debug!(
                user = %item.sender.name,
                command = %item.item_type,
                "Sender rank below command requirement"
            );
            return Ok(None);
        }

        state.commands.increment_count(&item.item_type).await?;
        Ok(Some(response))
    }
}

/// Handler for `!com add|edit|del` command administration.
pub struct CommandAdminAction;

const COM_USAGE: &str = "usage: !com add|edit|del !<name> [response]";

#[async_trait]
impl ActionTaker for CommandAdminAction {
    fn condition(&self, item: &Item, _state: &BotState) -> bool {
        item.item_type == "!com"
    }

    async fn action(
        &self,
        item: &Item,
        state: &mut BotState,
        _messenger: &dyn Messenger,
    ) -> HandlerResult {
        if item.sender.rank < Rank::Moderator {
            return Ok(None);
        }

        match item.command.as_str() {
            "add" => {
                if item.key.is_empty() || item.contents.is_empty() {
                    return Ok(Some(COM_USAGE.to_string()));
                }
                state
                    .commands
                    .add(&item.key, &item.contents, Rank::Viewer)
                    .await?;
                Ok(Some(format!("the command {} has been added.", item.key)))
            }
            "edit" => {
                if item.key.is_empty() || item.contents.is_empty() {
                    return Ok(Some(COM_USAGE.to_string()));
                }
                state.commands.edit(&item.key, &item.contents).await?;
                Ok(Some(format!("the command {} has been updated.", item.key)))
            }
            "del" | "delete" | "remove" => {
                if item.key.is_empty() {
                    return Ok(Some(COM_USAGE.to_string()));
                }
                if state.commands.remove(&item.key).await? {
                    Ok(Some(format!("{} has been deleted.", item.key)))
                } else {
                    Ok(Some(format!("could not find {}.", item.key)))
                }
            }
            _ => Ok(Some(COM_USAGE.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::messenger::testing::RecordingMessenger;
    use warden_proto::Sender;

    async fn state() -> BotState {
        let db = Database::new(":memory:").await.unwrap();
        BotState::load(&db).await.unwrap().0
    }

    fn item(item_type: &str, command: &str, key: &str, contents: &str, rank: Rank) -> Item {
        Item {
            item_type: item_type.into(),
            command: command.into(),
            key: key.into(),
            contents: contents.into(),
            sender: Sender::new("tester", rank),
            ..Item::default()
        }
    }

    #[test]
    fn permission_gate_covers_every_rank_pair() {
        let ranks = [
            Rank::Viewer,
            Rank::Subscriber,
            Rank::Moderator,
            Rank::Broadcaster,
        ];
        for sender in ranks {
            for required in ranks {
                assert_eq!(
                    authorized(sender, required),
                    sender.ordinal() >= required.ordinal(),
                    "gate mismatch for sender {sender:?} required {required:?}"
                );
            }
        }
    }

    #[tokio::test]
    async fn invocation_replies_and_increments_the_count() {
        let mut state = state().await;
        state
            .commands
            .add("!greet", "hello there", Rank::Viewer)
            .await
            .unwrap();

        let messenger = RecordingMessenger::new();
        let reply = CustomCommandAction
            .action(
                &item("!greet", "", "", "", Rank::Viewer),
                &mut state,
                &messenger,
            )
            .await
            .unwrap();

        assert_eq!(reply.as_deref(), Some("hello there"));
        assert_eq!(state.commands.find("!greet").unwrap().count, 1);
    }

    #[tokio::test]
    async fn invocation_below_required_rank_is_silent() {
        let mut state = state().await;
        state
            .commands
            .add("!mods", "mod seekrit", Rank::Moderator)
            .await
            .unwrap();

        let messenger = RecordingMessenger::new();
        let reply = CustomCommandAction
            .action(
                &item("!mods", "", "", "", Rank::Subscriber),
                &mut state,
                &messenger,
            )
            .await
            .unwrap();

        assert!(reply.is_none());
        assert_eq!(state.commands.find("!mods").unwrap().count, 0);
    }

    #[tokio::test]
    async fn unknown_command_word_is_ignored() {
        let mut state = state().await;
        let messenger = RecordingMessenger::new();
        let reply = CustomCommandAction
            .action(
                &item("!nothing", "", "", "", Rank::Viewer),
                &mut state,
                &messenger,
            )
            .await
            .unwrap();
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn admin_add_creates_a_command_open_to_all() {
        let mut state = state().await;
        let messenger = RecordingMessenger::new();

        let reply = CommandAdminAction
            .action(
                &item("!com", "add", "!greet", "hello there", Rank::Moderator),
                &mut state,
                &messenger,
            )
            .await
            .unwrap();

        assert_eq!(reply.as_deref(), Some("the command !greet has been added."));
        let record = state.commands.find("!greet").unwrap();
        assert_eq!(record.response, "hello there");
        assert_eq!(record.perm, "all");
    }

    #[tokio::test]
    async fn admin_edit_and_delete_round_trip() {
        let mut state = state().await;
        let messenger = RecordingMessenger::new();

        CommandAdminAction
            .action(
                &item("!com", "add", "!greet", "hello", Rank::Moderator),
                &mut state,
                &messenger,
            )
            .await
            .unwrap();
        CommandAdminAction
            .action(
                &item("!com", "edit", "!greet", "howdy", Rank::Moderator),
                &mut state,
                &messenger,
            )
            .await
            .unwrap();
        assert_eq!(state.commands.find("!greet").unwrap().response, "howdy");

        let reply = CommandAdminAction
            .action(
                &item("!com", "del", "!greet", "", Rank::Moderator),
                &mut state,
                &messenger,
            )
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("!greet has been deleted."));
        assert!(state.commands.find("!greet").is_none());
    }

    #[tokio::test]
    async fn admin_delete_of_missing_command_reports_it() {
        let mut state = state().await;
        let messenger = RecordingMessenger::new();
        let reply = CommandAdminAction
            .action(
                &item("!com", "del", "!ghost", "", Rank::Moderator),
                &mut state,
                &messenger,
            )
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("could not find !ghost."));
    }

    #[tokio::test]
    async fn admin_commands_require_moderator_rank() {
        let mut state = state().await;
        let messenger = RecordingMessenger::new();
        let reply = CommandAdminAction
            .action(
                &item("!com", "add", "!greet", "hello", Rank::Subscriber),
                &mut state,
                &messenger,
            )
            .await
            .unwrap();
        assert!(reply.is_none());
        assert!(state.commands.find("!greet").is_none());
    }

    #[tokio::test]
    async fn malformed_admin_invocation_gets_usage() {
        let mut state = state().await;
        let messenger = RecordingMessenger::new();
        let reply = CommandAdminAction
            .action(
                &item("!com", "add", "", "", Rank::Moderator),
                &mut state,
                &messenger,
            )
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some(COM_USAGE));
    }
}
