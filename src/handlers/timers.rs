//! Timer administration handlers.

use super::ActionTaker;
use crate::error::HandlerResult;
use crate::messenger::Messenger;
use crate::state::BotState;
use async_trait::async_trait;
use warden_proto::{Item, Rank};

const TIMER_USAGE: &str = "usage: !timer add !<name> <minutes> <message>, !timer del !<name>";

/// Handler for `!timer add|del`.
///
/// New timers land in the store enabled, but schedules are only started at
/// session start; a timer added mid-session first fires after the next
/// restart.
pub struct TimerAction;

#[async_trait]
impl ActionTaker for TimerAction {
    fn condition(&self, item: &Item, _state: &BotState) -> bool {
        item.item_type == "!timer"
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
                    return Ok(Some(TIMER_USAGE.to_string()));
                }
                let (interval, message) = match item.contents.split_once(' ') {
                    Some((interval, message)) => (interval, message),
                    None => (item.contents.as_str(), ""),
                };
                state.timers.add(&item.key, interval, message).await?;
                Ok(Some(format!("the timer {} has been added.", item.key)))
            }
            "del" | "delete" => {
                if item.key.is_empty() {
                    return Ok(Some(TIMER_USAGE.to_string()));
                }
                state.timers.delete(&item.key).await?;
                Ok(Some(format!("the timer {} has been deleted.", item.key)))
            }
            _ => Ok(Some(TIMER_USAGE.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::HandlerError;
    use crate::messenger::testing::RecordingMessenger;
    use warden_proto::Sender;

    async fn state() -> BotState {
        let db = Database::new(":memory:").await.unwrap();
        BotState::load(&db).await.unwrap().0
    }

    fn timer_item(command: &str, key: &str, contents: &str, rank: Rank) -> Item {
        Item {
            item_type: "!timer".into(),
            command: command.into(),
            key: key.into(),
            contents: contents.into(),
            sender: Sender::new("helper", rank),
            ..Item::default()
        }
    }

    #[tokio::test]
    async fn add_parses_interval_then_message() {
        let mut state = state().await;
        let messenger = RecordingMessenger::new();

        let reply = TimerAction
            .action(
                &timer_item("add", "!hydrate", "5 hello world", Rank::Moderator),
                &mut state,
                &messenger,
            )
            .await
            .unwrap();

        assert_eq!(reply.as_deref(), Some("the timer !hydrate has been added."));
        let (_, record) = state.timers.iter().next().unwrap();
        assert_eq!(record.minutes, 5);
        assert_eq!(record.message, "hello world");
        assert!(record.enabled);
    }

    #[tokio::test]
    async fn add_with_bad_interval_is_an_invalid_interval_error() {
        let mut state = state().await;
        let messenger = RecordingMessenger::new();

        let err = TimerAction
            .action(
                &timer_item("add", "!oops", "soon hello", Rank::Moderator),
                &mut state,
                &messenger,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::InvalidInterval(t) if t == "soon"));
        assert!(state.timers.is_empty());
    }

    #[tokio::test]
    async fn delete_missing_timer_is_not_found() {
        let mut state = state().await;
        let messenger = RecordingMessenger::new();

        let err = TimerAction
            .action(
                &timer_item("del", "!ghost", "", Rank::Moderator),
                &mut state,
                &messenger,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::NotFound(k) if k == "!ghost"));
    }

    #[tokio::test]
    async fn timer_admin_requires_moderator() {
        let mut state = state().await;
        let messenger = RecordingMessenger::new();

        let reply = TimerAction
            .action(
                &timer_item("add", "!hydrate", "5 drink", Rank::Viewer),
                &mut state,
                &messenger,
            )
            .await
            .unwrap();
        assert!(reply.is_none());
        assert!(state.timers.is_empty());
    }
}
