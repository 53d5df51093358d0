//! Moderation-adjacent handlers: link permits and subscriber-only mode.

use super::ActionTaker;
use crate::error::HandlerResult;
use crate::messenger::Messenger;
use crate::state::BotState;
use async_trait::async_trait;
use warden_proto::{Item, Rank};

/// Handler for `!permit <user>`: grants a one-shot exemption from link
/// purging, consumed by the spam filter on the user's next link.
pub struct PermitAction;

#[async_trait]
impl ActionTaker for PermitAction {
    fn condition(&self, item: &Item, _state: &BotState) -> bool {
        item.item_type == "!permit"
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
        if item.command.is_empty() {
            return Ok(Some("usage: !permit <user>".to_string()));
        }

        let user = item.command.to_lowercase();
        state.permitted_posters.insert(user.clone());
        Ok(Some(format!(
            "{user} may post one link without being purged."
        )))
    }
}

/// Handler for `!subon` / `!suboff`: toggles subscribers-only chat by
/// emitting the room command, then confirms in chat.
pub struct SubModeAction;

#[async_trait]
impl ActionTaker for SubModeAction {
    fn condition(&self, item: &Item, _state: &BotState) -> bool {
        item.item_type == "!subon" || item.item_type == "!suboff"
    }

    async fn action(
        &self,
        item: &Item,
        _state: &mut BotState,
        messenger: &dyn Messenger,
    ) -> HandlerResult {
        if item.sender.rank < Rank::Moderator {
            return Ok(None);
        }

        if item.item_type == "!subon" {
            messenger.send("/subscribers").await?;
            Ok(Some("Subscriber only mode is now on.".to_string()))
        } else {
            messenger.send("/subscribersoff").await?;
            Ok(Some("Subscriber only mode is now off.".to_string()))
        }
    }
}
