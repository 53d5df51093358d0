//! Quote handlers: random, by-id, submit and delete.

use super::ActionTaker;
use crate::error::HandlerResult;
use crate::messenger::Messenger;
use crate::state::BotState;
use async_trait::async_trait;
use warden_proto::{Item, Rank};

const QUOTE_USAGE: &str = "usage: !quote [id], !quote add <text>, !quote del <id>";

/// Handler for everything under `!quote`.
pub struct QuoteAction;

#[async_trait]
impl ActionTaker for QuoteAction {
    fn condition(&self, item: &Item, _state: &BotState) -> bool {
        item.item_type == "!quote"
    }

    async fn action(
        &self,
        item: &Item,
        state: &mut BotState,
        _messenger: &dyn Messenger,
    ) -> HandlerResult {
        match item.command.as_str() {
            // Bare `!quote` asks for a random one.
            "" => state.quotes.random().map(Some),
            "add" => {
                if item.contents.is_empty() {
                    return Ok(Some(QUOTE_USAGE.to_string()));
                }
                state.quotes.add(&item.contents, &item.sender.name).await?;
                Ok(Some("the quote has been added.".to_string()))
            }
            "del" | "delete" => {
                if item.sender.rank < Rank::Moderator {
                    return Ok(None);
                }
                let Ok(id) = item.contents.parse::<i64>() else {
                    return Ok(Some(
                        "the id for the quote must be a valid positive integer".to_string(),
                    ));
                };
                state.quotes.delete(id).await?;
                Ok(Some(format!("quote {id} has been deleted.")))
            }
            other => match other.parse::<i64>() {
                Ok(id) => state.quotes.get(id).map(Some),
                Err(_) => Ok(Some(QUOTE_USAGE.to_string())),
            },
        }
    }
}
