//! Action dispatch pipeline.
//!
//! This module contains the [`ActionTaker`] trait and the [`Pipeline`] that
//! maps a parsed [`Item`] to exactly one handler and executes it.
//!
//! Handlers are registered in order from general-purpose to increasingly
//! specific. Every handler's condition is evaluated (no short-circuit) and
//! the **last** matching handler is selected, so a narrowly-scoped handler
//! registered later overrides a broad catch-all registered earlier. When
//! nothing matches, an implicit no-op fallback succeeds with no observable
//! effect.

mod commands;
mod moderation;
mod quotes;
mod timers;

pub use commands::{CommandAdminAction, CustomCommandAction};
pub use moderation::{PermitAction, SubModeAction};
pub use quotes::QuoteAction;
pub use timers::TimerAction;

use crate::error::{HandlerError, HandlerResult};
use crate::messenger::Messenger;
use crate::state::BotState;
use async_trait::async_trait;
use tracing::debug;
use warden_proto::Item;

/// A condition/action pair in the dispatch pipeline.
#[async_trait]
pub trait ActionTaker: Send + Sync {
    /// Whether this handler wants the item. Must not mutate anything.
    fn condition(&self, item: &Item, state: &BotState) -> bool;

    /// Run the handler. An `Ok(Some(text))` reply is sent to the channel by
    /// the pipeline; non-fatal errors become chat-visible replies.
    async fn action(
        &self,
        item: &Item,
        state: &mut BotState,
        messenger: &dyn Messenger,
    ) -> HandlerResult;
}

/// Ordered list of handlers with last-match-wins selection.
pub struct Pipeline {
    actions: Vec<Box<dyn ActionTaker>>,
}

impl Pipeline {
    /// Build a pipeline from an explicit handler list.
    pub fn new(actions: Vec<Box<dyn ActionTaker>>) -> Self {
        Self { actions }
    }

    /// The default handler set, general-purpose first so that dedicated
    /// handlers registered later take precedence.
    pub fn with_default_actions() -> Self {
        Self::new(vec![
            Box::new(CustomCommandAction),
            Box::new(CommandAdminAction),
            Box::new(QuoteAction),
            Box::new(TimerAction),
            Box::new(PermitAction),
            Box::new(SubModeAction),
        ])
    }

    /// Select and run the handler for one item.
    ///
    /// Non-fatal handler errors are rendered to chat and swallowed; fatal
    /// errors (storage, closed outbound channel) propagate to the caller for
    /// termination decisions.
    pub async fn dispatch(
        &self,
        item: &Item,
        state: &mut BotState,
        messenger: &dyn Messenger,
    ) -> Result<(), HandlerError> {
        let mut selected: Option<&dyn ActionTaker> = None;
        for action in &self.actions {
            if action.condition(item, state) {
                selected = Some(action.as_ref());
            }
        }

        let Some(action) = selected else {
            // Implicit no-op fallback.
            return Ok(());
        };

        match action.action(item, state, messenger).await {
            Ok(Some(reply)) => {
                messenger.send(&reply).await?;
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => match err.to_chat_reply() {
                Some(reply) => {
                    debug!(code = err.error_code(), error = %err, "Handler error");
                    messenger.send(&reply).await?;
                    Ok(())
                }
                None => Err(err),
            },
        }
    }
}
