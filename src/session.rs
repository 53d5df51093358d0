//! The session loop: one raw line at a time, end to end.
//!
//! A single synchronous consumer processes each line through parse →
//! moderate → dispatch → respond. There is no concurrent processing of chat
//! lines; timer schedules run beside this loop and share only the outbound
//! channel. Parse errors get an addressed reply and processing continues;
//! only storage or transport failures abort the session.

use crate::error::HandlerError;
use crate::handlers::Pipeline;
use crate::messenger::Messenger;
use crate::moderation::ModerationFilter;
use crate::state::BotState;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace};
use warden_proto::{encode, ChannelContext};

/// Drives one chat session over an established connection.
pub struct Session {
    ctx: ChannelContext,
    pipeline: Pipeline,
    filter: ModerationFilter,
    state: BotState,
    messenger: Arc<dyn Messenger>,
    outbound_raw: mpsc::Sender<String>,
    pong_target: String,
}

impl Session {
    /// Assemble a session.
    ///
    /// `outbound_raw` carries non-chat protocol lines (keepalive replies);
    /// everything chat-visible goes through `messenger`.
    pub fn new(
        ctx: ChannelContext,
        pipeline: Pipeline,
        filter: ModerationFilter,
        state: BotState,
        messenger: Arc<dyn Messenger>,
        outbound_raw: mpsc::Sender<String>,
        pong_target: impl Into<String>,
    ) -> Self {
        Self {
            ctx,
            pipeline,
            filter,
            state,
            messenger,
            outbound_raw,
            pong_target: pong_target.into(),
        }
    }

    /// Process one trimmed raw protocol line end to end.
    ///
    /// Returns an error only for fatal conditions (storage unavailable,
    /// outbound channel closed); everything else is handled in-channel.
    pub async fn process_line(&mut self, raw: &str) -> Result<(), HandlerError> {
        if warden_proto::is_keepalive(raw) {
            // Echo the probe's payload; fall back to the configured host.
            let target = raw
                .split_once(':')
                .map(|(_, rest)| rest.trim())
                .filter(|rest| !rest.is_empty())
                .unwrap_or(self.pong_target.as_str());
            self.outbound_raw.send(encode::pong(target)).await?;
            return Ok(());
        }

        let parsed = warden_proto::parse_line(raw, &self.ctx);

        // Moderation screens the full payload on every chat line, whatever
        // the parse or dispatch outcome.
        if let Some(text) = warden_proto::payload(raw, &self.ctx) {
            let sender = match &parsed {
                Ok(item) => item.sender.clone(),
                Err(err) => err.sender.clone(),
            };
            self.filter
                .scan_for_bad_words(&sender.name, text, self.messenger.as_ref())
                .await;
            self.filter
                .filter_for_spam(
                    &sender,
                    text,
                    &mut self.state.permitted_posters,
                    self.messenger.as_ref(),
                )
                .await;
        }

        let item = match parsed {
            Ok(item) => item,
            Err(err) => {
                debug!(sender = %err.sender.name, "Malformed command invocation");
                let reply = if err.sender.name.is_empty() {
                    err.to_string()
                } else {
                    format!("{}, {}", err.sender.name, err)
                };
                self.messenger.send(&reply).await?;
                return Ok(());
            }
        };

        if item.is_server_info {
            trace!(line = %item.contents, "Server info line");
            return Ok(());
        }

        self.pipeline
            .dispatch(&item, &mut self.state, self.messenger.as_ref())
            .await?;

        self.state.publish();
        Ok(())
    }
}
