//! The outbound message abstraction.
//!
//! Everything the bot says in chat, whether driven by the line loop or by a
//! timer schedule, goes through [`Messenger::send`]. The concrete
//! implementation formats a channel message and hands it to the writer task
//! over a channel, so producers never touch the wire and ordering within one
//! producer is preserved.

use async_trait::async_trait;
use tokio::sync::mpsc;
use warden_proto::encode;

/// Sends one line of text to the channel's chat.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Queue `text` as a channel message. Fails only when the outbound
    /// channel is closed (connection gone).
    async fn send(&self, text: &str) -> Result<(), mpsc::error::SendError<String>>;
}

/// [`Messenger`] implementation backed by the connection's outbound queue.
#[derive(Clone)]
pub struct ChannelMessenger {
    channel: String,
    outbound: mpsc::Sender<String>,
}

impl ChannelMessenger {
    /// Wrap the outbound queue for one channel.
    pub fn new(channel: impl Into<String>, outbound: mpsc::Sender<String>) -> Self {
        Self {
            channel: channel.into(),
            outbound,
        }
    }
}

#[async_trait]
impl Messenger for ChannelMessenger {
    async fn send(&self, text: &str) -> Result<(), mpsc::error::SendError<String>> {
        let line = encode::privmsg(&self.channel, text);
        self.outbound
            .send(line)
            .await
            .map_err(|_| mpsc::error::SendError(text.to_string()))
    }
}
