//! chatwarden - a moderation/command bot for tag-prefixed IRC-style chat.

mod config;
mod db;
mod error;
mod handlers;
mod http;
mod messenger;
mod moderation;
mod network;
mod session;
mod state;
mod timer;

use crate::config::Config;
use crate::db::Database;
use crate::handlers::Pipeline;
use crate::messenger::ChannelMessenger;
use crate::moderation::{FilterSettings, ModerationFilter};
use crate::session::Session;
use crate::state::BotState;
use futures_util::StreamExt;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use warden_proto::ChannelContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        bot = %config.bot.name,
        channel = %config.bot.channel,
        "Starting chatwarden"
    );

    // The link-posting threshold is validated up front so a typo in the
    // permission vocabulary fails the start, not a moderation decision.
    let post_link_rank = config.moderation.post_link_rank()?;

    // Initialize database and load all stores
    let db = Database::new(&config.database.path).await?;
    let (state, snapshot_rx) = BotState::load(&db).await?;
    info!(
        commands = state.commands.len(),
        quotes = state.quotes.len(),
        timers = state.timers.len(),
        "Loaded persistent state"
    );

    let filter = ModerationFilter::load(
        db.clone(),
        FilterSettings {
            purge_for_links: config.moderation.purge_for_links,
            purge_for_long_msg: config.moderation.purge_for_long_msg,
            long_msg_limit: config.moderation.long_msg_amount,
            post_link_rank,
        },
    )
    .await?;

    // The inspection API is optional and strictly read-only.
    if config.api.enabled {
        let api_db = db.clone();
        let api_port = config.api.port;
        tokio::spawn(async move {
            http::run_http_server(api_port, snapshot_rx, api_db).await;
        });
    } else {
        info!("Inspection API disabled");
    }

    // Connect and authenticate
    let connection = network::connect(&config.bot).await?;
    network::login(&connection.outbound, &config.bot).await?;

    let messenger = Arc::new(ChannelMessenger::new(
        config.bot.channel.clone(),
        connection.outbound.clone(),
    ));

    // Timer schedules start once, against the state loaded at startup.
    timer::run_all(&state.timers, messenger.clone());

    let mut session = Session::new(
        ChannelContext::new(&config.bot.channel, config.bot.owner()),
        Pipeline::with_default_actions(),
        filter,
        state,
        messenger,
        connection.outbound.clone(),
        config.bot.server_host().to_string(),
    );

    // Main loop: one line at a time, end to end.
    let mut lines = connection.lines;
    while let Some(next) = lines.next().await {
        match next {
            Ok(raw) => {
                if let Err(e) = session.process_line(raw.trim()).await {
                    error!(code = e.error_code(), error = %e, "Fatal session error");
                    return Err(e.into());
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to decode protocol line");
            }
        }
    }

    info!("Connection closed by server");
    Ok(())
}
