//! HTTP server for the read-only inspection API.
//!
//! Runs on a separate tokio task and mirrors in-memory state as JSON. State
//! arrives as watch-channel snapshots published by the session loop, so this
//! server never touches (let alone mutates) the stores; ban history is read
//! straight from the audit table.

use crate::db::{BanHistoryRow, Database};
use crate::state::StateSnapshot;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use tokio::sync::watch;

#[derive(Clone)]
struct ApiState {
    snapshot: watch::Receiver<StateSnapshot>,
    db: Database,
}

/// Handler for GET /commands - the custom command store.
async fn commands_handler(State(state): State<ApiState>) -> Json<serde_json::Value> {
    let snapshot = state.snapshot.borrow().clone();
    Json(serde_json::json!(snapshot.commands))
}

/// Handler for GET /quotes - the quote store.
async fn quotes_handler(State(state): State<ApiState>) -> Json<serde_json::Value> {
    let snapshot = state.snapshot.borrow().clone();
    Json(serde_json::json!(snapshot.quotes))
}

/// Handler for GET /timers - the timer store.
async fn timers_handler(State(state): State<ApiState>) -> Json<serde_json::Value> {
    let snapshot = state.snapshot.borrow().clone();
    Json(serde_json::json!(snapshot.timers))
}

/// Handler for GET /banhistory - the append-only audit log, newest first.
async fn ban_history_handler(
    State(state): State<ApiState>,
) -> Result<Json<Vec<BanHistoryRow>>, StatusCode> {
    match state.db.moderation().ban_history().await {
        Ok(history) => Ok(Json(history)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read ban history");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Run the inspection API server.
///
/// Binds to `0.0.0.0:port`. This is a long-running task that should be
/// spawned in the background.
pub async fn run_http_server(
    port: u16,
    snapshot: watch::Receiver<StateSnapshot>,
    db: Database,
) {
    let state = ApiState { snapshot, db };
    let app = Router::new()
        .route("/commands", get(commands_handler))
        .route("/quotes", get(quotes_handler))
        .route("/timers", get(timers_handler))
        .route("/banhistory", get(ban_history_handler))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Inspection API listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind inspection API on {}: {}", addr, e);
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Inspection API server error: {}", e);
    }
}
