//! Streaming chat endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::AppState;
use crate::sse;

/// `POST /api/chat` request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
    /// Session to continue; omit to start a new one.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// `POST /api/chat` — run one turn and stream its events as SSE.
///
/// Validation happens before the stream starts: a blank message is a 422
/// JSON error, never a frame. Once streaming begins all failures arrive
/// as `error` events inside the stream.
pub async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    if request.message.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"error": "message must not be empty"})),
        )
            .into_response();
    }

    info!(
        session_id = request.session_id.as_deref().unwrap_or("<new>"),
        chars = request.message.len(),
        "chat turn requested"
    );

    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();
    let events = state
        .engine
        .run_turn(request.message, request.session_id, cancel);
    sse::response(events, guard)
}
