//! Root banner and health check.

use axum::Json;
use serde_json::{Value, json};

/// `GET /` — service banner.
pub async fn root() -> Json<Value> {
    Json(json!({"message": "Atlas Trip Planner API"}))
}

/// `GET /api/health` — liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}
