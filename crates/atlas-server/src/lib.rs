//! # atlas-server
//!
//! The HTTP surface: the streaming `/api/chat` SSE endpoint backed by the
//! turn engine, flight REST endpoints, health probes, and Prometheus
//! metrics. Wiring of clients and services happens in the binary crate;
//! this crate only routes.

#![deny(unsafe_code)]

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use atlas_runtime::TurnEngine;
use atlas_tools::flight::FlightService;

pub mod metrics;
pub mod routes;
pub mod settings;
pub mod sse;

pub use settings::Settings;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Turn orchestrator (owns the session store).
    pub engine: Arc<TurnEngine>,
    /// Flight search service for the REST surface.
    pub flights: Arc<FlightService>,
    /// Renders the `/metrics` endpoint.
    pub metrics: PrometheusHandle,
}

async fn render_metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}

/// Build the application router.
///
/// CORS admits the configured frontend origin with any method and
/// header; an unparseable origin falls back to a fully permissive
/// layer rather than a dead frontend.
pub fn router(state: AppState, frontend_origin: &str) -> Router {
    let cors = match frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            warn!(frontend_origin, "unparseable CORS origin, allowing any");
            CorsLayer::permissive()
        }
    };

    Router::new()
        .route("/", get(routes::health::root))
        .route("/api/health", get(routes::health::health))
        .route("/api/chat", post(routes::chat::chat))
        .route("/api/flights/search", post(routes::flights::search))
        .route("/api/flights/{flight_id}", get(routes::flights::details))
        .route(
            "/api/flights/{flight_id}/availability",
            get(routes::flights::availability),
        )
        .route("/metrics", get(render_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
