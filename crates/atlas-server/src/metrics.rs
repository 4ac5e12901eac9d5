//! Prometheus metrics recorder and `/metrics` endpoint handler.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the handle used to render the `/metrics` endpoint. Call once
/// at startup before any metrics are recorded.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

// Metric name constants to avoid typos across crates.

/// Turns finalized and persisted (counter).
pub const TURNS_COMPLETED_TOTAL: &str = "turns_completed_total";
/// Turns that ended in a terminal error (counter).
pub const TURN_ERRORS_TOTAL: &str = "turn_errors_total";
/// Turn wall-clock duration (histogram).
pub const TURN_DURATION_SECONDS: &str = "turn_duration_seconds";
/// Tool executions (counter, labels: tool).
pub const TOOL_EXECUTIONS_TOTAL: &str = "tool_executions_total";
/// Tool execution duration (histogram, labels: tool).
pub const TOOL_EXECUTION_DURATION_SECONDS: &str = "tool_execution_duration_seconds";
/// Generation retries after transient failures (counter, labels: operation).
pub const BACKEND_RETRIES_TOTAL: &str = "backend_retries_total";
/// Upstream generation requests (counter, labels: model).
pub const GENERATION_REQUESTS_TOTAL: &str = "generation_requests_total";
/// Upstream generation failures (counter, labels: model).
pub const GENERATION_ERRORS_TOTAL: &str = "generation_errors_total";
