//! Streaming turn orchestration.
//!
//! [`TurnEngine::run_turn`] drives one request/response turn: stream
//! generation deltas, detect a tool call, execute the tool, resume
//! generation with the result in context, then persist the finalized
//! transcript. Events go out as they happen; the session history is
//! only touched at the very end, so an aborted turn leaves no trace.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::{Stream, StreamExt};
use metrics::{counter, histogram};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use atlas_core::errors::EngineError;
use atlas_core::events::{ChatEvent, ToolCallMetadata, ToolResultMetadata, ToolResultStatus};
use atlas_core::messages::{Message, ToolInvocation};
use atlas_core::retry::{RetryConfig, retry_with_backoff};
use atlas_llm::{GenerationClient, GenerationDelta};
use atlas_tools::ToolRegistry;
use atlas_tools::validation::validate_arguments;

use crate::session::SessionStore;

/// Convert a `Duration` to milliseconds, rounding up.
///
/// `Duration::as_millis()` truncates sub-millisecond values to 0, which
/// makes fast tools report "0ms". Any non-zero duration reports at
/// least 1ms.
#[must_use]
pub fn duration_ceil_ms(d: Duration) -> u64 {
    let micros = d.as_micros();
    if micros == 0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation)]
    {
        micros.div_ceil(1_000) as u64
    }
}

/// Bounds applied to one turn.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Bound on opening a generation stream and on each delta gap.
    pub generation_timeout: Duration,
    /// Bound on a single tool execution.
    pub tool_timeout: Duration,
    /// Retry policy for opening generation streams.
    pub retry: RetryConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generation_timeout: Duration::from_secs(120),
            tool_timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

/// Where the turn currently is in its state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// First generation pass; a tool call may arrive.
    Streaming,
    /// Generation pass after the tool round; content only.
    FinalStream,
}

/// Orchestrates turns over a session store, tool registry, and
/// generation client.
pub struct TurnEngine {
    store: Arc<SessionStore>,
    registry: Arc<ToolRegistry>,
    client: Arc<dyn GenerationClient>,
    config: EngineConfig,
}

impl TurnEngine {
    /// Assemble an engine.
    #[must_use]
    pub fn new(
        store: Arc<SessionStore>,
        registry: Arc<ToolRegistry>,
        client: Arc<dyn GenerationClient>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            registry,
            client,
            config,
        }
    }

    /// Session store this engine persists into.
    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Run one turn, yielding events until a terminal `done` or `error`.
    ///
    /// The session's history lock is held for the whole turn; concurrent
    /// turns on the same session run one after another. Cancelling the
    /// token stops the turn at the next suspension point and nothing is
    /// persisted.
    pub fn run_turn(
        &self,
        message: String,
        session_id: Option<String>,
        cancel: CancellationToken,
    ) -> impl Stream<Item = ChatEvent> + Send + use<> {
        let store = Arc::clone(&self.store);
        let registry = Arc::clone(&self.registry);
        let client = Arc::clone(&self.client);
        let config = self.config.clone();

        async_stream::stream! {
            let turn_start = Instant::now();
            let (session, session_id) = store.get_or_create(session_id.as_deref());
            let mut history = session.lock_history().await;
            debug!(session_id = %session_id, history_len = history.len(), "turn started");

            if cancel.is_cancelled() {
                yield ChatEvent::error(EngineError::Cancelled.to_string());
                return;
            }

            let mut context: Vec<Message> = history.clone();
            context.push(Message::user(&message));
            let tools = registry.definitions();

            let mut assistant_text = String::new();
            let mut emitted_content = false;
            let mut pending: Vec<Message> = Vec::new();
            let mut phase = Phase::Streaming;

            loop {
                let opened = retry_with_backoff(&config.retry, "generation", || async {
                    tokio::time::timeout(config.generation_timeout, client.stream(&context, &tools))
                        .await
                        .map_err(|_| EngineError::Timeout {
                            operation: "generation",
                            elapsed_ms: duration_ceil_ms(config.generation_timeout),
                        })?
                })
                .await;
                let mut deltas = match opened {
                    Ok(deltas) => deltas,
                    Err(err) => {
                        error!(session_id = %session_id, error = %err, "generation failed");
                        counter!("turn_errors_total").increment(1);
                        yield ChatEvent::error(err.to_string());
                        return;
                    }
                };
                debug!(session_id = %session_id, ?phase, "generation stream opened");

                let mut requested_call: Option<ToolInvocation> = None;
                loop {
                    let next = tokio::select! {
                        () = cancel.cancelled() => {
                            info!(session_id = %session_id, "turn cancelled mid-generation");
                            yield ChatEvent::error(EngineError::Cancelled.to_string());
                            return;
                        }
                        next = tokio::time::timeout(config.generation_timeout, deltas.next()) => {
                            match next {
                                Ok(next) => next,
                                Err(_) => {
                                    let err = EngineError::Timeout {
                                        operation: "generation",
                                        elapsed_ms: duration_ceil_ms(config.generation_timeout),
                                    };
                                    error!(session_id = %session_id, error = %err, "delta wait timed out");
                                    counter!("turn_errors_total").increment(1);
                                    yield ChatEvent::error(err.to_string());
                                    return;
                                }
                            }
                        }
                    };
                    match next {
                        None => break,
                        Some(Ok(GenerationDelta::Content(chunk))) => {
                            assistant_text.push_str(&chunk);
                            emitted_content = true;
                            yield ChatEvent::content(&session_id, chunk);
                        }
                        Some(Ok(GenerationDelta::ToolCall(call))) => {
                            if phase == Phase::FinalStream {
                                let err = EngineError::ProtocolViolation(format!(
                                    "backend requested tool '{}' after the tool round completed",
                                    call.tool_name
                                ));
                                error!(session_id = %session_id, error = %err, "aborting turn");
                                counter!("turn_errors_total").increment(1);
                                yield ChatEvent::error(err.to_string());
                                return;
                            }
                            requested_call = Some(call);
                            break;
                        }
                        Some(Err(err)) => {
                            error!(session_id = %session_id, error = %err, "generation stream failed");
                            counter!("turn_errors_total").increment(1);
                            yield ChatEvent::error(err.to_string());
                            return;
                        }
                    }
                }
                drop(deltas);

                let Some(call) = requested_call else {
                    break;
                };

                yield ChatEvent::ToolCall {
                    session_id: session_id.clone(),
                    metadata: ToolCallMetadata::starting(&call.tool_name, call.arguments.clone()),
                };

                let result = execute_tool(&registry, &config, &call).await;
                if cancel.is_cancelled() {
                    // The tool ran to completion but its result is discarded.
                    info!(session_id = %session_id, tool = %call.tool_name, "turn cancelled mid-tool");
                    yield ChatEvent::error(EngineError::Cancelled.to_string());
                    return;
                }
                let is_error = result.status == ToolResultStatus::Error;
                yield ChatEvent::ToolResult {
                    session_id: session_id.clone(),
                    metadata: result.clone(),
                };

                let call_record = Message::ToolCall { call: call.clone() };
                let result_record =
                    Message::tool_result(&call.call_id, &result.full_result, is_error);
                context.push(call_record.clone());
                context.push(result_record.clone());
                pending.push(call_record);
                pending.push(result_record);
                phase = Phase::FinalStream;
            }

            history.push(Message::user(&message));
            history.append(&mut pending);
            history.push(Message::assistant(&assistant_text));

            if !emitted_content {
                // Keep clients that render incrementally from hanging on a
                // turn whose backend produced nothing.
                yield ChatEvent::content(&session_id, "");
            }
            counter!("turns_completed_total").increment(1);
            histogram!("turn_duration_seconds").record(turn_start.elapsed().as_secs_f64());
            info!(
                session_id = %session_id,
                chars = assistant_text.len(),
                tool_round = (history.len() >= 2 && matches!(history[history.len() - 2], Message::ToolResult { .. })),
                "turn finalized"
            );
            yield ChatEvent::done(&session_id);
        }
    }
}

/// Run one tool call to a result, never propagating failure.
///
/// Unknown tools, schema violations, execution errors, and timeouts all
/// land in the metadata with `status: error`; the turn continues and the
/// backend sees the error text.
async fn execute_tool(
    registry: &ToolRegistry,
    config: &EngineConfig,
    call: &ToolInvocation,
) -> ToolResultMetadata {
    let start = Instant::now();

    let Some(tool) = registry.resolve(&call.tool_name) else {
        warn!(tool = %call.tool_name, "tool not found");
        return ToolResultMetadata::error(
            format!("Tool not found: {}", call.tool_name),
            duration_ceil_ms(start.elapsed()),
        );
    };

    if let Err(err) = validate_arguments(&tool.definition(), &call.arguments) {
        warn!(tool = %call.tool_name, error = %err, "tool arguments rejected");
        return ToolResultMetadata::error(err.to_string(), duration_ceil_ms(start.elapsed()));
    }

    let outcome = tokio::time::timeout(
        config.tool_timeout,
        tool.execute(Value::Object(call.arguments.clone())),
    )
    .await;

    let elapsed_ms = duration_ceil_ms(start.elapsed());
    counter!("tool_executions_total", "tool" => call.tool_name.clone()).increment(1);
    histogram!("tool_execution_duration_seconds", "tool" => call.tool_name.clone())
        .record(start.elapsed().as_secs_f64());

    match outcome {
        Ok(Ok(text)) => {
            info!(tool = %call.tool_name, elapsed_ms, "tool executed");
            ToolResultMetadata::success(text, elapsed_ms)
        }
        Ok(Err(err)) => {
            warn!(tool = %call.tool_name, elapsed_ms, error = %err, "tool failed");
            ToolResultMetadata::error(err.to_string(), elapsed_ms)
        }
        Err(_) => {
            warn!(tool = %call.tool_name, elapsed_ms, "tool timed out");
            ToolResultMetadata::error(
                format!(
                    "Tool '{}' timed out after {}ms",
                    call.tool_name,
                    duration_ceil_ms(config.tool_timeout)
                ),
                elapsed_ms,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_ms_rounds_up() {
        assert_eq!(duration_ceil_ms(Duration::ZERO), 0);
        assert_eq!(duration_ceil_ms(Duration::from_micros(1)), 1);
        assert_eq!(duration_ceil_ms(Duration::from_micros(999)), 1);
        assert_eq!(duration_ceil_ms(Duration::from_micros(1_001)), 2);
        assert_eq!(duration_ceil_ms(Duration::from_millis(42)), 42);
    }

    #[test]
    fn config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.generation_timeout, Duration::from_secs(120));
        assert_eq!(config.tool_timeout, Duration::from_secs(30));
        assert_eq!(config.retry.max_retries, 3);
    }
}
