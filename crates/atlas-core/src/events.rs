//! Outbound turn events.
//!
//! A [`ChatEvent`] is one unit of the typed stream a turn emits to its
//! caller. Events are transient (never persisted) and map one-to-one onto
//! SSE frames at the HTTP boundary. Exact JSON field names matter — the
//! frontend discriminates on `type` and reads metadata fields directly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::text;

/// Maximum byte length of a tool result summary.
pub const SUMMARY_MAX_BYTES: usize = 200;

/// Maximum number of result lines included in a summary.
pub const SUMMARY_MAX_LINES: usize = 3;

/// Tool call execution status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    /// Execution has started and is in flight.
    Running,
    /// Execution finished (success or error — see the result metadata).
    Done,
}

/// Tool result outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolResultStatus {
    /// The tool produced a result.
    Success,
    /// The tool failed; `full_result` carries the error description.
    Error,
}

/// Metadata attached to a `tool_call` event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCallMetadata {
    /// Name of the tool being invoked.
    pub tool_name: String,
    /// Arguments passed to the tool.
    pub arguments: Map<String, Value>,
    /// RFC 3339 timestamp of when execution started.
    pub started_at: String,
    /// Execution status (`running` when the event is emitted).
    pub status: ToolCallStatus,
}

impl ToolCallMetadata {
    /// Metadata for an execution starting now.
    #[must_use]
    pub fn starting(tool_name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
            started_at: chrono::Utc::now().to_rfc3339(),
            status: ToolCallStatus::Running,
        }
    }
}

/// Metadata attached to a `tool_result` event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    /// Bounded-length preview of the result.
    pub summary: String,
    /// Complete result text (or error description).
    pub full_result: String,
    /// Outcome of the execution.
    pub status: ToolResultStatus,
    /// Wall-clock execution time in milliseconds.
    pub elapsed_ms: u64,
}

impl ToolResultMetadata {
    /// Metadata for a successful execution.
    #[must_use]
    pub fn success(full_result: impl Into<String>, elapsed_ms: u64) -> Self {
        let full_result = full_result.into();
        Self {
            summary: text::summarize(&full_result, SUMMARY_MAX_LINES, SUMMARY_MAX_BYTES),
            full_result,
            status: ToolResultStatus::Success,
            elapsed_ms,
        }
    }

    /// Metadata for a failed execution.
    #[must_use]
    pub fn error(description: impl Into<String>, elapsed_ms: u64) -> Self {
        let full_result = description.into();
        Self {
            summary: text::summarize(&full_result, SUMMARY_MAX_LINES, SUMMARY_MAX_BYTES),
            full_result,
            status: ToolResultStatus::Error,
            elapsed_ms,
        }
    }
}

/// One event in the outbound stream for a single turn.
///
/// Ordering within a turn follows the state machine: zero or more
/// `content` events, at most one `tool_call`/`tool_result` pair, more
/// `content` events, then exactly one terminal `done` or `error`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Incremental assistant text.
    Content {
        /// Text fragment.
        chunk: String,
        /// Session this turn belongs to.
        session_id: String,
    },
    /// A tool execution is starting.
    ToolCall {
        /// Session this turn belongs to.
        session_id: String,
        /// Call details.
        metadata: ToolCallMetadata,
    },
    /// A tool execution finished.
    ToolResult {
        /// Session this turn belongs to.
        session_id: String,
        /// Result details.
        metadata: ToolResultMetadata,
    },
    /// The turn completed and was persisted.
    Done {
        /// Session this turn belongs to.
        session_id: String,
    },
    /// The turn failed; the stream ends here.
    Error {
        /// Human-readable error description.
        error: String,
    },
}

impl ChatEvent {
    /// Construct a content event.
    #[must_use]
    pub fn content(session_id: impl Into<String>, chunk: impl Into<String>) -> Self {
        Self::Content {
            chunk: chunk.into(),
            session_id: session_id.into(),
        }
    }

    /// Construct a terminal done event.
    #[must_use]
    pub fn done(session_id: impl Into<String>) -> Self {
        Self::Done {
            session_id: session_id.into(),
        }
    }

    /// Construct a terminal error event.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// The event type string (matches the wire `type` field).
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Content { .. } => "content",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }

    /// Whether this event terminates the stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }
}
