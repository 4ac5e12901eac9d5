//! Conversation history messages.
//!
//! A session's history is an ordered sequence of [`Message`]s. A finalized
//! turn appends, in order: the user message, then (if a tool round ran) a
//! `ToolCall` immediately followed by its matching `ToolResult`, then one
//! `Assistant` message with the full accumulated reply.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tool invocation requested by the generation backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Backend-assigned call id, shared with the matching result.
    pub call_id: String,
    /// Registered tool name.
    pub tool_name: String,
    /// Arguments as an ordered JSON mapping.
    pub arguments: Map<String, Value>,
}

impl ToolInvocation {
    /// Create an invocation with a freshly allocated call id.
    #[must_use]
    pub fn new(tool_name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            call_id: new_call_id(),
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Allocate a unique tool call id.
///
/// Used when the backend omits one (some OpenAI-compatible servers do).
#[must_use]
pub fn new_call_id() -> String {
    format!("call_{}", uuid::Uuid::now_v7().simple())
}

/// One entry in a session's ordered conversation history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// A message from the user.
    User {
        /// Message text.
        text: String,
    },
    /// A finalized assistant reply.
    Assistant {
        /// Full reply text (concatenation of streamed chunks).
        text: String,
    },
    /// A tool invocation the backend requested mid-turn.
    ToolCall {
        /// The invocation (call id, tool name, arguments).
        #[serde(flatten)]
        call: ToolInvocation,
    },
    /// The outcome of a tool invocation.
    ToolResult {
        /// Call id of the `ToolCall` this answers.
        call_id: String,
        /// Result text, or the error description when `is_error` is set.
        text: String,
        /// Whether the tool failed.
        is_error: bool,
    },
}

impl Message {
    /// Construct a user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::User { text: text.into() }
    }

    /// Construct an assistant message.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant { text: text.into() }
    }

    /// Construct a tool result for the given call id.
    #[must_use]
    pub fn tool_result(call_id: impl Into<String>, text: impl Into<String>, is_error: bool) -> Self {
        Self::ToolResult {
            call_id: call_id.into(),
            text: text.into(),
            is_error,
        }
    }

    /// The message kind as a stable string (for logs and tests).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
        }
    }
}
