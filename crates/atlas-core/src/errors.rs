//! Error taxonomy for the turn engine.
//!
//! Three propagation classes (request validation is handled at the HTTP
//! boundary and never enters the stream):
//!
//! - Tool failures are recovered locally — they become `tool_result`
//!   events with `status: error` and the turn continues.
//! - Generation backend failures abort the turn with one terminal
//!   `error` event; transient ones may be retried first.
//! - Protocol violations (a second tool round) are always fatal.

use thiserror::Error;

/// Errors that can abort a turn.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The generation backend failed (network, HTTP status, malformed
    /// stream). `retryable` distinguishes transient connectivity and
    /// server errors from fatal ones such as bad requests.
    #[error("generation backend error: {message}")]
    Generation {
        /// Description of the failure.
        message: String,
        /// Whether a bounded retry is appropriate.
        retryable: bool,
    },

    /// A bounded wait elapsed.
    #[error("{operation} timed out after {elapsed_ms}ms")]
    Timeout {
        /// What was being awaited.
        operation: &'static str,
        /// The bound that was exceeded.
        elapsed_ms: u64,
    },

    /// The backend requested a tool call after the tool round already
    /// completed. One round per turn; anything more is a protocol bug.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// The client disconnected; the turn was abandoned unpersisted.
    #[error("turn cancelled")]
    Cancelled,
}

impl EngineError {
    /// Convenience constructor for a retryable backend failure.
    #[must_use]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
            retryable: true,
        }
    }

    /// Convenience constructor for a fatal backend failure.
    #[must_use]
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
            retryable: false,
        }
    }

    /// Whether a bounded retry with backoff may succeed.
    ///
    /// Timeouts are treated as transient; cancellation and protocol
    /// violations never retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Generation { retryable, .. } => *retryable,
            Self::Timeout { .. } => true,
            Self::ProtocolViolation(_) | Self::Cancelled => false,
        }
    }
}
