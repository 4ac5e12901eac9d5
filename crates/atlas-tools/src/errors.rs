//! Tool execution errors.
//!
//! User-input problems never surface here — tools report those as plain
//! result text so the model can ask the user to correct themselves. A
//! `ToolError` means the tool infrastructure itself failed.

use thiserror::Error;

/// Failure of a tool's execution machinery.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments did not satisfy the declared schema.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool's backing service failed.
    #[error("tool backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
        /// Whether the executor considers this transient.
        retryable: bool,
    },

    /// Unexpected internal failure.
    #[error("internal tool error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Whether a bounded retry may succeed. Bad arguments never retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend { retryable: true, .. })
    }
}
