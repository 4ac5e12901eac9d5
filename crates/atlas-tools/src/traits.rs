//! The tool trait.

use async_trait::async_trait;
use serde_json::Value;

use atlas_core::tools::ToolDefinition;

use crate::errors::ToolError;

/// An executable capability the generation backend can invoke mid-turn.
///
/// Contract: `execute` always returns formatted text for the model to
/// read. Problems the *user* can fix (bad airport code, malformed date)
/// are reported inside that text with `Ok`; `Err` is reserved for
/// infrastructure failures the model cannot do anything about.
#[async_trait]
pub trait ChatTool: Send + Sync {
    /// Registered name, matched against tool-call requests.
    fn name(&self) -> &str;

    /// Declared contract surfaced to the generation backend.
    fn definition(&self) -> ToolDefinition;

    /// Run the tool with validated arguments.
    async fn execute(&self, args: Value) -> Result<String, ToolError>;
}
