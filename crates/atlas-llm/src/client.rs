//! Generation client contract.
//!
//! A client turns an ordered message list (plus the tool contracts it may
//! call) into an asynchronous sequence of [`GenerationDelta`]s. The
//! sequence ends when generation completes for that call; the turn engine
//! decides what each delta means for the turn's state machine.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use atlas_core::errors::EngineError;
use atlas_core::messages::{Message, ToolInvocation};
use atlas_core::tools::ToolDefinition;

/// One incremental unit of generation output.
#[derive(Clone, Debug, PartialEq)]
pub enum GenerationDelta {
    /// A fragment of assistant text.
    Content(String),
    /// A fully constructed tool-call request.
    ToolCall(ToolInvocation),
}

/// Boxed stream of deltas for one generation call.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<GenerationDelta, EngineError>> + Send>>;

/// A backend that streams generation deltas for a message list.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Start one generation call over `messages`, offering `tools`.
    ///
    /// Errors returned here (as opposed to mid-stream) happened before
    /// any delta was produced — typically connection or request failures.
    async fn stream(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<DeltaStream, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_delta_equality() {
        assert_eq!(
            GenerationDelta::Content("hi".into()),
            GenerationDelta::Content("hi".into())
        );
        assert_ne!(
            GenerationDelta::Content("hi".into()),
            GenerationDelta::Content("ho".into())
        );
    }

    #[test]
    fn tool_call_delta_carries_invocation() {
        let inv = ToolInvocation::new("search_flights", serde_json::Map::new());
        let delta = GenerationDelta::ToolCall(inv.clone());
        match delta {
            GenerationDelta::ToolCall(got) => assert_eq!(got, inv),
            GenerationDelta::Content(_) => panic!("wrong variant"),
        }
    }
}
