//! Scripted generation client for tests.
//!
//! Plays back queued delta scripts, one script per `stream` call, and
//! records every message list it was invoked with so tests can assert on
//! history continuity.

use std::collections::VecDeque;

use parking_lot::Mutex;

use atlas_core::errors::EngineError;
use atlas_core::messages::Message;
use atlas_core::tools::ToolDefinition;

use crate::client::{DeltaStream, GenerationClient, GenerationDelta};

/// One queued response: the items the stream will yield, in order.
type Script = Vec<Result<GenerationDelta, EngineError>>;

/// A [`GenerationClient`] that replays queued scripts.
#[derive(Default)]
pub struct ScriptedClient {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedClient {
    /// Create an empty scripted client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response that yields these deltas then completes.
    pub fn enqueue(&self, deltas: Vec<GenerationDelta>) {
        self.scripts
            .lock()
            .push_back(deltas.into_iter().map(Ok).collect());
    }

    /// Queue content fragments as a convenience.
    pub fn enqueue_content(&self, chunks: &[&str]) {
        self.enqueue(
            chunks
                .iter()
                .map(|c| GenerationDelta::Content((*c).to_owned()))
                .collect(),
        );
    }

    /// Queue a response with explicit per-item outcomes (for mid-stream
    /// failures).
    pub fn enqueue_outcomes(&self, items: Script) {
        self.scripts.lock().push_back(items);
    }

    /// Message lists passed to `stream`, in call order.
    #[must_use]
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().clone()
    }

    /// Number of `stream` calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait::async_trait]
impl GenerationClient for ScriptedClient {
    async fn stream(
        &self,
        messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<DeltaStream, EngineError> {
        self.requests.lock().push(messages.to_vec());
        let script = self
            .scripts
            .lock()
            .pop_front()
            .ok_or_else(|| EngineError::fatal("scripted client exhausted"))?;
        Ok(Box::pin(futures::stream::iter(script)))
    }
}
