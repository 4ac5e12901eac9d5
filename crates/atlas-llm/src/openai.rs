//! OpenAI-compatible chat-completions client.
//!
//! Streams from `{base_url}/v1/chat/completions` with `stream: true`.
//! Ollama, vLLM, and most local inference servers expose this surface, so
//! one adapter covers the lot. Tool-call arguments arrive as JSON string
//! fragments spread over several chunks; they are accumulated here and
//! surfaced as a single fully-constructed [`GenerationDelta::ToolCall`].

use async_stream::stream;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, instrument};

use atlas_core::errors::EngineError;
use atlas_core::messages::{Message, ToolInvocation, new_call_id};
use atlas_core::tools::{ToolDefinition, ToolParameterSchema};

use crate::client::{DeltaStream, GenerationClient, GenerationDelta};

/// SSE terminator sentinel used by OpenAI-compatible servers.
const DONE_SENTINEL: &str = "[DONE]";

/// Configuration for [`OpenAiChatClient`].
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// Server base URL, e.g. `http://localhost:11434`.
    pub base_url: String,
    /// Model name passed through to the server.
    pub model: String,
    /// Optional bearer token (local servers usually need none).
    pub api_key: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// System prompt prepended to every request.
    pub system_prompt: Option<String>,
}

impl OpenAiConfig {
    /// Config for a local Ollama server with the given model.
    #[must_use]
    pub fn local(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
            temperature: 0.7,
            system_prompt: None,
        }
    }
}

/// Generation client for OpenAI-compatible streaming endpoints.
pub struct OpenAiChatClient {
    config: OpenAiConfig,
    http: reqwest::Client,
}

impl OpenAiChatClient {
    /// Create a client with its own HTTP connection pool.
    #[must_use]
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Create a client sharing an existing HTTP connection pool.
    #[must_use]
    pub fn with_http(config: OpenAiConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    fn build_request(&self, messages: &[Message], tools: &[ToolDefinition]) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: convert_messages(self.config.system_prompt.as_deref(), messages),
            stream: true,
            temperature: self.config.temperature,
            tools: build_tools(tools),
        }
    }

    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn stream_internal(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<DeltaStream, EngineError> {
        let request = self.build_request(messages, tools);
        let url = format!("{}/v1/chat/completions", self.config.base_url);

        debug!(
            message_count = request.messages.len(),
            has_tools = request.tools.is_some(),
            "sending chat completion request"
        );
        counter!("generation_requests_total", "model" => self.config.model.clone())
            .increment(1);

        let mut builder = self.http.post(&url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            // Connection-level failures are transient by assumption.
            EngineError::transient(format!("request to generation backend failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = parse_error_message(&body)
                .unwrap_or_else(|| format!("HTTP {status}: {}", atlas_core::text::truncate_str(&body, 200)));
            let retryable = status.as_u16() == 429 || status.is_server_error();
            error!(status = status.as_u16(), retryable, "generation backend error");
            counter!("generation_errors_total", "model" => self.config.model.clone())
                .increment(1);
            return Err(EngineError::Generation { message, retryable });
        }

        let mut events = response.bytes_stream().eventsource();
        let deltas = stream! {
            let mut pending: Option<PendingToolCall> = None;
            while let Some(event) = events.next().await {
                let event = match event {
                    Ok(event) => event,
                    Err(e) => {
                        yield Err(EngineError::transient(format!("stream interrupted: {e}")));
                        return;
                    }
                };
                if event.data.trim() == DONE_SENTINEL {
                    break;
                }
                let chunk: ChatChunk = match serde_json::from_str(&event.data) {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(EngineError::fatal(format!("malformed stream chunk: {e}")));
                        return;
                    }
                };
                let Some(choice) = chunk.choices.into_iter().next() else {
                    continue;
                };
                if let Some(content) = choice.delta.content
                    && !content.is_empty()
                {
                    yield Ok(GenerationDelta::Content(content));
                }
                if let Some(fragments) = choice.delta.tool_calls {
                    for fragment in fragments {
                        // One call per turn; a second slot would otherwise
                        // interleave its argument fragments into the first.
                        if fragment.index > 0 {
                            yield Err(EngineError::fatal(
                                "backend emitted parallel tool calls, which are unsupported",
                            ));
                            return;
                        }
                        pending.get_or_insert_default().merge(fragment);
                    }
                }
                if choice.finish_reason.as_deref() == Some("tool_calls")
                    && let Some(call) = pending.take()
                {
                    yield call.finish();
                }
            }
            // Some servers end the stream without a tool_calls finish marker.
            if let Some(call) = pending.take() {
                yield call.finish();
            }
        };
        Ok(Box::pin(deltas))
    }
}

#[async_trait::async_trait]
impl GenerationClient for OpenAiChatClient {
    async fn stream(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<DeltaStream, EngineError> {
        self.stream_internal(messages, tools).await
    }
}

/// Convert history messages to the wire format.
///
/// `ToolCall` becomes an assistant message carrying `tool_calls`;
/// `ToolResult` becomes a `role: "tool"` message bound by `tool_call_id`.
fn convert_messages(system_prompt: Option<&str>, messages: &[Message]) -> Vec<WireMessage> {
    let mut wire = Vec::with_capacity(messages.len() + 1);
    if let Some(prompt) = system_prompt {
        wire.push(WireMessage {
            role: "system",
            content: Some(prompt.to_owned()),
            tool_calls: None,
            tool_call_id: None,
        });
    }
    for message in messages {
        wire.push(match message {
            Message::User { text } => WireMessage {
                role: "user",
                content: Some(text.clone()),
                tool_calls: None,
                tool_call_id: None,
            },
            Message::Assistant { text } => WireMessage {
                role: "assistant",
                content: Some(text.clone()),
                tool_calls: None,
                tool_call_id: None,
            },
            Message::ToolCall { call } => WireMessage {
                role: "assistant",
                content: None,
                tool_calls: Some(vec![WireToolCall {
                    id: call.call_id.clone(),
                    kind: "function",
                    function: WireFunctionCall {
                        name: call.tool_name.clone(),
                        arguments: Value::Object(call.arguments.clone()).to_string(),
                    },
                }]),
                tool_call_id: None,
            },
            Message::ToolResult { call_id, text, .. } => WireMessage {
                role: "tool",
                content: Some(text.clone()),
                tool_calls: None,
                tool_call_id: Some(call_id.clone()),
            },
        });
    }
    wire
}

fn build_tools(tools: &[ToolDefinition]) -> Option<Vec<WireTool>> {
    if tools.is_empty() {
        return None;
    }
    Some(
        tools
            .iter()
            .map(|t| WireTool {
                kind: "function",
                function: WireToolDef {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect(),
    )
}

/// Best-effort extraction of `error.message` from an error body.
fn parse_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_owned)
}

/// Tool call under construction from streamed fragments.
#[derive(Default)]
struct PendingToolCall {
    id: Option<String>,
    name: String,
    arguments: String,
}

impl PendingToolCall {
    fn merge(&mut self, fragment: ToolCallFragment) {
        if let Some(id) = fragment.id
            && !id.is_empty()
        {
            self.id = Some(id);
        }
        if let Some(function) = fragment.function {
            if let Some(name) = function.name
                && !name.is_empty()
            {
                self.name = name;
            }
            if let Some(arguments) = function.arguments {
                self.arguments.push_str(&arguments);
            }
        }
    }

    fn finish(self) -> Result<GenerationDelta, EngineError> {
        if self.name.is_empty() {
            return Err(EngineError::fatal("tool call stream carried no tool name"));
        }
        let arguments: Map<String, Value> = if self.arguments.trim().is_empty() {
            Map::new()
        } else {
            match serde_json::from_str(&self.arguments) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    return Err(EngineError::fatal(format!(
                        "tool call arguments for {} are not a JSON object",
                        self.name
                    )));
                }
                Err(e) => {
                    return Err(EngineError::fatal(format!(
                        "tool call arguments for {} are malformed JSON: {e}",
                        self.name
                    )));
                }
            }
        };
        Ok(GenerationDelta::ToolCall(ToolInvocation {
            call_id: self.id.unwrap_or_else(new_call_id),
            tool_name: self.name,
            arguments,
        }))
    }
}

// ── Wire types ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunctionCall,
}

#[derive(Serialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireToolDef,
}

#[derive(Serialize)]
struct WireToolDef {
    name: String,
    description: String,
    parameters: ToolParameterSchema,
}

#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallFragment>>,
}

#[derive(Deserialize)]
struct ToolCallFragment {
    #[serde(default)]
    index: u32,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<FunctionFragment>,
}

#[derive(Default, Deserialize)]
struct FunctionFragment {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}
