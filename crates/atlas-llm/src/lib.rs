//! # atlas-llm
//!
//! The generation backend seam: the [`client::GenerationClient`] trait the
//! turn engine consumes, the [`openai::OpenAiChatClient`] adapter for
//! OpenAI-compatible `/v1/chat/completions` streaming endpoints (Ollama
//! serves one), and the [`script::ScriptedClient`] test double.

#![deny(unsafe_code)]

pub mod client;
pub mod openai;
pub mod script;

pub use client::{DeltaStream, GenerationClient, GenerationDelta};
pub use openai::{OpenAiChatClient, OpenAiConfig};
