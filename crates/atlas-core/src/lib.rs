//! # atlas-core
//!
//! Foundation types and utilities shared by all Atlas crates:
//!
//! - **Messages**: [`messages::Message`] — the conversation history vocabulary
//!   (`User`, `Assistant`, `ToolCall`, `ToolResult`)
//! - **Events**: [`events::ChatEvent`] — the outbound event stream emitted
//!   while a turn runs, with tool call/result metadata
//! - **Errors**: [`errors::EngineError`] taxonomy via `thiserror`, with a
//!   retryable flag on backend failures
//! - **Retry**: [`retry::RetryConfig`] and bounded exponential backoff
//! - **Text**: [`text`] UTF-8-safe truncation and result summarization
//! - **Tools**: [`tools::ToolDefinition`] — declared argument schemas
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other atlas crates.

#![deny(unsafe_code)]

pub mod errors;
pub mod events;
pub mod messages;
pub mod retry;
pub mod text;
pub mod tools;
