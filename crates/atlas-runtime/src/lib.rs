//! # atlas-runtime
//!
//! The orchestration layer: the [`session::SessionStore`] holding
//! per-conversation transcripts, and the [`engine::TurnEngine`] state
//! machine that turns one user message into a stream of
//! [`atlas_core::events::ChatEvent`]s.

#![deny(unsafe_code)]

pub mod engine;
pub mod session;

pub use engine::{EngineConfig, TurnEngine};
pub use session::{Session, SessionStore};
