//! # atlas-tools
//!
//! The tool side of the system: the [`traits::ChatTool`] trait, the
//! [`registry::ToolRegistry`] that dispatches by name, schema and
//! argument-validation helpers, and the flight-search domain
//! ([`flight`]) with its mock backend.

#![deny(unsafe_code)]

pub mod errors;
pub mod flight;
pub mod registry;
pub mod schema;
pub mod traits;
pub mod validation;

pub use errors::ToolError;
pub use registry::ToolRegistry;
pub use traits::ChatTool;
