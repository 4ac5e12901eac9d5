//! Request handlers, grouped by surface.

pub mod chat;
pub mod flights;
pub mod health;
