//! Typed, introspectable server configuration.
//!
//! Loads startup settings from a directive-per-line file into
//! `ServerProperties`, keeps the live record in a lock-free swappable store
//! and serves the `CONFIG GET` / `CONFIG SET` command surface over it.

pub mod command;
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use command::{ConfigCommand, Reply};
pub use config::{PropertiesStore, ServerProperties};
pub use lifecycle::Runtime;
