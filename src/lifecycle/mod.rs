//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config file → Seed properties store → Build CONFIG executor
//! ```
//!
//! # Design Decisions
//! - Fail fast: a malformed config file stops the process
//! - The store exists before anything that reads settings is created

pub mod startup;

pub use startup::{bootstrap, Runtime};
