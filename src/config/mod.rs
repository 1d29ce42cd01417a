//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (directive per line)
//!     → loader.rs (parse & coerce via registry)
//!     → ServerProperties (defaults + overrides)
//!     → store.rs (generation 1, shared via Arc)
//!
//! On CONFIG SET:
//!     command executor locks the store writer
//!     → copies the live record into a candidate
//!     → registry.rs coerces each value onto the candidate
//!     → atomic swap of Arc<Generation> (record + snapshot)
//!     → readers observe the new generation on their next load
//! ```
//!
//! # Design Decisions
//! - Records are never mutated in place once shared; changes replace them
//! - Field mapping is a static table generated from the schema, no reflection
//! - The display snapshot is rebuilt together with every install

pub mod loader;
pub mod registry;
pub mod schema;
pub mod store;

pub use loader::{load_config, parse, ConfigError};
pub use registry::{PropertiesMap, PropertyField, PropertyKind, Registry};
pub use schema::ServerProperties;
pub use store::{Generation, PropertiesStore};
