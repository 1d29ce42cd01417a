//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! loader / store / command executor
//!     → tracing events with structured fields
//!     → logging.rs subscriber (stderr)
//! ```

pub mod logging;
