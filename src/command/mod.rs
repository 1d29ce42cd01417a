//! Command surface exposed to the dispatch layer.
//!
//! # Data Flow
//! ```text
//! dispatch layer (dispatch.rs, raw byte arguments)
//!     → config_cmd.rs (sub-command routing, validation)
//!     → wildcard.rs (GET key patterns)
//!     → config::store (snapshot reads, transactional updates)
//!     → reply.rs (array / status / error reply)
//! ```

pub mod config_cmd;
pub mod dispatch;
pub mod reply;
pub mod wildcard;

pub use config_cmd::{CommandError, ConfigCommand};
pub use dispatch::dispatch_line;
pub use reply::Reply;
pub use wildcard::{Pattern, PatternError};
