//! `CONFIG` command executor.
//!
//! # Sub-commands
//! - *(none)*: every setting as a flat `[key, value, ...]` array
//! - `GET pattern [pattern ...]`: settings whose key matches, per pattern
//! - `SET key value [key value ...]`: all-or-nothing update of mutable settings
//! - `RESETSTAT`, `REWRITE`: reserved, answered with an unknown-subcommand error
//!
//! # Design Decisions
//! - GET reads one snapshot for the whole call and never takes a lock
//! - GET does not deduplicate: a key matched by two patterns is listed twice
//! - SET validates on a candidate copy inside `PropertiesStore::update`, so a
//!   single bad pair leaves the live record untouched

use std::borrow::Cow;
use std::sync::Arc;

use thiserror::Error;

use crate::command::reply::Reply;
use crate::command::wildcard::{Pattern, PatternError};
use crate::config::registry::{CoerceError, Properties};
use crate::config::store::PropertiesStore;

/// Errors reported to the client of a `CONFIG` command.
///
/// The display text is the exact error reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("ERR Unknown subcommand or wrong number of arguments for '{0}'")]
    UnknownSubcommand(String),

    #[error("ERR wrong number of arguments for 'config|{0}' command")]
    WrongArity(&'static str),

    #[error("ERR invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: PatternError,
    },

    #[error("ERR CONFIG SET failed (possibly related to argument '{0}') - duplicate parameter")]
    DuplicateParameter(String),

    #[error("ERR Unknown option or number of arguments for CONFIG SET - '{0}'")]
    UnknownOption(String),

    #[error("ERR CONFIG SET failed (possibly related to argument '{0}') - can't set immutable config")]
    Immutable(String),

    #[error("ERR CONFIG SET failed (possibly related to argument '{0}') - argument is not valid UTF-8")]
    NotUtf8(String),

    #[error("ERR CONFIG SET failed (possibly related to argument '{key}') - {source}")]
    InvalidValue {
        key: String,
        #[source]
        source: CoerceError,
    },
}

impl From<CommandError> for Reply {
    fn from(err: CommandError) -> Self {
        Reply::Error(err.to_string())
    }
}

/// Executes `CONFIG` sub-commands against a properties store.
pub struct ConfigCommand<T: Properties> {
    store: Arc<PropertiesStore<T>>,
}

impl<T: Properties> Clone for ConfigCommand<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T: Properties> ConfigCommand<T> {
    pub fn new(store: Arc<PropertiesStore<T>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<PropertiesStore<T>> {
        &self.store
    }

    /// Run one `CONFIG` invocation.
    ///
    /// `args` holds the sub-command name followed by its arguments, as raw
    /// bytes from the dispatch layer.
    pub fn execute<A: AsRef<[u8]>>(&self, args: &[A]) -> Reply {
        let Some((sub, rest)) = args.split_first() else {
            return self.get_all();
        };

        let sub = text(sub).to_ascii_uppercase();
        tracing::debug!(subcommand = %sub, args = rest.len(), "CONFIG");

        let result = match sub.as_str() {
            "GET" => self.get(rest),
            "SET" => self.set(rest),
            // RESETSTAT and REWRITE are reserved names without behavior yet.
            _ => Err(CommandError::UnknownSubcommand(sub)),
        };

        result.unwrap_or_else(|err| {
            tracing::debug!(error = %err, "CONFIG command rejected");
            err.into()
        })
    }

    fn get_all(&self) -> Reply {
        let snapshot = self.store.snapshot();
        let items = snapshot
            .iter()
            .flat_map(|(key, value)| [key.as_bytes().to_vec(), value.as_bytes().to_vec()])
            .collect();
        Reply::MultiBulk(items)
    }

    fn get<A: AsRef<[u8]>>(&self, args: &[A]) -> Result<Reply, CommandError> {
        if args.is_empty() {
            return Err(CommandError::WrongArity("get"));
        }

        // Compile everything first so a bad pattern yields no partial reply.
        let patterns = args
            .iter()
            .map(|arg| {
                let raw = text(arg);
                Pattern::new_nocase(&raw).map_err(|source| CommandError::InvalidPattern {
                    pattern: raw.into_owned(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let snapshot = self.store.snapshot();
        let mut items = Vec::new();
        for pattern in &patterns {
            for (key, value) in snapshot.iter().filter(|(key, _)| pattern.is_match(key)) {
                items.push(key.as_bytes().to_vec());
                items.push(value.as_bytes().to_vec());
            }
        }

        Ok(Reply::MultiBulk(items))
    }

    fn set<A: AsRef<[u8]>>(&self, args: &[A]) -> Result<Reply, CommandError> {
        if args.is_empty() || args.len() % 2 != 0 {
            return Err(CommandError::WrongArity("set"));
        }

        // Keys that are not UTF-8 never resolve, so a lossy name is enough for
        // the error. Values are decoded strictly once the key is known.
        let mut pending: Vec<(String, &[u8])> = Vec::with_capacity(args.len() / 2);
        for pair in args.chunks_exact(2) {
            let key = text(&pair[0]).to_ascii_lowercase();
            if pending.iter().any(|(seen, _)| *seen == key) {
                return Err(CommandError::DuplicateParameter(key));
            }
            pending.push((key, pair[1].as_ref()));
        }

        let registry = self.store.registry().clone();
        let generation = self.store.update(|candidate| {
            for (key, value) in &pending {
                let field = registry
                    .get(key)
                    .ok_or_else(|| CommandError::UnknownOption(key.clone()))?;
                if !field.mutable {
                    return Err(CommandError::Immutable(key.clone()));
                }
                let value = std::str::from_utf8(value)
                    .map_err(|_| CommandError::NotUtf8(key.clone()))?;
                field
                    .assign(candidate, value)
                    .map_err(|source| CommandError::InvalidValue {
                        key: key.clone(),
                        source,
                    })?;
            }
            Ok(())
        })?;

        let keys: Vec<&str> = pending.iter().map(|(key, _)| key.as_str()).collect();
        tracing::info!(version = generation.version, keys = ?keys, "CONFIG SET applied");
        Ok(Reply::ok())
    }
}

fn text<A: AsRef<[u8]>>(arg: &A) -> Cow<'_, str> {
    String::from_utf8_lossy(arg.as_ref())
}
