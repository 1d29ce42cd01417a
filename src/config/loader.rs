//! Configuration loading from disk.
//!
//! The config file is line oriented: one `<directive> <value>` pair per line,
//! `#` starts a comment line, blank lines are ignored. Values are coerced
//! through the field registry, so the accepted directives are exactly the
//! canonical keys of the record type.

use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::config::registry::{CoerceError, Properties, Registry};
use crate::config::schema::ServerProperties;

const RUN_ID_LEN: usize = 40;

/// Error type for configuration loading.
///
/// Any of these is fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read config source: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: invalid value '{value}' for '{directive}': {source}")]
    InvalidValue {
        line: usize,
        directive: String,
        value: String,
        #[source]
        source: CoerceError,
    },
}

/// Parse config lines into a `ServerProperties`, layered over the defaults.
pub fn parse<R: BufRead>(reader: R) -> Result<ServerProperties, ConfigError> {
    parse_with(&Registry::new(), reader)
}

/// Parse config lines into any registered record type.
///
/// Unknown directives are skipped so newer config files still load.
pub fn parse_with<T, R>(registry: &Registry<T>, reader: R) -> Result<T, ConfigError>
where
    T: Properties + Default,
    R: BufRead,
{
    let mut record = T::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (name, value) = match trimmed.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (trimmed, ""),
        };
        let directive = name.to_ascii_lowercase();

        let Some(field) = registry.get(&directive) else {
            tracing::debug!(line = line_no, directive = %directive, "Ignoring unknown directive");
            continue;
        };

        if value.is_empty() {
            tracing::warn!(line = line_no, directive = %directive, "Directive has no value, skipping");
            continue;
        }

        field
            .assign(&mut record, value)
            .map_err(|source| ConfigError::InvalidValue {
                line: line_no,
                directive: directive.clone(),
                value: value.to_string(),
                source,
            })?;
    }

    Ok(record)
}

/// Load configuration from a file.
///
/// A missing file is not an error: the server starts on defaults. A file that
/// exists but cannot be read or parsed is.
pub fn load_config(path: &Path) -> Result<ServerProperties, ConfigError> {
    let mut properties = match File::open(path) {
        Ok(file) => parse(BufReader::new(file)).map_err(|e| match e {
            ConfigError::Io(source) => ConfigError::Read {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = ?path, "Config file not found, using defaults");
            ServerProperties::default()
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if properties.run_id.is_empty() {
        properties.run_id = generate_run_id();
    }
    properties.config_path = Some(absolute_path(path));

    Ok(properties)
}

/// Random 40 character hex identifier for this process run.
pub fn generate_run_id() -> String {
    let mut id = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    id.truncate(RUN_ID_LEN);
    id
}

fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
