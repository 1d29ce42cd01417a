//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and parse the config file
//! - Seed the properties store with the startup record
//! - Hand out the shared store and the `CONFIG` executor
//!
//! # Design Decisions
//! - Fail fast: any parse error is fatal
//! - Subsystems receive the store handle, never a copied record

use std::path::Path;
use std::sync::Arc;

use crate::command::ConfigCommand;
use crate::config::{load_config, ConfigError, PropertiesStore, Registry, ServerProperties};

/// Shared handles created at startup.
#[derive(Clone)]
pub struct Runtime {
    pub store: Arc<PropertiesStore<ServerProperties>>,
    pub config: ConfigCommand<ServerProperties>,
}

impl Runtime {
    /// Build the runtime around an already loaded record.
    pub fn new(properties: ServerProperties) -> Self {
        let store = Arc::new(PropertiesStore::new(Arc::new(Registry::new()), properties));
        let config = ConfigCommand::new(store.clone());
        Self { store, config }
    }
}

/// Load `path` and build the runtime from it.
pub fn bootstrap(path: &Path) -> Result<Runtime, ConfigError> {
    let properties = load_config(path)?;

    tracing::info!(
        path = ?path,
        run_id = %properties.run_id,
        bind = %properties.bind,
        port = properties.port,
        max_clients = properties.max_clients,
        "Configuration loaded"
    );

    Ok(Runtime::new(properties))
}
