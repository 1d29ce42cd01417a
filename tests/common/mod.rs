//! Shared utilities for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use server_properties::{Reply, Runtime};

/// A config file in the temp dir, removed on drop.
#[allow(dead_code)]
pub struct TempConfig {
    path: PathBuf,
}

#[allow(dead_code)]
impl TempConfig {
    pub fn new(contents: &str) -> Self {
        let path = std::env::temp_dir().join(format!("server-properties-{}.conf", uuid::Uuid::new_v4()));
        fs::write(&path, contents).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempConfig {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Run `CONFIG <args...>` against the runtime.
pub fn config(runtime: &Runtime, args: &[&str]) -> Reply {
    runtime.config.execute(args)
}

/// Decode a flat key/value reply into pairs.
#[allow(dead_code)]
pub fn pairs(reply: &Reply) -> Vec<(String, String)> {
    match reply {
        Reply::MultiBulk(items) => items
            .chunks(2)
            .map(|kv| {
                (
                    String::from_utf8_lossy(&kv[0]).into_owned(),
                    String::from_utf8_lossy(&kv[1]).into_owned(),
                )
            })
            .collect(),
        other => panic!("expected multi bulk reply, got {:?}", other),
    }
}
