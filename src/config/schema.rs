//! Server properties schema.
//!
//! This module declares every startup setting of the server together with its
//! compiled-in default, canonical key and runtime mutability. The
//! `server_properties!` macro expands one declaration into the record struct,
//! its `Default` impl and the static field table consumed by `Registry`.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::registry::{CoerceError, Properties, PropertyField, PropertyType};

macro_rules! server_properties {
    (@mutable mutable) => { true };
    (@mutable immutable) => { false };
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            keyed {
                $(
                    $(#[$fmeta:meta])*
                    $field:ident: $ty:ty = $default:expr => ($key:literal, $access:ident),
                )*
            }
            internal {
                $(
                    $(#[$imeta:meta])*
                    $ifield:ident: $ity:ty = $idefault:expr,
                )*
            }
        }
    ) => {
        $(#[$meta])*
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $ty, )*
            $( $(#[$imeta])* pub $ifield: $ity, )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $( $field: $default, )*
                    $( $ifield: $idefault, )*
                }
            }
        }

        impl Properties for $name {
            fn fields() -> &'static [PropertyField<Self>] {
                static FIELDS: &[PropertyField<$name>] = &[
                    $(
                        PropertyField::new(
                            $key,
                            <$ty as PropertyType>::KIND,
                            server_properties!(@mutable $access),
                            |record: &$name| PropertyType::render(&record.$field),
                            |record: &mut $name, raw: &str| -> Result<(), CoerceError> {
                                record.$field = <$ty as PropertyType>::coerce(raw)?;
                                Ok(())
                            },
                        ),
                    )*
                ];
                FIELDS
            }
        }
    };
}

server_properties! {
    /// Live settings of the server process.
    ///
    /// Created once at startup and replaced wholesale on `CONFIG SET`; never
    /// mutated in place while shared.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct ServerProperties {
        keyed {
            /// Random identifier of this process run.
            run_id: String = String::new() => ("runid", immutable),
            /// Interface to bind (e.g., "0.0.0.0").
            bind: String = "0.0.0.0".to_string() => ("bind", immutable),
            port: i64 = 6399 => ("port", immutable),
            /// Working directory for data files.
            dir: String = ".".to_string() => ("dir", immutable),
            announce_host: String = String::new() => ("announce-host", immutable),

            /// Enable the append-only file.
            append_only: bool = false => ("appendonly", immutable),
            append_filename: String = "appendonly.aof".to_string() => ("appendfilename", immutable),
            /// AOF fsync policy: always, everysec or no.
            append_fsync: String = "everysec".to_string() => ("appendfsync", mutable),
            aof_use_rdb_preamble: bool = false => ("aof-use-rdb-preamble", immutable),

            /// Maximum concurrent client connections.
            max_clients: i64 = 128 => ("maxclients", mutable),
            require_pass: String = String::new() => ("requirepass", mutable),
            databases: i64 = 16 => ("databases", immutable),
            rdb_filename: String = "dump.rdb".to_string() => ("dbfilename", immutable),
            /// Snapshot schedule, e.g. "3600 1 300 100".
            save: String = String::new() => ("save", immutable),

            master_auth: String = String::new() => ("masterauth", mutable),
            slave_announce_port: i64 = 0 => ("slave-announce-port", mutable),
            slave_announce_ip: String = String::new() => ("slave-announce-ip", mutable),
            /// Replication timeout in seconds.
            repl_timeout: i64 = 60 => ("repl-timeout", mutable),

            cluster_enable: bool = false => ("cluster-enable", immutable),
            cluster_as_seed: bool = false => ("cluster-as-seed", immutable),
            cluster_seed: String = String::new() => ("cluster-seed", immutable),
            cluster_config_file: String = "cluster.conf".to_string() => ("cluster-config-file", immutable),
            /// Peer addresses, comma separated in the config file.
            peers: Vec<String> = Vec::new() => ("peers", immutable),
            /// This node's own address in the cluster.
            #[serde(rename = "self")]
            self_addr: String = String::new() => ("self", immutable),
        }
        internal {
            /// Absolute path of the file the record was loaded from.
            config_path: Option<PathBuf> = None,
        }
    }
}
