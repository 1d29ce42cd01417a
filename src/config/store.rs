//! Process-wide holder of the live properties record.
//!
//! Readers load the current generation without locking. Writers serialize on
//! a store-level mutex, build a candidate from a private copy of the current
//! record and install it with a single pointer swap, so no reader can see a
//! record with only some fields updated.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::config::registry::{Properties, PropertiesMap, Registry};

/// One installed configuration: the record and its display snapshot.
#[derive(Debug)]
pub struct Generation<T> {
    /// Starts at 1 for the startup record and grows by one per install.
    pub version: u64,
    pub properties: Arc<T>,
    pub map: Arc<PropertiesMap>,
}

pub struct PropertiesStore<T: Properties> {
    registry: Arc<Registry<T>>,
    current: ArcSwap<Generation<T>>,
    writer: Mutex<()>,
}

impl<T: Properties> PropertiesStore<T> {
    /// Seed the store with the startup record.
    pub fn new(registry: Arc<Registry<T>>, initial: T) -> Self {
        let generation = Self::build(&registry, 1, initial);
        Self {
            registry,
            current: ArcSwap::from_pointee(generation),
            writer: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &Arc<Registry<T>> {
        &self.registry
    }

    /// The active record. Re-fetch rather than holding it across long work.
    pub fn current(&self) -> Arc<T> {
        self.current.load().properties.clone()
    }

    /// The active string-keyed view.
    pub fn snapshot(&self) -> Arc<PropertiesMap> {
        self.current.load().map.clone()
    }

    /// Record, snapshot and version as one consistent unit.
    pub fn load(&self) -> Arc<Generation<T>> {
        self.current.load_full()
    }

    pub fn version(&self) -> u64 {
        self.current.load().version
    }

    /// Install `record` as the new live configuration.
    pub fn replace(&self, record: T) -> Arc<Generation<T>> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.install(record)
    }

    /// Copy the live record, let `apply` modify the copy and install it if
    /// `apply` succeeds. On error the live record is untouched.
    ///
    /// Updates are serialized, so two concurrent calls never both start from
    /// the same record.
    pub fn update<F, E>(&self, apply: F) -> Result<Arc<Generation<T>>, E>
    where
        F: FnOnce(&mut T) -> Result<(), E>,
    {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut candidate = T::clone(&self.current.load().properties);
        apply(&mut candidate)?;
        Ok(self.install(candidate))
    }

    // Caller must hold `writer`.
    fn install(&self, record: T) -> Arc<Generation<T>> {
        let version = self.current.load().version + 1;
        let generation = Arc::new(Self::build(&self.registry, version, record));
        self.current.store(generation.clone());
        tracing::info!(version, "Configuration installed");
        generation
    }

    fn build(registry: &Registry<T>, version: u64, record: T) -> Generation<T> {
        let map = registry.snapshot(&record);
        Generation {
            version,
            properties: Arc::new(record),
            map: Arc::new(map),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ServerProperties;
    use std::thread;

    fn store_with(max_clients: i64) -> PropertiesStore<ServerProperties> {
        let props = ServerProperties {
            max_clients,
            ..Default::default()
        };
        PropertiesStore::new(Arc::new(Registry::new()), props)
    }

    #[test]
    fn test_replace_swaps_record_and_snapshot() {
        let store = store_with(128);
        let old = store.current();

        let mut next = (*old).clone();
        next.max_clients = 127;
        let generation = store.replace(next);

        assert!(!Arc::ptr_eq(&old, &store.current()));
        assert_eq!(old.max_clients, 128);
        assert_eq!(generation.version, 2);
        assert_eq!(store.current().max_clients, 127);
        assert_eq!(&store.snapshot()["maxclients"], "127");
    }

    #[test]
    fn test_replace_snapshot_covers_every_field() {
        let store = store_with(128);
        let record = ServerProperties {
            run_id: "f".repeat(40),
            bind: "127.0.0.1".to_string(),
            port: 7000,
            dir: "/var/lib/data".to_string(),
            announce_host: "db.internal".to_string(),
            append_only: true,
            append_filename: "log.aof".to_string(),
            append_fsync: "always".to_string(),
            aof_use_rdb_preamble: true,
            max_clients: 10,
            require_pass: "secret".to_string(),
            databases: 4,
            rdb_filename: "snap.rdb".to_string(),
            save: "900 1".to_string(),
            master_auth: "upstream".to_string(),
            slave_announce_port: 7001,
            slave_announce_ip: "10.0.0.9".to_string(),
            repl_timeout: 5,
            cluster_enable: true,
            cluster_as_seed: true,
            cluster_seed: "10.0.0.1:7000".to_string(),
            cluster_config_file: "nodes.conf".to_string(),
            peers: vec!["10.0.0.1:7000".to_string(), "10.0.0.2:7000".to_string()],
            self_addr: "10.0.0.3:7000".to_string(),
            config_path: None,
        };
        let defaults = store.snapshot();

        store.replace(record.clone());

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), store.registry().len());
        for field in store.registry().fields() {
            let expected = field.render(&record);
            assert_eq!(snapshot[field.key], expected, "key {}", field.key);
            assert_ne!(defaults[field.key], expected, "key {} left at default", field.key);
        }
        assert_eq!(&snapshot["peers"], "10.0.0.1:7000,10.0.0.2:7000");
        assert_eq!(&snapshot["appendonly"], "yes");
        assert_eq!(&snapshot["save"], "900 1");
    }

    #[test]
    fn test_old_record_lives_until_dropped() {
        let store = store_with(1);
        let old = store.current();

        store.update(|p| {
            p.max_clients = 2;
            Ok::<_, ()>(())
        })
        .unwrap();

        assert_eq!(old.max_clients, 1);
        assert_eq!(store.current().max_clients, 2);
    }

    #[test]
    fn test_failed_update_installs_nothing() {
        let store = store_with(5);

        let result = store.update(|p| {
            p.max_clients = 99;
            Err("rejected")
        });

        assert_eq!(result.unwrap_err(), "rejected");
        assert_eq!(store.version(), 1);
        assert_eq!(store.current().max_clients, 5);
        assert_eq!(&store.snapshot()["maxclients"], "5");
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let store = Arc::new(store_with(0));

        let writers: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        store
                            .update(|p| {
                                p.max_clients += 1;
                                Ok::<_, ()>(())
                            })
                            .unwrap();
                    }
                })
            })
            .collect();

        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(store.current().max_clients, 800);
        assert_eq!(store.version(), 801);
    }

    #[test]
    fn test_readers_never_see_torn_generation() {
        let props = ServerProperties {
            max_clients: 0,
            repl_timeout: 0,
            ..Default::default()
        };
        let store = Arc::new(PropertiesStore::new(Arc::new(Registry::new()), props));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..2000 {
                        let generation = store.load();
                        let props = &generation.properties;
                        // Writers keep both fields equal; the map must agree with the record.
                        assert_eq!(props.max_clients, props.repl_timeout);
                        assert_eq!(generation.map["maxclients"], props.max_clients.to_string());
                        assert_eq!(generation.map["repl-timeout"], props.repl_timeout.to_string());
                    }
                })
            })
            .collect();

        for i in 1..200 {
            store
                .update(|p| {
                    p.max_clients = i;
                    p.repl_timeout = i;
                    Ok::<_, ()>(())
                })
                .unwrap();
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[tokio::test]
    async fn test_async_workers_see_updates() {
        let store = Arc::new(store_with(1));

        let reader = store.clone();
        let task = tokio::spawn(async move {
            for _ in 0..100 {
                assert!(reader.current().max_clients >= 1);
                tokio::task::yield_now().await;
            }
        });

        for i in 2..=3 {
            store.update(|p| {
                p.max_clients = i;
                Ok::<_, ()>(())
            })
            .unwrap();
            tokio::task::yield_now().await;
        }

        task.await.unwrap();
        assert_eq!(store.current().max_clients, 3);
    }
}
