//! Concurrent GET/SET behaviour against one store.

use std::sync::Arc;
use std::thread;

use server_properties::{Runtime, ServerProperties};

mod common;

use common::{config, pairs};

fn runtime() -> Runtime {
    Runtime::new(ServerProperties {
        max_clients: 0,
        repl_timeout: 0,
        ..Default::default()
    })
}

#[test]
fn test_concurrent_gets_see_whole_generations() {
    let runtime = Arc::new(runtime());

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let runtime = runtime.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let got = pairs(&config(&runtime, &["GET", "maxclients", "repl-timeout"]));
                    assert_eq!(got.len(), 2);
                    // Both keys are always set together, so they must agree.
                    assert_eq!(got[0].1, got[1].1, "torn read: {:?}", got);
                }
            })
        })
        .collect();

    for i in 1..=200 {
        let value = i.to_string();
        let reply = config(&runtime, &["SET", "maxclients", value.as_str(), "repl-timeout", value.as_str()]);
        assert!(!reply.is_error());
    }

    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(&runtime.store.snapshot()["maxclients"], "200");
}

#[test]
fn test_concurrent_sets_are_serialized() {
    let runtime = Arc::new(runtime());

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let runtime = runtime.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    let value = (w * 1000 + i).to_string();
                    let reply = config(&runtime, &["SET", "maxclients", value.as_str()]);
                    assert!(!reply.is_error());
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }

    // One generation per accepted SET, none lost.
    assert_eq!(runtime.store.version(), 1 + 4 * 50);
}

#[tokio::test]
async fn test_async_workers_share_the_store() {
    let runtime = Arc::new(runtime());

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let runtime = runtime.clone();
            tokio::spawn(async move {
                for _ in 0..50 {
                    let props = runtime.store.current();
                    assert_eq!(props.max_clients, props.repl_timeout);
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    for i in 1..=20 {
        let value = i.to_string();
        config(&runtime, &["SET", "repl-timeout", value.as_str(), "maxclients", value.as_str()]);
        tokio::task::yield_now().await;
    }

    for task in tasks {
        task.await.unwrap();
    }
}
