//! End-to-end tests of the Zenoh-backed store.
//!
//! These tests run a `ZenohStore` and a `StoreHost` on one local session.
//!
//! Note: Zenoh requires multi-thread tokio runtime.
//! Each test uses a unique key prefix to avoid interference.

use std::sync::Arc;
use std::time::Duration;

use gaugelink_common::{
    Format, Reading, Snapshot, Store, StoreConfig, StoreHost, StorePath, Watch, ZenohStore,
};

/// Generate a unique test prefix to avoid test interference.
fn unique_prefix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test_{}", nanos)
}

fn store_config(prefix: &str, format: Format) -> StoreConfig {
    StoreConfig {
        key_prefix: prefix.to_string(),
        format,
        query_timeout_ms: 500,
    }
}

async fn open_session() -> Arc<zenoh::Session> {
    Arc::new(
        zenoh::open(zenoh::Config::default())
            .await
            .expect("Failed to open Zenoh session"),
    )
}

async fn next(watch: &mut Watch) -> Snapshot {
    tokio::time::timeout(Duration::from_secs(5), watch.next())
        .await
        .expect("Timeout waiting for notification")
        .expect("Watch ended unexpectedly")
}

/// A watch on a hosted key sees the current value first, then changes.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_watch_hosted_value() {
    let prefix = unique_prefix();
    let session = open_session().await;
    let host = StoreHost::start(session.clone(), &prefix)
        .await
        .expect("Failed to start host");
    let store = ZenohStore::new(session.clone(), store_config(&prefix, Format::Json)).unwrap();

    let temp = StorePath::new("Current Temperature").unwrap();
    store.set(&temp, &Reading::Number(21.5)).await.unwrap();

    // Give the host time to retain the value
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(host.contains(&temp));

    let mut watch = store.watch(&temp).await.unwrap();
    let first = next(&mut watch).await;
    assert_eq!(first.value, Some(Reading::Number(21.5)));

    store.set(&temp, &Reading::Number(22.0)).await.unwrap();
    let second = next(&mut watch).await;
    assert_eq!(second.value, Some(Reading::Number(22.0)));

    watch.cancel();
    host.stop();
    session.close().await.expect("Failed to close session");
}

/// Without a host the first notification reports no value.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_watch_without_host_starts_empty() {
    let prefix = unique_prefix();
    let session = open_session().await;
    let store = ZenohStore::new(session.clone(), store_config(&prefix, Format::Json)).unwrap();

    let heading = StorePath::new("Heading").unwrap();
    let mut watch = store.watch(&heading).await.unwrap();

    let first = next(&mut watch).await;
    assert!(!first.exists());

    store.set(&heading, &Reading::from("North")).await.unwrap();
    let second = next(&mut watch).await;
    assert_eq!(second.value, Some(Reading::from("North")));

    session.close().await.expect("Failed to close session");
}

/// Pushed records land under the parent path with their id.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_push_is_retrievable() {
    let prefix = unique_prefix();
    let session = open_session().await;
    let host = StoreHost::start(session.clone(), &prefix).await.unwrap();
    let store = ZenohStore::new(session.clone(), store_config(&prefix, Format::Cbor)).unwrap();

    let root = StorePath::root();
    let id = store.push(&root, &Reading::from("hello")).await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;

    let child = root.child(&id).unwrap();
    assert!(host.contains(&child));

    let record = store.get(&child).await.unwrap().expect("record should exist");
    assert_eq!(record.value, Reading::from("hello"));

    host.stop();
    session.close().await.expect("Failed to close session");
}

/// Removing a value notifies watchers with an empty snapshot.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_remove_notifies_watchers() {
    let prefix = unique_prefix();
    let session = open_session().await;
    let store = ZenohStore::new(session.clone(), store_config(&prefix, Format::Json)).unwrap();

    let heading = StorePath::new("Heading").unwrap();
    let mut watch = store.watch(&heading).await.unwrap();
    let _ = next(&mut watch).await;

    store.set(&heading, &Reading::from("East")).await.unwrap();
    assert!(next(&mut watch).await.exists());

    store.remove(&heading).await.unwrap();
    assert!(!next(&mut watch).await.exists());

    session.close().await.expect("Failed to close session");
}
