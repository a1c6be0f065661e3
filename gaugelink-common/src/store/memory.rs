use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::keyexpr::StorePath;
use crate::pushid::PushIdGenerator;
use crate::reading::{Reading, Record, Snapshot};

use super::{Store, Watch};

/// In-process store.
///
/// Every write notifies the watchers of that exact path while the store
/// lock is held, so each watcher sees every change in write order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    records: BTreeMap<StorePath, Record>,
    watchers: HashMap<StorePath, Vec<mpsc::UnboundedSender<Snapshot>>>,
    ids: PushIdGenerator,
    closed: bool,
}

impl Inner {
    fn ensure_open(&self) -> Result<()> {
        if self.closed { Err(Error::Closed) } else { Ok(()) }
    }

    fn notify(&mut self, snapshot: Snapshot) {
        if let Some(senders) = self.watchers.get_mut(&snapshot.path) {
            senders.retain(|tx| tx.send(snapshot.clone()).is_ok());
            if senders.is_empty() {
                self.watchers.remove(&snapshot.path);
            }
        }
    }

    fn write(&mut self, path: &StorePath, record: Record) {
        self.records.insert(path.clone(), record.clone());
        self.notify(Snapshot::from_record(path.clone(), record));
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("MemoryStore")
            .field("records", &inner.records.len())
            .field("watched_paths", &inner.watchers.len())
            .field("closed", &inner.closed)
            .finish()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Direct children of `path`, ordered by key.
    ///
    /// Records appended with [`Store::push`] come back in append order.
    pub fn children(&self, path: &StorePath) -> Vec<(String, Record)> {
        let inner = self.lock();
        inner
            .records
            .iter()
            .filter(|(key, _)| key.parent().as_ref() == Some(path))
            .filter_map(|(key, record)| Some((key.name()?.to_string(), record.clone())))
            .collect()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Number of live watchers on a path.
    pub fn watcher_count(&self, path: &StorePath) -> usize {
        let mut inner = self.lock();
        let count = match inner.watchers.get_mut(path) {
            Some(senders) => {
                senders.retain(|tx| !tx.is_closed());
                senders.len()
            }
            None => 0,
        };
        if count == 0 {
            inner.watchers.remove(path);
        }
        count
    }

    /// Take the store offline.
    ///
    /// Open watches end and further operations fail with [`Error::Closed`].
    pub fn close(&self) {
        let mut inner = self.lock();
        inner.closed = true;
        inner.watchers.clear();
        tracing::debug!("Memory store closed");
    }
}

impl Store for MemoryStore {
    async fn watch(&self, path: &StorePath) -> Result<Watch> {
        let mut inner = self.lock();
        inner.ensure_open()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let initial = match inner.records.get(path) {
            Some(record) => Snapshot::from_record(path.clone(), record.clone()),
            None => Snapshot::empty(path.clone()),
        };
        // The receiver is alive, so the first send cannot fail.
        let _ = tx.send(initial);
        inner.watchers.entry(path.clone()).or_default().push(tx);

        tracing::debug!(path = %path, "Watching memory store path");
        Ok(Watch::new(path.clone(), rx))
    }

    async fn get(&self, path: &StorePath) -> Result<Option<Record>> {
        let inner = self.lock();
        inner.ensure_open()?;
        Ok(inner.records.get(path).cloned())
    }

    async fn set(&self, path: &StorePath, value: &Reading) -> Result<()> {
        let mut inner = self.lock();
        inner.ensure_open()?;
        inner.write(path, Record::new(value.clone()));
        Ok(())
    }

    async fn push(&self, path: &StorePath, value: &Reading) -> Result<String> {
        let mut inner = self.lock();
        inner.ensure_open()?;
        let id = inner.ids.generate();
        let child = path.child(&id)?;
        inner.write(&child, Record::new(value.clone()));
        Ok(id)
    }

    async fn remove(&self, path: &StorePath) -> Result<()> {
        let mut inner = self.lock();
        inner.ensure_open()?;
        if inner.records.remove(path).is_some() {
            inner.notify(Snapshot::empty(path.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    fn path(s: &str) -> StorePath {
        StorePath::new(s).unwrap()
    }

    #[test]
    fn test_watch_delivers_current_value_first() {
        block_on(async {
            let store = MemoryStore::new();
            let temp = path("Current Temperature");
            store.set(&temp, &Reading::Number(21.0)).await.unwrap();

            let mut watch = store.watch(&temp).await.unwrap();
            let first = watch.try_next().unwrap();
            assert_eq!(first.value, Some(Reading::Number(21.0)));
            assert!(watch.try_next().is_none());
        });
    }

    #[test]
    fn test_watch_on_missing_path_delivers_empty() {
        block_on(async {
            let store = MemoryStore::new();
            let mut watch = store.watch(&path("Heading")).await.unwrap();
            let first = watch.try_next().unwrap();
            assert!(!first.exists());
        });
    }

    #[test]
    fn test_every_change_is_delivered_in_order() {
        block_on(async {
            let store = MemoryStore::new();
            let temp = path("Current Temperature");
            let mut watch = store.watch(&temp).await.unwrap();

            for v in [0.0, 68.0, 30.0] {
                store.set(&temp, &Reading::Number(v)).await.unwrap();
            }

            let mut seen = Vec::new();
            while let Some(snapshot) = watch.try_next() {
                seen.push(snapshot.value);
            }
            assert_eq!(
                seen,
                vec![
                    None,
                    Some(Reading::Number(0.0)),
                    Some(Reading::Number(68.0)),
                    Some(Reading::Number(30.0)),
                ]
            );
        });
    }

    #[test]
    fn test_watch_ignores_other_paths() {
        block_on(async {
            let store = MemoryStore::new();
            let mut watch = store.watch(&path("Heading")).await.unwrap();
            let _ = watch.try_next();

            store.set(&path("Other"), &Reading::from("x")).await.unwrap();
            assert!(watch.try_next().is_none());
        });
    }

    #[test]
    fn test_push_appends_ordered_children() {
        block_on(async {
            let store = MemoryStore::new();
            let root = StorePath::root();

            let first = store.push(&root, &Reading::from("hello")).await.unwrap();
            let second = store.push(&root, &Reading::from("world")).await.unwrap();
            assert!(first < second);

            let children = store.children(&root);
            assert_eq!(children.len(), 2);
            assert_eq!(children[0].0, first);
            assert_eq!(children[0].1.value, Reading::from("hello"));
            assert_eq!(children[1].1.value, Reading::from("world"));
        });
    }

    #[test]
    fn test_remove_notifies_empty() {
        block_on(async {
            let store = MemoryStore::new();
            let heading = path("Heading");
            store.set(&heading, &Reading::from("North")).await.unwrap();

            let mut watch = store.watch(&heading).await.unwrap();
            let _ = watch.try_next();

            store.remove(&heading).await.unwrap();
            assert!(!watch.try_next().unwrap().exists());
            assert_eq!(store.get(&heading).await.unwrap(), None);
        });
    }

    #[test]
    fn test_dropped_watch_is_pruned() {
        block_on(async {
            let store = MemoryStore::new();
            let heading = path("Heading");

            let watch = store.watch(&heading).await.unwrap();
            assert_eq!(store.watcher_count(&heading), 1);

            watch.cancel();
            assert_eq!(store.watcher_count(&heading), 0);
        });
    }

    #[test]
    fn test_closed_store_rejects_operations() {
        block_on(async {
            let store = MemoryStore::new();
            let heading = path("Heading");
            let mut watch = store.watch(&heading).await.unwrap();
            let _ = watch.try_next();

            store.close();

            assert!(watch.next().await.is_none());
            assert!(matches!(
                store.set(&heading, &Reading::from("x")).await,
                Err(Error::Closed)
            ));
            assert!(matches!(store.watch(&heading).await, Err(Error::Closed)));
        });
    }
}
