//! Realtime store abstraction.
//!
//! A store keeps the latest [`Record`] at each [`StorePath`] and notifies
//! watchers of every change. Appending with [`Store::push`] creates a child
//! record under a chronologically ordered push id.
//!
//! Two implementations are provided:
//! - [`MemoryStore`]: in-process, used by tests and demo mode
//! - [`ZenohStore`]: backed by a Zenoh session; pair it with a
//!   [`StoreHost`] somewhere on the network to retain values

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::keyexpr::StorePath;
use crate::reading::{Reading, Record, Snapshot};

mod host;
mod memory;
mod remote;

pub use host::StoreHost;
pub use memory::MemoryStore;
pub use remote::ZenohStore;

/// Operations every store backend provides.
pub trait Store: Clone + Send + Sync + 'static {
    /// Subscribe to a single path.
    ///
    /// The first notification carries the current value (or `None`), every
    /// later one a change. The subscription lasts until the [`Watch`] is
    /// dropped or cancelled.
    fn watch(&self, path: &StorePath) -> impl Future<Output = Result<Watch>> + Send;

    /// Read the current record at a path.
    fn get(&self, path: &StorePath) -> impl Future<Output = Result<Option<Record>>> + Send;

    /// Replace the value at a path.
    fn set(&self, path: &StorePath, value: &Reading) -> impl Future<Output = Result<()>> + Send;

    /// Append a value as a new child of `path` and return its push id.
    fn push(&self, path: &StorePath, value: &Reading)
    -> impl Future<Output = Result<String>> + Send;

    /// Remove the value at a path.
    fn remove(&self, path: &StorePath) -> impl Future<Output = Result<()>> + Send;
}

/// Handle to a standing subscription on one path.
///
/// Notifications are delivered in the order the store produced them.
/// Dropping the handle ends the subscription.
#[derive(Debug)]
pub struct Watch {
    path: StorePath,
    rx: mpsc::UnboundedReceiver<Snapshot>,
    task: Option<JoinHandle<()>>,
}

impl Watch {
    pub(crate) fn new(path: StorePath, rx: mpsc::UnboundedReceiver<Snapshot>) -> Self {
        Self {
            path,
            rx,
            task: None,
        }
    }

    pub(crate) fn with_task(mut self, task: JoinHandle<()>) -> Self {
        self.task = Some(task);
        self
    }

    /// The watched path.
    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Wait for the next notification.
    ///
    /// Returns `None` once the store side has gone away.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    /// Take a notification if one is already queued.
    pub fn try_next(&mut self) -> Option<Snapshot> {
        self.rx.try_recv().ok()
    }

    /// End the subscription.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Watch {
    fn drop(&mut self) {
        self.rx.close();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Either store backend, chosen at runtime.
#[derive(Debug, Clone)]
pub enum AnyStore {
    /// In-process store.
    Memory(MemoryStore),
    /// Zenoh-backed store.
    Zenoh(ZenohStore),
}

impl AnyStore {
    /// Short backend name for logs and status lines.
    pub fn backend(&self) -> &'static str {
        match self {
            AnyStore::Memory(_) => "memory",
            AnyStore::Zenoh(_) => "zenoh",
        }
    }
}

impl From<MemoryStore> for AnyStore {
    fn from(store: MemoryStore) -> Self {
        AnyStore::Memory(store)
    }
}

impl From<ZenohStore> for AnyStore {
    fn from(store: ZenohStore) -> Self {
        AnyStore::Zenoh(store)
    }
}

impl Store for AnyStore {
    async fn watch(&self, path: &StorePath) -> Result<Watch> {
        match self {
            AnyStore::Memory(store) => store.watch(path).await,
            AnyStore::Zenoh(store) => store.watch(path).await,
        }
    }

    async fn get(&self, path: &StorePath) -> Result<Option<Record>> {
        match self {
            AnyStore::Memory(store) => store.get(path).await,
            AnyStore::Zenoh(store) => store.get(path).await,
        }
    }

    async fn set(&self, path: &StorePath, value: &Reading) -> Result<()> {
        match self {
            AnyStore::Memory(store) => store.set(path, value).await,
            AnyStore::Zenoh(store) => store.set(path, value).await,
        }
    }

    async fn push(&self, path: &StorePath, value: &Reading) -> Result<String> {
        match self {
            AnyStore::Memory(store) => store.push(path, value).await,
            AnyStore::Zenoh(store) => store.push(path, value).await,
        }
    }

    async fn remove(&self, path: &StorePath) -> Result<()> {
        match self {
            AnyStore::Memory(store) => store.remove(path).await,
            AnyStore::Zenoh(store) => store.remove(path).await,
        }
    }
}
