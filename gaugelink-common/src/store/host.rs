use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use zenoh::Session;
use zenoh::key_expr::KeyExpr;
use zenoh::query::Query;
use zenoh::sample::{Sample, SampleKind};

use crate::error::Result;
use crate::keyexpr::{StorePath, parse_key_expr, store_wildcard};
use crate::reading::Record;
use crate::serialization::decode_auto;

/// Retains the latest record of every key under a prefix and answers
/// queries for them.
///
/// This gives plain Zenoh pub/sub the "current value on subscribe"
/// behaviour the store needs. Run one per deployment, usually next to the
/// program that produces the readings.
pub struct StoreHost {
    prefix: String,
    cache: Arc<Mutex<HostCache>>,
    task: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct HostCache {
    entries: BTreeMap<String, CachedRecord>,
}

struct CachedRecord {
    key: KeyExpr<'static>,
    payload: Vec<u8>,
    timestamp: i64,
}

impl HostCache {
    fn apply(&mut self, sample: &Sample) {
        let key = sample.key_expr().clone();
        match sample.kind() {
            SampleKind::Put => {
                let payload = sample.payload().to_bytes().into_owned();
                let timestamp = match decode_auto::<Record>(&payload) {
                    Ok(record) => record.timestamp,
                    Err(e) => {
                        tracing::warn!(error = %e, key = %key, "Not retaining undecodable record");
                        return;
                    }
                };
                let newer = self
                    .entries
                    .get(key.as_str())
                    .is_none_or(|existing| timestamp >= existing.timestamp);
                if newer {
                    self.entries.insert(
                        key.to_string(),
                        CachedRecord {
                            key,
                            payload,
                            timestamp,
                        },
                    );
                }
            }
            SampleKind::Delete => {
                self.entries.remove(key.as_str());
            }
        }
    }

    fn matching(&self, query: &Query) -> Vec<(KeyExpr<'static>, Vec<u8>)> {
        self.entries
            .values()
            .filter(|entry| query.key_expr().intersects(&entry.key))
            .map(|entry| (entry.key.clone(), entry.payload.clone()))
            .collect()
    }
}

impl std::fmt::Debug for StoreHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHost")
            .field("prefix", &self.prefix)
            .field("retained", &self.len())
            .finish()
    }
}

impl StoreHost {
    /// Start hosting every key under `key_prefix` on `session`.
    pub async fn start(session: Arc<Session>, key_prefix: &str) -> Result<Self> {
        let wildcard = store_wildcard(key_prefix);
        let subscriber = session.declare_subscriber(wildcard.clone()).await?;
        let queryable = session.declare_queryable(wildcard.clone()).await?;

        let cache = Arc::new(Mutex::new(HostCache::default()));
        let task_cache = cache.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    sample = subscriber.recv_async() => match sample {
                        Ok(sample) => lock(&task_cache).apply(&sample),
                        Err(e) => {
                            tracing::debug!(error = %e, "Store host subscriber closed");
                            break;
                        }
                    },
                    query = queryable.recv_async() => match query {
                        Ok(query) => {
                            let replies = lock(&task_cache).matching(&query);
                            for (key, payload) in replies {
                                if let Err(e) = query.reply(key.clone(), payload).await {
                                    tracing::warn!(error = %e, key = %key, "Failed to answer query");
                                }
                            }
                        }
                        Err(e) => {
                            tracing::debug!(error = %e, "Store host queryable closed");
                            break;
                        }
                    },
                }
            }
        });

        tracing::info!(prefix = %key_prefix, "Store host started");

        Ok(Self {
            prefix: key_prefix.to_string(),
            cache,
            task: Some(task),
        })
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        lock(&self.cache).entries.len()
    }

    /// Whether nothing is retained yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a record is retained at a store path.
    pub fn contains(&self, path: &StorePath) -> bool {
        lock(&self.cache)
            .entries
            .keys()
            .any(|key| parse_key_expr(&self.prefix, key).as_ref() == Some(path))
    }

    /// Stop answering queries.
    pub fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        tracing::info!(prefix = %self.prefix, "Store host stopped");
    }
}

impl Drop for StoreHost {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn lock(cache: &Mutex<HostCache>) -> MutexGuard<'_, HostCache> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}
