use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use zenoh::Session;
use zenoh::sample::{Sample, SampleKind};

use crate::config::{StoreConfig, ZenohConfig};
use crate::error::Result;
use crate::keyexpr::StorePath;
use crate::pushid::PushIdGenerator;
use crate::reading::{Reading, Record, Snapshot};
use crate::serialization::{decode_auto, encode};
use crate::session::connect;

use super::{Store, Watch};

/// Store backed by a Zenoh session.
///
/// Each store path maps to the key expression `<key_prefix>/<path>`.
/// Values are [`Record`]s encoded with the configured format. Zenoh does
/// not keep values by itself: a [`StoreHost`](super::StoreHost) (or any
/// Zenoh storage) must answer queries for watches to see the current value.
#[derive(Clone)]
pub struct ZenohStore {
    session: Arc<Session>,
    config: StoreConfig,
    ids: Arc<Mutex<PushIdGenerator>>,
}

impl std::fmt::Debug for ZenohStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZenohStore")
            .field("zid", &self.session.zid().to_string())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ZenohStore {
    /// Wrap an existing session.
    pub fn new(session: Arc<Session>, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            session,
            config,
            ids: Arc::new(Mutex::new(PushIdGenerator::new())),
        })
    }

    /// Open a session and wrap it.
    pub async fn connect(zenoh: &ZenohConfig, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let session = connect(zenoh).await?;
        Self::new(Arc::new(session), config)
    }

    /// The underlying session.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Close the underlying session.
    pub async fn close(&self) -> Result<()> {
        self.session.close().await?;
        Ok(())
    }

    fn key(&self, path: &StorePath) -> String {
        path.key_expr(&self.config.key_prefix)
    }

    /// Ask the network for the newest record at `key`.
    async fn query_latest(&self, key: &str) -> Result<Option<Record>> {
        let replies = self
            .session
            .get(key)
            .timeout(self.config.query_timeout())
            .await?;

        let mut latest: Option<Record> = None;
        while let Ok(reply) = replies.recv_async().await {
            match reply.result() {
                Ok(sample) => {
                    let Some(record) = decode_sample(sample) else {
                        continue;
                    };
                    if latest
                        .as_ref()
                        .is_none_or(|current| record.timestamp >= current.timestamp)
                    {
                        latest = Some(record);
                    }
                }
                Err(_) => {
                    tracing::debug!(key = %key, "Query returned an error reply");
                }
            }
        }

        Ok(latest)
    }

    async fn put_record(&self, path: &StorePath, record: &Record) -> Result<()> {
        let key = self.key(path);
        let payload = encode(record, self.config.format)?;
        self.session.put(key.as_str(), payload).await?;
        tracing::trace!(key = %key, "Record written");
        Ok(())
    }
}

/// Decode a sample payload into a record, logging undecodable payloads.
fn decode_sample(sample: &Sample) -> Option<Record> {
    let payload = sample.payload().to_bytes();
    match decode_auto::<Record>(&payload) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(
                error = %e,
                key = %sample.key_expr(),
                "Failed to decode record"
            );
            None
        }
    }
}

impl Store for ZenohStore {
    async fn watch(&self, path: &StorePath) -> Result<Watch> {
        let key = self.key(path);

        // Declared before the query so no change made during it is lost.
        let subscriber = self.session.declare_subscriber(key.clone()).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let store = self.clone();
        let watched = path.clone();

        let task = tokio::spawn(async move {
            let initial = match store.query_latest(&key).await {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(error = %e, key = %key, "Failed to query current value");
                    None
                }
            };

            // Live samples older than the queried value were overtaken by it.
            let mut floor = initial.as_ref().map(|record| record.timestamp);
            let first = match initial {
                Some(record) => Snapshot::from_record(watched.clone(), record),
                None => Snapshot::empty(watched.clone()),
            };
            if tx.send(first).is_err() {
                return;
            }

            loop {
                let sample = match subscriber.recv_async().await {
                    Ok(sample) => sample,
                    Err(e) => {
                        tracing::debug!(error = %e, key = %key, "Subscriber closed");
                        break;
                    }
                };

                let snapshot = match sample.kind() {
                    SampleKind::Put => {
                        let Some(record) = decode_sample(&sample) else {
                            continue;
                        };
                        if floor.is_some_and(|ts| record.timestamp < ts) {
                            continue;
                        }
                        floor = None;
                        Snapshot::from_record(watched.clone(), record)
                    }
                    SampleKind::Delete => Snapshot::empty(watched.clone()),
                };

                if tx.send(snapshot).is_err() {
                    break;
                }
            }
        });

        tracing::debug!(path = %path, "Watching Zenoh store path");
        Ok(Watch::new(path.clone(), rx).with_task(task))
    }

    async fn get(&self, path: &StorePath) -> Result<Option<Record>> {
        self.query_latest(&self.key(path)).await
    }

    async fn set(&self, path: &StorePath, value: &Reading) -> Result<()> {
        self.put_record(path, &Record::new(value.clone())).await
    }

    async fn push(&self, path: &StorePath, value: &Reading) -> Result<String> {
        let id = self
            .ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generate();
        let child = path.child(&id)?;
        self.put_record(&child, &Record::new(value.clone())).await?;
        Ok(id)
    }

    async fn remove(&self, path: &StorePath) -> Result<()> {
        let key = self.key(path);
        self.session.delete(key.as_str()).await?;
        Ok(())
    }
}
