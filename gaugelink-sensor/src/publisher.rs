//! Writes measurements to the store.

use gaugelink_common::{Reading, Store, StorePath};

use crate::error::Result;
use crate::source::Measurement;

/// Publishes measurements under a client's device root, and the primary
/// device's value to the path the gauge watches.
#[derive(Clone, Debug)]
pub struct ReadingPublisher<S> {
    store: S,
    reading_path: StorePath,
    device_root: StorePath,
    primary_device: Option<String>,
}

impl<S: Store> ReadingPublisher<S> {
    pub fn new(
        store: S,
        reading_path: StorePath,
        device_root: StorePath,
        primary_device: Option<String>,
    ) -> Self {
        Self {
            store,
            reading_path,
            device_root,
            primary_device,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn reading_path(&self) -> &StorePath {
        &self.reading_path
    }

    pub fn device_root(&self) -> &StorePath {
        &self.device_root
    }

    /// Measurement that feeds the reading path: the configured primary
    /// device, else the first one.
    pub fn primary<'a>(&self, measurements: &'a [Measurement]) -> Option<&'a Measurement> {
        match &self.primary_device {
            Some(id) => measurements.iter().find(|m| &m.device_id == id),
            None => measurements.first(),
        }
    }

    /// Publish one device's value under the device root.
    pub async fn publish_device(&self, measurement: &Measurement) -> Result<()> {
        let path = self.device_root.child(&measurement.device_id)?;
        self.store
            .set(&path, &Reading::Number(measurement.temperature))
            .await?;
        Ok(())
    }

    /// Publish a batch of measurements.
    ///
    /// Returns the number of successful and failed writes; errors are logged.
    pub async fn publish(&self, measurements: &[Measurement]) -> PublishStats {
        let mut stats = PublishStats::default();

        for measurement in measurements {
            match self.publish_device(measurement).await {
                Ok(()) => stats.success += 1,
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(
                        error = %e,
                        device = %measurement.device_id,
                        "Failed to publish measurement"
                    );
                }
            }
        }

        if let Some(primary) = self.primary(measurements) {
            let reading = Reading::Number(primary.temperature);
            match self.store.set(&self.reading_path, &reading).await {
                Ok(()) => {
                    stats.success += 1;
                    tracing::debug!(
                        device = %primary.device_id,
                        temperature = primary.temperature,
                        "Reading published"
                    );
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(error = %e, path = %self.reading_path, "Failed to publish reading");
                }
            }
        } else if let Some(id) = &self.primary_device {
            tracing::warn!(device = %id, "Primary device not in this poll");
        }

        stats
    }
}

/// Statistics from a batch publish operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishStats {
    /// Number of successful writes.
    pub success: usize,
    /// Number of failed writes.
    pub failed: usize,
}

impl PublishStats {
    /// Total number of attempted writes.
    pub fn total(&self) -> usize {
        self.success + self.failed
    }

    /// Success rate as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            100.0
        } else {
            (self.success as f64 / self.total() as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaugelink_common::MemoryStore;
    use tokio_test::block_on;

    fn measurement(id: &str, temperature: f64) -> Measurement {
        Measurement {
            device_id: id.to_string(),
            temperature,
            timestamp: 0,
        }
    }

    fn publisher(store: MemoryStore, primary: Option<&str>) -> ReadingPublisher<MemoryStore> {
        ReadingPublisher::new(
            store,
            StorePath::new("Current Temperature").unwrap(),
            StorePath::new("clientModules/greger/current").unwrap(),
            primary.map(str::to_string),
        )
    }

    #[test]
    fn test_publish_writes_devices_and_reading() {
        let store = MemoryStore::new();
        let publisher = publisher(store.clone(), None);

        let stats = block_on(publisher.publish(&[
            measurement("28-a", 21.5),
            measurement("28-b", -3.0),
        ]));
        assert_eq!(stats, PublishStats { success: 3, failed: 0 });

        let devices = store.children(publisher.device_root());
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[1].0, "28-b");
        assert_eq!(devices[1].1.value, Reading::Number(-3.0));

        let reading = block_on(store.get(publisher.reading_path())).unwrap().unwrap();
        assert_eq!(reading.value, Reading::Number(21.5));
    }

    #[test]
    fn test_configured_primary_device() {
        let store = MemoryStore::new();
        let publisher = publisher(store.clone(), Some("28-b"));

        block_on(publisher.publish(&[measurement("28-a", 21.5), measurement("28-b", 30.0)]));
        let reading = block_on(store.get(publisher.reading_path())).unwrap().unwrap();
        assert_eq!(reading.value, Reading::Number(30.0));

        // Primary missing: devices still published, reading untouched
        let stats = block_on(publisher.publish(&[measurement("28-a", 22.0)]));
        assert_eq!(stats.success, 1);
        let reading = block_on(store.get(publisher.reading_path())).unwrap().unwrap();
        assert_eq!(reading.value, Reading::Number(30.0));
    }

    #[test]
    fn test_publish_to_closed_store_counts_failures() {
        let store = MemoryStore::new();
        store.close();
        let publisher = publisher(store, None);

        let stats = block_on(publisher.publish(&[measurement("28-a", 21.5)]));
        assert_eq!(stats, PublishStats { success: 0, failed: 2 });
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn test_publish_stats() {
        let mut stats = PublishStats::default();
        assert_eq!(stats.total(), 0);
        assert_eq!(stats.success_rate(), 100.0);

        stats.success = 8;
        stats.failed = 2;
        assert_eq!(stats.total(), 10);
        assert_eq!(stats.success_rate(), 80.0);
    }
}
