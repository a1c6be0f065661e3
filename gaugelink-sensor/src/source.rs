//! Temperature sources.
//!
//! [`W1Sysfs`] reads DS18B20-family sensors through the Linux w1 sysfs tree;
//! [`Simulated`] produces a random walk for machines without sensors.

use std::future::Future;
use std::path::{Path, PathBuf};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use gaugelink_common::current_timestamp_millis;

use crate::config::SourceConfig;
use crate::error::{Result, SensorError};

/// 1-Wire family codes of supported thermometers (DS18S20, DS1822, DS18B20).
const THERMOMETER_FAMILIES: [&str; 3] = ["10-", "22-", "28-"];

/// One temperature from one device.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// 1-Wire id (e.g. `28-0316a2794dff`).
    pub device_id: String,
    /// Degrees Celsius, rounded to the configured resolution.
    pub temperature: f64,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
}

/// Something that can be polled for temperatures.
pub trait TemperatureSource: Send {
    /// Read every device once. Devices that fail are logged and skipped.
    fn poll(&mut self) -> impl Future<Output = Result<Vec<Measurement>>> + Send;
}

/// Round to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Parse the contents of a `w1_slave` file into degrees Celsius.
///
/// The first line ends with the CRC verdict (`YES`/`NO`), the second
/// carries the temperature in millidegrees after `t=`.
pub fn parse_w1_slave(content: &str) -> std::result::Result<f64, String> {
    let mut lines = content.lines();
    let crc = lines.next().ok_or("empty w1_slave")?;
    if !crc.trim_end().ends_with("YES") {
        return Err(format!("CRC check failed: {}", crc.trim()));
    }

    let data = lines.next().ok_or("missing temperature line")?;
    let (_, raw) = data
        .rsplit_once("t=")
        .ok_or_else(|| format!("no temperature in '{}'", data.trim()))?;
    let millis: i64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("bad temperature '{}': {}", raw.trim(), e))?;

    Ok(millis as f64 / 1000.0)
}

/// DS18B20-family thermometers under the w1 sysfs tree.
#[derive(Debug, Clone)]
pub struct W1Sysfs {
    base_dir: PathBuf,
    resolution: u32,
}

impl W1Sysfs {
    pub fn new(base_dir: impl Into<PathBuf>, resolution: u32) -> Self {
        Self {
            base_dir: base_dir.into(),
            resolution,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Ids of the thermometers currently on the bus, sorted.
    pub async fn devices(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.base_dir).await?;
        let mut devices = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if THERMOMETER_FAMILIES.iter().any(|family| name.starts_with(family)) {
                devices.push(name);
            }
        }
        devices.sort();
        Ok(devices)
    }

    async fn read_device(&self, device_id: &str) -> Result<f64> {
        let path = self.base_dir.join(device_id).join("w1_slave");
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SensorError::read(device_id, e.to_string()))?;
        let celsius = parse_w1_slave(&content).map_err(|e| SensorError::read(device_id, e))?;
        Ok(round_to(celsius, self.resolution))
    }
}

impl TemperatureSource for W1Sysfs {
    async fn poll(&mut self) -> Result<Vec<Measurement>> {
        let devices = self.devices().await?;
        if devices.is_empty() {
            tracing::warn!(dir = %self.base_dir.display(), "No 1-Wire thermometers found");
        }

        let mut measurements = Vec::with_capacity(devices.len());
        for device_id in devices {
            match self.read_device(&device_id).await {
                Ok(temperature) => measurements.push(Measurement {
                    device_id,
                    temperature,
                    timestamp: current_timestamp_millis(),
                }),
                Err(e) => tracing::warn!(error = %e, "Skipping device"),
            }
        }
        Ok(measurements)
    }
}

/// Random-walk temperatures for a fixed set of devices.
#[derive(Debug, Clone)]
pub struct Simulated {
    devices: Vec<(String, f64)>,
    resolution: u32,
    rng: SmallRng,
}

impl Simulated {
    pub fn new(devices: &[String], start: f64, resolution: u32) -> Self {
        Self::with_rng(devices, start, resolution, SmallRng::from_os_rng())
    }

    /// Simulator with a fixed seed (reproducible runs).
    pub fn seeded(devices: &[String], start: f64, resolution: u32, seed: u64) -> Self {
        Self::with_rng(devices, start, resolution, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(devices: &[String], start: f64, resolution: u32, rng: SmallRng) -> Self {
        Self {
            devices: devices.iter().map(|id| (id.clone(), start)).collect(),
            resolution,
            rng,
        }
    }

    /// Next step of the walk, kept within -40..85 (DS18B20 range is -55..125).
    fn step(&mut self) -> Vec<Measurement> {
        let timestamp = current_timestamp_millis();
        let mut out = Vec::with_capacity(self.devices.len());
        for (device_id, value) in &mut self.devices {
            *value = (*value + self.rng.random_range(-0.5..=0.5)).clamp(-40.0, 85.0);
            out.push(Measurement {
                device_id: device_id.clone(),
                temperature: round_to(*value, self.resolution),
                timestamp,
            });
        }
        out
    }
}

impl TemperatureSource for Simulated {
    async fn poll(&mut self) -> Result<Vec<Measurement>> {
        Ok(self.step())
    }
}

/// Either source, chosen by configuration.
#[derive(Debug, Clone)]
pub enum AnySource {
    W1Sysfs(W1Sysfs),
    Simulated(Simulated),
}

impl AnySource {
    pub fn from_config(config: &SourceConfig, resolution: u32) -> Self {
        match config {
            SourceConfig::W1Sysfs { base_dir } => {
                AnySource::W1Sysfs(W1Sysfs::new(base_dir.clone(), resolution))
            }
            SourceConfig::Simulated { devices, start } => {
                AnySource::Simulated(Simulated::new(devices, *start, resolution))
            }
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AnySource::W1Sysfs(_) => "w1_sysfs",
            AnySource::Simulated(_) => "simulated",
        }
    }
}

impl TemperatureSource for AnySource {
    async fn poll(&mut self) -> Result<Vec<Measurement>> {
        match self {
            AnySource::W1Sysfs(source) => source.poll().await,
            AnySource::Simulated(source) => source.poll().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    const GOOD: &str = "72 01 4b 46 7f ff 0e 10 57 : crc=57 YES\n\
                        72 01 4b 46 7f ff 0e 10 57 t=23125\n";

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gaugelink-w1-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn add_device(dir: &Path, id: &str, content: &str) {
        let device = dir.join(id);
        std::fs::create_dir_all(&device).unwrap();
        std::fs::write(device.join("w1_slave"), content).unwrap();
    }

    #[test]
    fn test_parse_w1_slave() {
        assert_eq!(parse_w1_slave(GOOD), Ok(23.125));

        let negative = "ff ff : crc=aa YES\nff ff t=-1062\n";
        assert_eq!(parse_w1_slave(negative), Ok(-1.062));
    }

    #[test]
    fn test_parse_w1_slave_rejects_bad_crc() {
        let bad = "72 01 4b 46 7f ff 0e 10 57 : crc=57 NO\n72 01 t=23125\n";
        assert!(parse_w1_slave(bad).unwrap_err().contains("CRC"));
        assert!(parse_w1_slave("").is_err());
        assert!(parse_w1_slave("x : crc=00 YES\n").is_err());
        assert!(parse_w1_slave("x : crc=00 YES\nx t=abc\n").is_err());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(23.125, 1), 23.1);
        assert_eq!(round_to(23.16, 1), 23.2);
        assert_eq!(round_to(-1.062, 0), -1.0);
    }

    #[test]
    fn test_w1_sysfs_reads_thermometers() {
        let dir = fixture_dir("read");
        add_device(&dir, "28-0000000000b2", GOOD);
        add_device(&dir, "28-0000000000a1", "aa : crc=00 YES\naa t=18500\n");
        add_device(&dir, "28-0000000000c3", "aa : crc=00 NO\naa t=99000\n");
        std::fs::create_dir_all(dir.join("w1_bus_master1")).unwrap();

        let mut source = W1Sysfs::new(&dir, 1);
        let devices = block_on(source.devices()).unwrap();
        assert_eq!(devices.len(), 3);

        let measurements = block_on(source.poll()).unwrap();
        let values: Vec<(&str, f64)> = measurements
            .iter()
            .map(|m| (m.device_id.as_str(), m.temperature))
            .collect();
        // The device failing its CRC is skipped
        assert_eq!(values, vec![("28-0000000000a1", 18.5), ("28-0000000000b2", 23.1)]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_w1_sysfs_missing_dir() {
        let mut source = W1Sysfs::new("/nonexistent/w1/devices", 1);
        assert!(matches!(block_on(source.poll()), Err(SensorError::Io(_))));
    }

    #[test]
    fn test_simulated_walk() {
        let devices = vec!["28-a".to_string(), "28-b".to_string()];
        let mut source = Simulated::seeded(&devices, 21.0, 1, 9);

        let mut last = 21.0;
        for _ in 0..100 {
            let measurements = block_on(source.poll()).unwrap();
            assert_eq!(measurements.len(), 2);
            assert_eq!(measurements[0].device_id, "28-a");
            let value = measurements[0].temperature;
            assert!((value - last).abs() <= 0.6 + 1e-9);
            last = value;
        }
    }

    #[test]
    fn test_any_source_from_config() {
        let source = AnySource::from_config(&SourceConfig::default(), 1);
        assert_eq!(source.kind(), "w1_sysfs");

        let source = AnySource::from_config(
            &SourceConfig::Simulated {
                devices: vec!["28-a".to_string()],
                start: 5.0,
            },
            1,
        );
        assert_eq!(source.kind(), "simulated");
    }
}
