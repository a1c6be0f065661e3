//! Sensor publisher configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use gaugelink_common::{LoggingConfig, StoreConfig, StorePath, ZenohConfig};

use crate::error::{Result, SensorError};

/// Root configuration of the sensor publisher.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Zenoh connection settings.
    #[serde(default)]
    pub zenoh: ZenohConfig,

    /// Store key prefix and payload format.
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub sensor: SensorSettings,
}

/// Where temperatures come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Linux w1 sysfs tree (`w1-gpio` + `w1-therm` kernel modules).
    W1Sysfs {
        #[serde(default = "default_w1_dir")]
        base_dir: PathBuf,
    },
    /// Random walk, for machines without sensors.
    Simulated {
        #[serde(default = "default_simulated_devices")]
        devices: Vec<String>,
        #[serde(default = "default_simulated_start")]
        start: f64,
    },
}

fn default_w1_dir() -> PathBuf {
    PathBuf::from("/sys/bus/w1/devices")
}

fn default_simulated_devices() -> Vec<String> {
    vec!["28-000000000001".to_string()]
}

fn default_simulated_start() -> f64 {
    21.0
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::W1Sysfs {
            base_dir: default_w1_dir(),
        }
    }
}

/// Publisher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSettings {
    /// Name of this client module; devices are stored under it.
    #[serde(default = "default_client_name")]
    pub client_name: String,

    #[serde(default)]
    pub source: SourceConfig,

    /// Seconds between two polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Path the primary device's value is written to.
    #[serde(default = "default_reading_path")]
    pub reading_path: String,

    /// Device whose value goes to `reading_path` (first device by default).
    #[serde(default)]
    pub primary_device: Option<String>,

    /// Decimals kept when rounding readings.
    #[serde(default = "default_resolution")]
    pub resolution: u32,

    /// Retain values and answer queries for the whole store.
    #[serde(default = "default_true")]
    pub host_store: bool,

    /// When false the publisher runs but writes nothing.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_client_name() -> String {
    "default".to_string()
}

fn default_poll_interval() -> u64 {
    10
}

fn default_reading_path() -> String {
    "Current Temperature".to_string()
}

fn default_resolution() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            source: SourceConfig::default(),
            poll_interval_secs: default_poll_interval(),
            reading_path: default_reading_path(),
            primary_device: None,
            resolution: default_resolution(),
            host_store: true,
            enabled: true,
        }
    }
}

/// Root of this client's records.
pub const CLIENTS_ROOT: &str = "clientModules";

impl SensorSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn reading_path(&self) -> Result<StorePath> {
        Ok(StorePath::new(&self.reading_path)?)
    }

    /// `clientModules/<client>`.
    pub fn client_root(&self) -> Result<StorePath> {
        Ok(StorePath::new(CLIENTS_ROOT)?.child(&self.client_name)?)
    }

    /// `clientModules/<client>/current`: one entry per device.
    pub fn device_root(&self) -> Result<StorePath> {
        Ok(self.client_root()?.child("current")?)
    }
}

impl SensorConfig {
    /// Load configuration from a file path and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SensorError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string and validate it.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.store
            .validate()
            .map_err(|e| SensorError::validation(e.to_string()))?;

        let sensor = &self.sensor;
        if sensor.client_name.is_empty() || sensor.client_name.contains('/') {
            return Err(SensorError::validation(format!(
                "client_name '{}' must be a single non-empty path chunk",
                sensor.client_name
            )));
        }
        if sensor.poll_interval_secs == 0 {
            return Err(SensorError::validation("poll_interval_secs must be at least 1"));
        }
        if sensor.resolution > 6 {
            return Err(SensorError::validation("resolution must be at most 6 decimals"));
        }
        let reading = sensor
            .reading_path()
            .map_err(|e| SensorError::validation(e.to_string()))?;
        if reading.is_root() {
            return Err(SensorError::validation("reading_path cannot be the store root"));
        }
        sensor
            .device_root()
            .map_err(|e| SensorError::validation(e.to_string()))?;

        if let SourceConfig::Simulated { devices, .. } = &sensor.source {
            if devices.is_empty() {
                return Err(SensorError::validation(
                    "Simulated source needs at least one device",
                ));
            }
        }

        Ok(())
    }
}
