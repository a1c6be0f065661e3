//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use gaugelink_common::{Error, LoggingConfig, StoreConfig, StorePath, ZenohConfig};

use crate::gauge::GaugeConfig;

/// File name looked up in the user's config directory.
pub const CONFIG_FILE: &str = "gaugelink.json5";

/// Root configuration of the gauge application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Zenoh connection settings.
    #[serde(default)]
    pub zenoh: ZenohConfig,

    /// Store key prefix, payload format and query timeout.
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Which store paths feed the page.
    #[serde(default)]
    pub bindings: BindingsConfig,

    #[serde(default)]
    pub gauge: GaugeConfig,
}

/// Store paths bound to the page elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingsConfig {
    /// Path of the value shown on the gauge.
    #[serde(default = "default_reading")]
    pub reading: String,

    /// Path of the text shown above the gauge, if any.
    #[serde(default = "default_heading")]
    pub heading: Option<String>,

    /// Collection submissions are appended to (empty for the root).
    #[serde(default)]
    pub submissions: String,
}

fn default_reading() -> String {
    "Current Temperature".to_string()
}

fn default_heading() -> Option<String> {
    Some("Heading".to_string())
}

impl Default for BindingsConfig {
    fn default() -> Self {
        Self {
            reading: default_reading(),
            heading: default_heading(),
            submissions: String::new(),
        }
    }
}

impl BindingsConfig {
    pub fn reading_path(&self) -> gaugelink_common::Result<StorePath> {
        StorePath::new(&self.reading)
    }

    pub fn heading_path(&self) -> gaugelink_common::Result<Option<StorePath>> {
        self.heading.as_deref().map(StorePath::new).transpose()
    }

    pub fn submissions_path(&self) -> gaugelink_common::Result<StorePath> {
        StorePath::new(&self.submissions)
    }
}

impl AppConfig {
    /// Load configuration from a JSON5 file.
    pub fn load(path: impl AsRef<Path>) -> gaugelink_common::Result<Self> {
        gaugelink_common::load_config(path)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> gaugelink_common::Result<Self> {
        gaugelink_common::parse_config(content)
    }

    /// Default location: `<config dir>/gaugelink/gaugelink.json5`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gaugelink").join(CONFIG_FILE))
    }

    /// Load the explicit file, else the default file when it exists, else
    /// built-in defaults. The result is validated.
    pub fn discover(explicit: Option<&Path>) -> gaugelink_common::Result<Self> {
        let config = match explicit {
            Some(path) => Self::load(path)?,
            None => match Self::default_path().filter(|path| path.is_file()) {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "Using default config file");
                    Self::load(path)?
                }
                None => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> gaugelink_common::Result<()> {
        self.store.validate()?;
        self.bindings.reading_path()?;
        self.bindings.heading_path()?;
        self.bindings.submissions_path()?;
        self.gauge
            .validate()
            .map_err(|e| Error::Config(format!("Invalid gauge: {}", e)))?;
        Ok(())
    }
}
