//! Error types for the sensor publisher.

use thiserror::Error;

/// Result type alias using [`SensorError`].
pub type Result<T> = std::result::Result<T, SensorError>;

/// Errors that can occur in the sensor publisher.
#[derive(Error, Debug)]
pub enum SensorError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration parse error.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration validation error.
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    /// Store error (connection, encoding, write).
    #[error("Store error: {0}")]
    Store(#[from] gaugelink_common::Error),

    /// A device could not be read.
    #[error("Failed to read {device}: {message}")]
    Read { device: String, message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SensorError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a configuration validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ConfigValidation(msg.into())
    }

    /// Create a device read error.
    pub fn read(device: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Read {
            device: device.into(),
            message: msg.into(),
        }
    }
}

impl From<json5::Error> for SensorError {
    fn from(err: json5::Error) -> Self {
        Self::ConfigParse(err.to_string())
    }
}
