//! GaugeLink Common Library
//!
//! Shared building blocks for GaugeLink programs:
//!
//! - [`reading`] - Data model (`Reading`, `Record`, `Snapshot`)
//! - [`keyexpr`] - Store paths and their Zenoh key expressions
//! - [`store`] - The realtime store (`Store` trait, memory and Zenoh backends)
//! - [`pushid`] - Ordered ids for appended records
//! - [`serialization`] - JSON/CBOR encoding and decoding
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`session`] - Zenoh session management
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod keyexpr;
pub mod pushid;
pub mod reading;
pub mod serialization;
pub mod session;
pub mod store;

// Re-export commonly used types at the crate root
pub use config::{
    BaseConfig, LogFormat, LoggingConfig, StoreConfig, ZenohConfig, load_config, parse_config,
};
pub use error::{Error, Result};
pub use keyexpr::{KEY_PREFIX, StorePath, parse_key_expr, store_wildcard};
pub use pushid::PushIdGenerator;
pub use reading::{Reading, Record, Snapshot, current_timestamp_millis};
pub use serialization::{Format, decode, decode_auto, encode};
pub use session::{ZenohMode, connect};
pub use store::{AnyStore, MemoryStore, Store, StoreHost, Watch, ZenohStore};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// `RUST_LOG`, when set, takes precedence over the configured level.
///
/// # Example
///
/// ```ignore
/// use gaugelink_common::{LoggingConfig, LogFormat, init_tracing};
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Json,
/// };
/// init_tracing(&config)?;
/// ```
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
