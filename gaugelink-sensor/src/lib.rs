//! GaugeLink sensor publisher.
//!
//! Reads 1-Wire thermometers (or a simulated source) on an interval and
//! writes the values into the GaugeLink store:
//!
//! - every device under `clientModules/<client>/current/<device>`
//! - the primary device under the reading path the gauge watches
//! - client status and `lastUpdate` under `clientModules/<client>`
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use gaugelink_sensor::{SensorArgs, SensorConfig, SensorRunner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = SensorArgs::parse();
//!     let config = SensorConfig::load(&args.config)?;
//!
//!     let runner = SensorRunner::new(config, Some(&args)).await?;
//!     runner.run(args.run_time()).await?;
//!     Ok(())
//! }
//! ```

pub mod args;
pub mod config;
pub mod error;
pub mod publisher;
pub mod runner;
pub mod source;
pub mod status;

pub use args::SensorArgs;
pub use config::{SensorConfig, SensorSettings, SourceConfig};
pub use error::{Result, SensorError};
pub use publisher::{PublishStats, ReadingPublisher};
pub use runner::{LoopStats, SensorRunner, poll_loop};
pub use source::{AnySource, Measurement, Simulated, TemperatureSource, W1Sysfs};
pub use status::{ClientState, StatusReporter};
