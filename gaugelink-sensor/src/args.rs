//! CLI argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Default configuration file.
pub const DEFAULT_CONFIG: &str = "gaugelink-sensor.json5";

/// Publish 1-Wire temperature readings to the GaugeLink store.
#[derive(Parser, Debug, Clone)]
#[command(name = "gaugelink-sensor")]
#[command(about = "Publish 1-Wire temperatures to the GaugeLink store", long_about = None)]
pub struct SensorArgs {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Stop after this many seconds instead of waiting for Ctrl+C.
    #[arg(long)]
    pub run_time: Option<u64>,
}

impl SensorArgs {
    /// Run time as a duration, if one was given.
    pub fn run_time(&self) -> Option<Duration> {
        self.run_time.map(Duration::from_secs)
    }
}
