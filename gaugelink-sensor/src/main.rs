//! GaugeLink sensor publisher.
//!
//! Polls 1-Wire thermometers and publishes the readings to the store.

use anyhow::{Context, Result};
use clap::Parser;

use gaugelink_sensor::{SensorArgs, SensorConfig, SensorRunner};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = SensorArgs::parse();

    // Load configuration
    let config = SensorConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    // Create the runner (logging, Zenoh session, store host)
    let runner = SensorRunner::new(config, Some(&args)).await?;

    // Run until Ctrl+C or --run-time
    runner.run(args.run_time()).await?;

    Ok(())
}
