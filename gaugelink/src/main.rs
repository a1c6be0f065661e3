//! GaugeLink - live gauge for a realtime store value.
//!
//! This application watches one value under `gaugelink/**` and draws it
//! on a dial gauge. Text typed into the page is appended to the store.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use iced::application;

use gaugelink::{AppConfig, GaugeLink};
use gaugelink_common::init_tracing;

/// Live gauge for a realtime store value.
#[derive(Parser, Debug)]
#[command(name = "gaugelink")]
#[command(about = "Show a realtime store value on a gauge", long_about = None)]
struct Args {
    /// Path to the configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use an in-process store with simulated readings.
    #[arg(long)]
    demo: bool,

    /// Override the configured log level (e.g. "debug").
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = AppConfig::discover(args.config.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    // Initialize tracing
    let logging = config.logging.with_level_override(args.log_level.as_deref());
    init_tracing(&logging).context("Failed to initialize tracing")?;

    tracing::info!(
        reading = %config.bindings.reading,
        key_prefix = %config.store.key_prefix,
        demo = args.demo,
        "Starting GaugeLink"
    );

    let app = GaugeLink::new(&config, args.demo).context("Invalid bindings")?;

    // Run the Iced application
    application(move || app.clone().boot(), GaugeLink::update, GaugeLink::view)
        .title(GaugeLink::title)
        .subscription(GaugeLink::subscription)
        .theme(GaugeLink::theme)
        .run()
        .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
