//! Publisher lifecycle: startup, poll loop and shutdown.

use std::future::Future;
use std::time::Duration;

use tokio::signal;
use tokio::time::MissedTickBehavior;

use gaugelink_common::{Store, StoreHost, ZenohStore, init_tracing};

use crate::args::SensorArgs;
use crate::config::{SensorConfig, SensorSettings};
use crate::error::{Result, SensorError};
use crate::publisher::ReadingPublisher;
use crate::source::{AnySource, TemperatureSource};
use crate::status::{ClientState, StatusReporter};

/// Totals over a run of the poll loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    /// Polls that returned measurements.
    pub polls: u64,
    /// Polls that failed outright.
    pub poll_errors: u64,
    /// Successful store writes.
    pub written: u64,
    /// Failed store writes.
    pub failed: u64,
}

/// Runner that owns the store connection and drives the poll loop.
///
/// Handles:
/// - Logging initialization
/// - Zenoh connection
/// - Hosting the store (optional)
/// - Graceful shutdown on Ctrl+C or after a fixed run time
pub struct SensorRunner {
    config: SensorConfig,
    store: ZenohStore,
    host: Option<StoreHost>,
    source: AnySource,
    publisher: ReadingPublisher<ZenohStore>,
    status: StatusReporter<ZenohStore>,
}

impl SensorRunner {
    /// Create a new runner.
    ///
    /// This will:
    /// 1. Initialize logging based on config (with optional CLI override)
    /// 2. Connect to Zenoh
    /// 3. Start the store host, if enabled
    pub async fn new(config: SensorConfig, args: Option<&SensorArgs>) -> Result<Self> {
        let logging = config
            .logging
            .with_level_override(args.and_then(|a| a.log_level.as_deref()));
        init_tracing(&logging).map_err(|e| SensorError::config(e.to_string()))?;

        tracing::info!(
            client = %config.sensor.client_name,
            version = env!("CARGO_PKG_VERSION"),
            "Starting sensor publisher"
        );

        let store = ZenohStore::connect(&config.zenoh, config.store.clone()).await?;
        tracing::info!(zid = %store.session().zid(), "Connected to Zenoh");

        let host = if config.sensor.host_store {
            Some(StoreHost::start(store.session().clone(), &config.store.key_prefix).await?)
        } else {
            None
        };

        let sensor = &config.sensor;
        let publisher = ReadingPublisher::new(
            store.clone(),
            sensor.reading_path()?,
            sensor.device_root()?,
            sensor.primary_device.clone(),
        );
        let status = StatusReporter::new(store.clone(), &sensor.client_root()?)?;
        let source = AnySource::from_config(&sensor.source, sensor.resolution);

        Ok(Self {
            config,
            store,
            host,
            source,
            publisher,
            status,
        })
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Run until Ctrl+C, or until `run_time` has elapsed.
    ///
    /// This will:
    /// 1. Poll the source and publish on every interval
    /// 2. Wait for the shutdown signal
    /// 3. Publish "offline" status
    /// 4. Stop the store host and close the Zenoh session
    pub async fn run(mut self, run_time: Option<Duration>) -> Result<()> {
        tracing::info!(
            source = self.source.kind(),
            interval_secs = self.config.sensor.poll_interval_secs,
            "Sensor publisher running. Press Ctrl+C to stop."
        );

        let stats = poll_loop(
            &self.publisher,
            &self.status,
            &mut self.source,
            &self.config.sensor,
            shutdown_signal(run_time),
        )
        .await;

        tracing::info!(
            polls = stats.polls,
            written = stats.written,
            failed = stats.failed,
            "Received shutdown signal"
        );

        if let Err(e) = self.status.report(&ClientState::Offline).await {
            tracing::warn!(error = %e, "Failed to publish offline status");
        }

        if let Some(host) = self.host.take() {
            host.stop();
        }

        if let Err(e) = self.store.close().await {
            tracing::warn!(error = %e, "Error closing Zenoh session");
        }

        tracing::info!("Goodbye!");
        Ok(())
    }
}

/// Resolves on Ctrl+C, or after `run_time` when given.
async fn shutdown_signal(run_time: Option<Duration>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    match run_time {
        Some(run_time) => {
            tokio::select! {
                _ = ctrl_c => {}
                _ = tokio::time::sleep(run_time) => {
                    tracing::info!(secs = run_time.as_secs(), "Run time elapsed");
                }
            }
        }
        None => ctrl_c.await,
    }
}

/// Poll `source` every interval and publish until `shutdown` resolves.
///
/// The first poll happens immediately. With `enabled: false` nothing is
/// read or written apart from the "paused" status.
pub async fn poll_loop<S, Src, F>(
    publisher: &ReadingPublisher<S>,
    status: &StatusReporter<S>,
    source: &mut Src,
    settings: &SensorSettings,
    shutdown: F,
) -> LoopStats
where
    S: Store,
    Src: TemperatureSource,
    F: Future<Output = ()>,
{
    let mut stats = LoopStats::default();

    let mut state = if settings.enabled {
        ClientState::Running
    } else {
        tracing::info!("Publishing disabled by configuration");
        ClientState::Paused
    };
    if let Err(e) = status.report(&state).await {
        tracing::warn!(error = %e, "Failed to publish status");
    }

    let mut interval = tokio::time::interval(settings.poll_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = interval.tick() => {
                if !settings.enabled {
                    continue;
                }

                let measurements = match source.poll().await {
                    Ok(measurements) => measurements,
                    Err(e) => {
                        stats.poll_errors += 1;
                        tracing::warn!(error = %e, "Poll failed");
                        state = ClientState::Error(e.to_string());
                        if let Err(e) = status.report(&state).await {
                            tracing::warn!(error = %e, "Failed to publish status");
                        }
                        continue;
                    }
                };
                stats.polls += 1;

                if state != ClientState::Running {
                    tracing::info!("Source recovered");
                    state = ClientState::Running;
                    if let Err(e) = status.report(&state).await {
                        tracing::warn!(error = %e, "Failed to publish status");
                    }
                }

                let published = publisher.publish(&measurements).await;
                stats.written += published.success as u64;
                stats.failed += published.failed as u64;

                if published.success > 0 {
                    if let Err(e) = status.touch(chrono::Utc::now()).await {
                        tracing::debug!(error = %e, "Failed to update lastUpdate");
                    }
                }

                tracing::debug!(
                    devices = measurements.len(),
                    success = published.success,
                    failed = published.failed,
                    "Poll complete"
                );
            }
        }
    }

    stats
}
