//! Demo mode simulation engine.
//!
//! Feeds an in-process [`MemoryStore`] with time-varying readings so the
//! gauge can be shown without a Zenoh network or a sensor.

use std::f64::consts::PI;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;

use gaugelink_common::{MemoryStore, Reading, Store, StorePath};

/// Opening values, replayed before the simulation proper starts.
const INTRO: [f64; 3] = [0.0, 68.0, 30.0];

const HEADINGS: [&str; 8] = [
    "North",
    "North-East",
    "East",
    "South-East",
    "South",
    "South-West",
    "West",
    "North-West",
];

/// Ticks between two heading changes.
const HEADING_EVERY: u64 = 5;

/// Demo simulation state.
pub struct DemoSimulator {
    rng: SmallRng,
    tick: u64,
    /// Centre of the simulated temperature swing.
    base: f64,
    /// Slow random drift added to the swing.
    drift: f64,
}

impl DemoSimulator {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_os_rng())
    }

    /// Simulator with a fixed seed (reproducible runs).
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            rng,
            tick: 0,
            base: 21.0,
            drift: 0.0,
        }
    }

    /// Next temperature, rounded to one decimal.
    pub fn next_temperature(&mut self) -> f64 {
        let tick = self.tick;
        self.tick += 1;

        if let Some(value) = INTRO.get(tick as usize) {
            return *value;
        }

        self.drift = (self.drift + self.rng.random_range(-0.5..0.5)).clamp(-5.0, 5.0);
        let swing = 8.0 * (tick as f64 * 2.0 * PI / 60.0).sin();
        let noise = self.rng.random_range(-0.3..0.3);
        ((self.base + swing + self.drift + noise) * 10.0).round() / 10.0
    }

    /// Heading for the current tick, when it changes.
    pub fn heading(&self) -> Option<&'static str> {
        let tick = self.tick.saturating_sub(1);
        (tick % HEADING_EVERY == 0)
            .then(|| HEADINGS[((tick / HEADING_EVERY) as usize) % HEADINGS.len()])
    }

    /// Ticks simulated so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }
}

impl Default for DemoSimulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Background task writing simulated readings; aborted on drop.
pub struct DemoFeed {
    task: JoinHandle<()>,
}

impl DemoFeed {
    /// Start writing to `reading` (and `heading`) every `interval`.
    pub fn start(
        store: MemoryStore,
        reading: StorePath,
        heading: Option<StorePath>,
        interval: Duration,
    ) -> Self {
        let task = tokio::spawn(async move {
            let mut sim = DemoSimulator::new();
            loop {
                let temperature = sim.next_temperature();
                if let Err(e) = store.set(&reading, &Reading::Number(temperature)).await {
                    tracing::debug!(error = %e, "Demo store closed");
                    break;
                }

                if let (Some(path), Some(text)) = (&heading, sim.heading()) {
                    if let Err(e) = store.set(path, &Reading::from(text)).await {
                        tracing::debug!(error = %e, "Demo store closed");
                        break;
                    }
                }

                tokio::time::sleep(interval).await;
            }
        });

        tracing::info!("Demo feed started");
        Self { task }
    }
}

impl Drop for DemoFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}
