//! The two bridges between the store and the page.
//!
//! [`GaugeBridge`] owns the gauge display state and turns store
//! notifications into needle sweeps. [`SubmitBridge`] appends text typed by
//! the user to the store.

use std::time::{Duration, Instant};

use rand::Rng;

use gaugelink_common::{Reading, Snapshot, Store, StorePath};

use crate::gauge::{Animation, GaugeConfig};

/// Emitted by [`GaugeBridge::advance`] when an animated draw completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawEvent {
    Ready,
}

/// Display state of the gauge plus the logic that updates it.
///
/// The message handler is the only writer; rendering reads from it.
#[derive(Debug, Clone)]
pub struct GaugeBridge {
    config: GaugeConfig,
    /// Value shown in the caption: the latest reading or the placeholder.
    value: f64,
    /// Whether `value` came from a notification.
    received: bool,
    /// Where the needle rests when no draw is running.
    needle: f64,
    animation: Option<Animation>,
    draws: u64,
}

impl GaugeBridge {
    pub fn new(config: GaugeConfig) -> Self {
        let placeholder = config.placeholder;
        Self {
            config,
            value: placeholder,
            received: false,
            needle: placeholder,
            animation: None,
            draws: 0,
        }
    }

    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    /// Value the gauge displays.
    pub fn displayed_value(&self) -> f64 {
        self.value
    }

    /// Whether any notification carrying a value has been applied.
    pub fn has_reading(&self) -> bool {
        self.received
    }

    /// Whether an animated draw is in progress.
    ///
    /// The refresh control is disabled while this is true.
    pub fn is_drawing(&self) -> bool {
        self.animation.is_some()
    }

    /// Number of draws started so far.
    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    /// Needle position at `now`.
    pub fn needle_value(&self, now: Instant) -> f64 {
        self.animation
            .map(|animation| animation.value_at(now))
            .unwrap_or(self.needle)
    }

    /// Apply a store notification and redraw.
    ///
    /// A notification without a value puts the placeholder back. Text that
    /// is not a number is logged and ignored.
    pub fn on_reading(&mut self, snapshot: &Snapshot, now: Instant) {
        match &snapshot.value {
            None => {
                tracing::debug!(path = %snapshot.path, "No value stored, showing placeholder");
                self.value = self.config.placeholder;
                self.received = false;
            }
            Some(reading) => match reading.as_number() {
                Some(value) => {
                    tracing::debug!(path = %snapshot.path, value, "Reading received");
                    self.value = value;
                    self.received = true;
                }
                None => {
                    tracing::warn!(
                        path = %snapshot.path,
                        reading = %reading,
                        "Ignoring non-numeric reading"
                    );
                    return;
                }
            },
        }

        self.render(now);
    }

    /// Redraw the gauge for the current value.
    ///
    /// Starts a needle sweep from wherever the needle is now. Does nothing
    /// when the needle already rests on, or is already heading to, the
    /// current value. Returns whether a draw was started.
    pub fn render(&mut self, now: Instant) -> bool {
        let target = self.value;
        let current_target = self
            .animation
            .map(|animation| animation.target())
            .unwrap_or(self.needle);
        if current_target == target {
            return false;
        }

        self.draws += 1;
        let from = self.needle_value(now);
        let duration = Duration::from_millis(self.config.animation.duration_ms);
        if duration.is_zero() {
            self.needle = target;
            self.animation = None;
            return true;
        }

        self.animation = Some(Animation::new(
            from,
            target,
            now,
            duration,
            self.config.animation.easing,
        ));
        true
    }

    /// Move the running draw forward to `now`.
    ///
    /// Returns [`DrawEvent::Ready`] once, when the draw completes.
    pub fn advance(&mut self, now: Instant) -> Option<DrawEvent> {
        let animation = self.animation?;
        if !animation.is_finished(now) {
            return None;
        }
        self.needle = animation.target();
        self.animation = None;
        Some(DrawEvent::Ready)
    }

    /// Show a random demo value between 30 and 50.
    ///
    /// Ignored while a draw is in progress. The value is local: the next
    /// store notification replaces it.
    pub fn refresh<R: Rng>(&mut self, rng: &mut R, now: Instant) -> Option<f64> {
        if self.is_drawing() {
            return None;
        }
        let value = 30.0 + (20.0 * rng.random::<f64>()).round();
        self.value = value;
        self.render(now);
        Some(value)
    }
}

/// Reasons a submission is not appended.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("nothing to submit")]
    Empty,

    #[error(transparent)]
    Store(#[from] gaugelink_common::Error),
}

/// Appends submitted text to an ordered collection in the store.
#[derive(Debug, Clone)]
pub struct SubmitBridge<S> {
    store: S,
    path: StorePath,
}

impl<S: Store> SubmitBridge<S> {
    /// Submit into the collection at `path` (the root by default).
    pub fn new(store: S, path: StorePath) -> Self {
        Self { store, path }
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append `text` as one new record and return its id.
    ///
    /// Blank text is rejected without touching the store.
    pub async fn submit(&self, text: &str) -> Result<String, SubmitError> {
        if text.trim().is_empty() {
            return Err(SubmitError::Empty);
        }
        let id = self.store.push(&self.path, &Reading::from(text)).await?;
        tracing::info!(path = %self.path, id = %id, "Submission appended");
        Ok(id)
    }
}
