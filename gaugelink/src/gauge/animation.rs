//! Needle animation between two values.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Easing curve applied to the needle sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Start slow, end fast.
    In,
    /// Start fast, end slow.
    Out,
    /// Slow at both ends.
    #[default]
    InAndOut,
}

impl Easing {
    /// Map linear progress `t` in `0.0..=1.0` onto the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::In => t * t,
            Easing::Out => t * (2.0 - t),
            Easing::InAndOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

/// A running sweep of the needle from one value to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    from: f64,
    to: f64,
    started: Instant,
    duration: Duration,
    easing: Easing,
}

impl Animation {
    pub fn new(from: f64, to: f64, started: Instant, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            started,
            duration,
            easing,
        }
    }

    /// Value the sweep ends on.
    pub fn target(&self) -> f64 {
        self.to
    }

    /// Linear progress in `0.0..=1.0`.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Needle value at `now`.
    pub fn value_at(&self, now: Instant) -> f64 {
        let eased = self.easing.apply(self.progress(now));
        self.from + (self.to - self.from) * eased
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}
