//! Dial layout: where bands, ticks, labels and the needle go.
//!
//! The dial sweeps 270 degrees clockwise, from -135 degrees (minimum) to
//! +135 degrees (maximum), with 0 degrees at twelve o'clock. Everything here
//! is pure so the canvas code only strokes and fills what it gets back.

use std::f32::consts::PI;

use iced::{Point, Size};

use super::config::{Band, GaugeConfig};

/// Angle of the minimum value, in degrees from twelve o'clock.
pub const START_ANGLE: f32 = -135.0;

/// Total sweep of the dial in degrees.
pub const SWEEP: f32 = 270.0;

/// Radius fractions for the dial parts.
const BAND_RADIUS: f32 = 0.78;
const BAND_WIDTH: f32 = 0.12;
const MAJOR_TICK_INNER: f32 = 0.70;
const MINOR_TICK_INNER: f32 = 0.78;
const TICK_OUTER: f32 = 0.86;
const LABEL_RADIUS: f32 = 0.56;
const NEEDLE_LENGTH: f32 = 0.82;
const NEEDLE_TAIL: f32 = 0.15;

/// Degrees between two points of an arc polyline.
const ARC_STEP: f32 = 2.0;

/// A tick mark on the dial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub from: Point,
    pub to: Point,
    pub major: bool,
}

/// A tick label and where to centre it.
#[derive(Debug, Clone, PartialEq)]
pub struct TickLabel {
    pub position: Point,
    pub text: String,
}

/// The needle as a line from its tail through the hub to its tip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Needle {
    pub tail: Point,
    pub tip: Point,
}

/// A dial placed inside a drawing area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dial {
    pub center: Point,
    pub radius: f32,
}

impl Dial {
    /// Largest dial that fits in `size`, with a small margin.
    pub fn fit(size: Size) -> Self {
        let radius = (size.width.min(size.height) / 2.0 * 0.95).max(0.0);
        Self {
            center: Point::new(size.width / 2.0, size.height / 2.0),
            radius,
        }
    }

    /// Point at `angle` degrees and `fraction` of the radius.
    pub fn point_at(&self, angle: f32, fraction: f32) -> Point {
        let rad = angle * PI / 180.0;
        let r = self.radius * fraction;
        Point::new(self.center.x + r * rad.sin(), self.center.y - r * rad.cos())
    }

    /// Stroke width used for the coloured bands.
    pub fn band_width(&self) -> f32 {
        self.radius * BAND_WIDTH
    }

    /// Polyline following the arc of a band.
    pub fn band_arc(&self, config: &GaugeConfig, band: &Band) -> Vec<Point> {
        let start = angle_for(config, band.from);
        let end = angle_for(config, band.to);
        let steps = (((end - start) / ARC_STEP).ceil() as usize).max(1);
        (0..=steps)
            .map(|i| {
                let angle = start + (end - start) * i as f32 / steps as f32;
                self.point_at(angle, BAND_RADIUS)
            })
            .collect()
    }

    /// Major and minor tick marks, minimum to maximum.
    pub fn ticks(&self, config: &GaugeConfig) -> Vec<Tick> {
        let majors = config.major_tick_labels().len();
        if majors < 2 {
            return Vec::new();
        }
        let minors = config.minor_ticks.max(1);
        let sections = (majors - 1) * minors;

        (0..=sections)
            .map(|i| {
                let angle = START_ANGLE + SWEEP * i as f32 / sections as f32;
                let major = i % minors == 0;
                let inner = if major {
                    MAJOR_TICK_INNER
                } else {
                    MINOR_TICK_INNER
                };
                Tick {
                    from: self.point_at(angle, inner),
                    to: self.point_at(angle, TICK_OUTER),
                    major,
                }
            })
            .collect()
    }

    /// Label positions for the major ticks.
    pub fn tick_labels(&self, config: &GaugeConfig) -> Vec<TickLabel> {
        let labels = config.major_tick_labels();
        if labels.len() < 2 {
            return Vec::new();
        }
        let last = (labels.len() - 1) as f32;
        labels
            .into_iter()
            .enumerate()
            .map(|(i, text)| TickLabel {
                position: self.point_at(START_ANGLE + SWEEP * i as f32 / last, LABEL_RADIUS),
                text,
            })
            .collect()
    }

    /// Needle pointing at `value`, clamped to the dial.
    pub fn needle(&self, config: &GaugeConfig, value: f64) -> Needle {
        let angle = angle_for(config, value);
        Needle {
            tail: self.point_at(angle + 180.0, NEEDLE_TAIL),
            tip: self.point_at(angle, NEEDLE_LENGTH),
        }
    }

    /// Where the caption (label) sits.
    pub fn caption_position(&self) -> Point {
        Point::new(self.center.x, self.center.y - self.radius * 0.3)
    }

    /// Where the numeric value sits.
    pub fn value_position(&self) -> Point {
        Point::new(self.center.x, self.center.y + self.radius * 0.45)
    }
}

/// Angle in degrees for `value`, clamped to the dial's sweep.
pub fn angle_for(config: &GaugeConfig, value: f64) -> f32 {
    START_ANGLE + SWEEP * config.ratio(value) as f32
}
