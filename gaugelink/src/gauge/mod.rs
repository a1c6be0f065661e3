//! Gauge model: configuration, needle animation and dial geometry.

pub mod animation;
pub mod config;
pub mod geometry;

pub use animation::{Animation, Easing};
pub use config::{AnimationConfig, Band, BandsConfig, GaugeConfig, GaugeConfigError, MajorTicks, Range, Rgb};
pub use geometry::{Dial, Needle, Tick, TickLabel};
