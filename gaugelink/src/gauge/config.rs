//! Static gauge configuration: range, threshold bands, ticks and animation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::animation::Easing;

/// An sRGB colour written as `#rrggbb` (or `#rgb`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const GREEN: Rgb = Rgb::new(0x10, 0x96, 0x18);
    pub const YELLOW: Rgb = Rgb::new(0xff, 0x99, 0x00);
    pub const RED: Rgb = Rgb::new(0xdc, 0x39, 0x12);
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| format!("colour '{}' must start with '#'", s))?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("colour '{}' is not hexadecimal", s));
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|e| e.to_string());
        match hex.len() {
            6 => Ok(Rgb::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Rgb::new(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => Err(format!("colour '{}' must have 3 or 6 hex digits", s)),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A value range on the dial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub from: f64,
    pub to: f64,
}

impl Range {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }
}

/// A coloured band resolved against the gauge range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub from: f64,
    pub to: f64,
    pub color: Rgb,
}

/// Threshold bands. Any band may be left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandsConfig {
    #[serde(default)]
    pub green: Option<Range>,
    #[serde(default = "default_yellow")]
    pub yellow: Option<Range>,
    #[serde(default = "default_red")]
    pub red: Option<Range>,

    #[serde(default = "default_green_color")]
    pub green_color: Rgb,
    #[serde(default = "default_yellow_color")]
    pub yellow_color: Rgb,
    #[serde(default = "default_red_color")]
    pub red_color: Rgb,
}

fn default_yellow() -> Option<Range> {
    Some(Range::new(75.0, 90.0))
}

fn default_red() -> Option<Range> {
    Some(Range::new(90.0, 100.0))
}

fn default_green_color() -> Rgb {
    Rgb::GREEN
}

fn default_yellow_color() -> Rgb {
    Rgb::YELLOW
}

fn default_red_color() -> Rgb {
    Rgb::RED
}

impl Default for BandsConfig {
    fn default() -> Self {
        Self {
            green: None,
            yellow: default_yellow(),
            red: default_red(),
            green_color: Rgb::GREEN,
            yellow_color: Rgb::YELLOW,
            red_color: Rgb::RED,
        }
    }
}

/// Major tick marks: either how many, or their labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MajorTicks {
    Count(usize),
    Labels(Vec<String>),
}

impl Default for MajorTicks {
    fn default() -> Self {
        MajorTicks::Count(5)
    }
}

/// Needle animation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    #[serde(default)]
    pub easing: Easing,
}

fn default_duration_ms() -> u64 {
    800
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            easing: Easing::default(),
        }
    }
}

/// Everything that shapes the gauge apart from its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeConfig {
    /// Caption drawn inside the dial (e.g. a unit).
    #[serde(default = "default_label")]
    pub label: String,

    #[serde(default)]
    pub min: f64,

    #[serde(default = "default_max")]
    pub max: f64,

    /// Value shown before the first reading arrives.
    #[serde(default)]
    pub placeholder: f64,

    /// Decimals in the value caption.
    #[serde(default = "default_decimals")]
    pub decimals: usize,

    #[serde(default)]
    pub major_ticks: MajorTicks,

    /// Minor sections between two major ticks.
    #[serde(default = "default_minor_ticks")]
    pub minor_ticks: usize,

    #[serde(default)]
    pub bands: BandsConfig,

    #[serde(default)]
    pub animation: AnimationConfig,
}

fn default_label() -> String {
    "°C".to_string()
}

fn default_max() -> f64 {
    100.0
}

fn default_decimals() -> usize {
    1
}

fn default_minor_ticks() -> usize {
    5
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            min: 0.0,
            max: default_max(),
            placeholder: 0.0,
            decimals: default_decimals(),
            major_ticks: MajorTicks::default(),
            minor_ticks: default_minor_ticks(),
            bands: BandsConfig::default(),
            animation: AnimationConfig::default(),
        }
    }
}

/// Problems found while validating a [`GaugeConfig`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GaugeConfigError {
    #[error("gauge range is empty or not finite (min {min}, max {max})")]
    Range { min: f64, max: f64 },

    #[error("a gauge needs at least two major ticks")]
    MajorTicks,

    #[error("minor_ticks must be at least 1")]
    MinorTicks,

    #[error("{band} band is inverted ({from} > {to})")]
    Band { band: &'static str, from: f64, to: f64 },
}

impl GaugeConfig {
    /// Outdoor thermometer preset: -40 to 40 with a label per 10 degrees.
    pub fn outdoor_celsius() -> Self {
        Self {
            min: -40.0,
            max: 40.0,
            major_ticks: MajorTicks::Labels(
                (-4..=4).map(|i| (i * 10).to_string()).collect(),
            ),
            bands: BandsConfig {
                green: None,
                yellow: Some(Range::new(25.0, 32.0)),
                red: Some(Range::new(32.0, 40.0)),
                ..BandsConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), GaugeConfigError> {
        if !(self.min.is_finite() && self.max.is_finite() && self.min < self.max) {
            return Err(GaugeConfigError::Range {
                min: self.min,
                max: self.max,
            });
        }
        if self.major_tick_labels().len() < 2 {
            return Err(GaugeConfigError::MajorTicks);
        }
        if self.minor_ticks == 0 {
            return Err(GaugeConfigError::MinorTicks);
        }
        for (name, range) in [
            ("green", self.bands.green),
            ("yellow", self.bands.yellow),
            ("red", self.bands.red),
        ] {
            if let Some(range) = range {
                if range.from > range.to {
                    return Err(GaugeConfigError::Band {
                        band: name,
                        from: range.from,
                        to: range.to,
                    });
                }
            }
        }
        Ok(())
    }

    /// Width of the value range.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `value` on the dial in `0.0..=1.0`, clamped.
    pub fn ratio(&self, value: f64) -> f64 {
        if self.span() <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        ((value - self.min) / self.span()).clamp(0.0, 1.0)
    }

    /// Labels for the major ticks, evenly spaced from `min` to `max`.
    pub fn major_tick_labels(&self) -> Vec<String> {
        match &self.major_ticks {
            MajorTicks::Labels(labels) => labels.clone(),
            MajorTicks::Count(count) if *count >= 2 => {
                let step = self.span() / (*count - 1) as f64;
                (0..*count)
                    .map(|i| format_tick(self.min + step * i as f64))
                    .collect()
            }
            MajorTicks::Count(_) => Vec::new(),
        }
    }

    /// Bands clamped to the gauge range, in drawing order.
    ///
    /// Bands that fall outside the range or collapse to nothing are dropped.
    pub fn resolved_bands(&self) -> Vec<Band> {
        [
            (self.bands.green, self.bands.green_color),
            (self.bands.yellow, self.bands.yellow_color),
            (self.bands.red, self.bands.red_color),
        ]
        .into_iter()
        .filter_map(|(range, color)| {
            let range = range?;
            let from = range.from.max(self.min);
            let to = range.to.min(self.max);
            (from < to).then_some(Band { from, to, color })
        })
        .collect()
    }

    /// Format a value for the dial caption.
    pub fn format_value(&self, value: f64) -> String {
        format!("{:.*}", self.decimals, value)
    }
}

fn format_tick(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_gauge() {
        let config = GaugeConfig::default();
        assert_eq!(config.min, 0.0);
        assert_eq!(config.max, 100.0);
        assert_eq!(config.minor_ticks, 5);
        assert_eq!(config.animation.duration_ms, 800);
        assert_eq!(config.animation.easing, Easing::InAndOut);
        assert_eq!(config.major_tick_labels(), vec!["0", "25", "50", "75", "100"]);
        assert!(config.validate().is_ok());

        let bands = config.resolved_bands();
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].color, Rgb::YELLOW);
        assert_eq!((bands[1].from, bands[1].to), (90.0, 100.0));
    }

    #[test]
    fn test_outdoor_preset() {
        let config = GaugeConfig::outdoor_celsius();
        assert!(config.validate().is_ok());
        let labels = config.major_tick_labels();
        assert_eq!(labels.len(), 9);
        assert_eq!(labels.first().map(String::as_str), Some("-40"));
        assert_eq!(labels.last().map(String::as_str), Some("40"));
    }

    #[test]
    fn test_bands_are_clamped_to_range() {
        let config = GaugeConfig {
            min: -40.0,
            max: 40.0,
            ..GaugeConfig::default()
        };
        // Default yellow 75..90 and red 90..100 are entirely out of range.
        assert!(config.resolved_bands().is_empty());

        let config = GaugeConfig {
            max: 80.0,
            ..GaugeConfig::default()
        };
        let bands = config.resolved_bands();
        assert_eq!(bands.len(), 1);
        assert_eq!((bands[0].from, bands[0].to), (75.0, 80.0));
    }

    #[test]
    fn test_ratio_clamps() {
        let config = GaugeConfig::default();
        assert_eq!(config.ratio(50.0), 0.5);
        assert_eq!(config.ratio(-10.0), 0.0);
        assert_eq!(config.ratio(250.0), 1.0);
        assert_eq!(config.ratio(f64::NAN), 0.0);
    }

    #[test]
    fn test_validation_errors() {
        let inverted = GaugeConfig {
            min: 10.0,
            max: 10.0,
            ..GaugeConfig::default()
        };
        assert!(matches!(inverted.validate(), Err(GaugeConfigError::Range { .. })));

        let one_tick = GaugeConfig {
            major_ticks: MajorTicks::Count(1),
            ..GaugeConfig::default()
        };
        assert_eq!(one_tick.validate(), Err(GaugeConfigError::MajorTicks));

        let no_minor = GaugeConfig {
            minor_ticks: 0,
            ..GaugeConfig::default()
        };
        assert_eq!(no_minor.validate(), Err(GaugeConfigError::MinorTicks));

        let mut bad_band = GaugeConfig::default();
        bad_band.bands.red = Some(Range::new(100.0, 90.0));
        assert!(matches!(
            bad_band.validate(),
            Err(GaugeConfigError::Band { band: "red", .. })
        ));
    }

    #[test]
    fn test_rgb_parsing() {
        assert_eq!("#109618".parse::<Rgb>().unwrap(), Rgb::GREEN);
        assert_eq!("#f90".parse::<Rgb>().unwrap(), Rgb::YELLOW);
        assert_eq!(Rgb::RED.to_string(), "#dc3912");
        assert!("109618".parse::<Rgb>().is_err());
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#gggggg".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_parse_from_json5() {
        let config: GaugeConfig = json5::from_str(
            r##"{
                label: "",
                min: -40,
                max: 40,
                major_ticks: ["-40", "0", "40"],
                bands: { green: { from: -40, to: 0 }, green_color: "#00ff00", yellow: null },
                animation: { duration_ms: 0, easing: "linear" },
            }"##,
        )
        .unwrap();

        assert_eq!(config.label, "");
        assert_eq!(config.major_tick_labels(), vec!["-40", "0", "40"]);
        assert_eq!(config.bands.green_color, Rgb::new(0, 255, 0));
        assert_eq!(config.bands.yellow, None);
        assert_eq!(config.animation.easing, Easing::Linear);
        assert_eq!(config.minor_ticks, 5);
    }

    #[test]
    fn test_format_value() {
        let config = GaugeConfig::default();
        assert_eq!(config.format_value(21.46), "21.5");
        assert_eq!(config.format_value(68.0), "68.0");
    }
}
