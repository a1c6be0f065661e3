//! Theme-aware colours for the gauge page.
//!
//! Use these instead of hardcoded `Color::from_rgb()` values so the page
//! follows light and dark themes.

use iced::{Color, Theme};

use crate::gauge::Rgb;

/// Colours derived from the theme's extended palette.
pub struct ThemeColors<'a> {
    theme: &'a Theme,
}

impl<'a> ThemeColors<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    fn palette(&self) -> &iced::theme::palette::Extended {
        self.theme.extended_palette()
    }

    pub fn is_dark(&self) -> bool {
        self.palette().is_dark
    }

    // ========================================================================
    // Text
    // ========================================================================

    pub fn text(&self) -> Color {
        self.palette().background.base.text
    }

    /// Muted/secondary text colour.
    pub fn text_muted(&self) -> Color {
        self.palette().background.weak.text
    }

    // ========================================================================
    // Dial
    // ========================================================================

    /// Face of the dial.
    pub fn dial_face(&self) -> Color {
        if self.is_dark() {
            Color::from_rgb(0.12, 0.12, 0.14)
        } else {
            Color::from_rgb(0.98, 0.98, 0.99)
        }
    }

    /// Outer ring of the dial.
    pub fn dial_rim(&self) -> Color {
        if self.is_dark() {
            Color::from_rgb(0.35, 0.35, 0.4)
        } else {
            Color::from_rgb(0.7, 0.7, 0.72)
        }
    }

    /// Tick marks and their labels.
    pub fn dial_ticks(&self) -> Color {
        if self.is_dark() {
            Color::from_rgb(0.7, 0.7, 0.72)
        } else {
            Color::from_rgb(0.3, 0.3, 0.32)
        }
    }

    /// The needle and its hub.
    pub fn needle(&self) -> Color {
        Color::from_rgb(0.86, 0.22, 0.07)
    }

    // ========================================================================
    // Status (consistent across themes for recognition)
    // ========================================================================

    pub fn status_connected(&self) -> Color {
        Color::from_rgb(0.2, 0.8, 0.2)
    }

    pub fn status_disconnected(&self) -> Color {
        Color::from_rgb(0.8, 0.2, 0.2)
    }

    pub fn status_unknown(&self) -> Color {
        if self.is_dark() {
            Color::from_rgb(0.5, 0.5, 0.5)
        } else {
            Color::from_rgb(0.6, 0.6, 0.6)
        }
    }
}

/// Convenience function to create ThemeColors.
pub fn colors(theme: &Theme) -> ThemeColors<'_> {
    ThemeColors::new(theme)
}

/// Band colour as an iced colour.
pub fn band_color(rgb: Rgb) -> Color {
    Color::from_rgb8(rgb.r, rgb.g, rgb.b)
}
