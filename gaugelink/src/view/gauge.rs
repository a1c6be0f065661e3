//! Dial gauge drawn with the Iced canvas.

use iced::mouse;
use iced::widget::canvas::{self, Canvas, Frame, Geometry, Path, Stroke, Text};
use iced::{Element, Length, Point, Rectangle, Renderer, Size, Theme};

use crate::gauge::{Dial, GaugeConfig};
use crate::message::Message;

use super::theme::{band_color, colors};

/// One frame of the gauge: configuration plus where the needle is.
pub struct GaugeFace<'a> {
    config: &'a GaugeConfig,
    /// Needle position (may be mid-sweep).
    needle: f64,
    /// Value printed under the hub.
    value: f64,
}

impl<'a> GaugeFace<'a> {
    pub fn new(config: &'a GaugeConfig, needle: f64, value: f64) -> Self {
        Self {
            config,
            needle,
            value,
        }
    }
}

impl canvas::Program<Message> for GaugeFace<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        self.draw_face(&mut frame, bounds.size(), theme);
        vec![frame.into_geometry()]
    }
}

impl GaugeFace<'_> {
    fn draw_face(&self, frame: &mut Frame, size: Size, theme: &Theme) {
        let dial = Dial::fit(size);
        if dial.radius <= 0.0 {
            return;
        }
        let palette = colors(theme);

        let face = Path::circle(dial.center, dial.radius);
        frame.fill(&face, palette.dial_face());
        frame.stroke(
            &face,
            Stroke::default()
                .with_color(palette.dial_rim())
                .with_width(2.0),
        );

        for band in self.config.resolved_bands() {
            let points = dial.band_arc(self.config, &band);
            let arc = polyline(&points);
            frame.stroke(
                &arc,
                Stroke::default()
                    .with_color(band_color(band.color))
                    .with_width(dial.band_width()),
            );
        }

        for tick in dial.ticks(self.config) {
            let width = if tick.major { 2.0 } else { 1.0 };
            frame.stroke(
                &Path::line(tick.from, tick.to),
                Stroke::default()
                    .with_color(palette.dial_ticks())
                    .with_width(width),
            );
        }

        let label_size = (dial.radius * 0.1).max(9.0);
        for label in dial.tick_labels(self.config) {
            frame.fill_text(Text {
                content: label.text,
                position: label.position,
                color: palette.dial_ticks(),
                size: label_size.into(),
                align_x: iced::alignment::Horizontal::Center.into(),
                align_y: iced::alignment::Vertical::Center.into(),
                ..Text::default()
            });
        }

        if !self.config.label.is_empty() {
            frame.fill_text(Text {
                content: self.config.label.clone(),
                position: dial.caption_position(),
                color: palette.text_muted(),
                size: (dial.radius * 0.14).max(10.0).into(),
                align_x: iced::alignment::Horizontal::Center.into(),
                align_y: iced::alignment::Vertical::Center.into(),
                ..Text::default()
            });
        }

        frame.fill_text(Text {
            content: self.config.format_value(self.value),
            position: dial.value_position(),
            color: palette.text(),
            size: (dial.radius * 0.18).max(12.0).into(),
            align_x: iced::alignment::Horizontal::Center.into(),
            align_y: iced::alignment::Vertical::Center.into(),
            ..Text::default()
        });

        let needle = dial.needle(self.config, self.needle);
        frame.stroke(
            &Path::line(needle.tail, needle.tip),
            Stroke::default()
                .with_color(palette.needle())
                .with_width((dial.radius * 0.03).max(2.0)),
        );
        frame.fill(
            &Path::circle(dial.center, (dial.radius * 0.06).max(3.0)),
            palette.needle(),
        );
    }
}

fn polyline(points: &[Point]) -> Path {
    let mut builder = canvas::path::Builder::new();
    for (i, point) in points.iter().enumerate() {
        if i == 0 {
            builder.move_to(*point);
        } else {
            builder.line_to(*point);
        }
    }
    builder.build()
}

/// The gauge as a square canvas element.
pub fn gauge_view(face: GaugeFace<'_>, side: f32) -> Element<'_, Message> {
    Canvas::new(face)
        .width(Length::Fixed(side))
        .height(Length::Fixed(side))
        .into()
}
