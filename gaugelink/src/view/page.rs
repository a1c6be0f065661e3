//! The gauge page: heading, dial, refresh control and submission form.

use std::time::Instant;

use iced::widget::{Column, button, column, container, row, text, text_input};
use iced::{Alignment, Element, Length, Theme};

use crate::bridge::GaugeBridge;
use crate::message::Message;

use super::gauge::{GaugeFace, gauge_view};
use super::theme::colors;

/// Side of the square gauge canvas.
pub const GAUGE_SIZE: f32 = 320.0;

/// Placeholder of the submission input.
pub const INPUT_PLACEHOLDER: &str = "Type a message";

/// State of the store connection as shown in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connection {
    Connecting,
    /// Connected through the named backend.
    Connected(&'static str),
    Disconnected(String),
}

/// Outcome of the last submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Sent(String),
    Failed(String),
}

/// Everything the page shows, borrowed from the application.
pub struct Page<'a> {
    pub bridge: &'a GaugeBridge,
    pub heading: Option<&'a str>,
    pub input: &'a str,
    pub connection: &'a Connection,
    pub notice: Option<&'a Notice>,
    /// Whether a store is available to submit to.
    pub can_submit: bool,
    pub now: Instant,
}

/// Render the page.
pub fn page_view(page: Page<'_>) -> Element<'_, Message> {
    let config = page.bridge.config();

    let face = GaugeFace::new(
        config,
        page.bridge.needle_value(page.now),
        page.bridge.displayed_value(),
    );

    let value_caption = if config.label.is_empty() {
        config.format_value(page.bridge.displayed_value())
    } else {
        format!(
            "{} {}",
            config.format_value(page.bridge.displayed_value()),
            config.label
        )
    };

    // Disabled while the needle is moving
    let refresh = button(text("Refresh").size(14))
        .on_press_maybe((!page.bridge.is_drawing()).then_some(Message::Refresh))
        .style(iced::widget::button::secondary);

    let gauge_column = column![
        heading_view(page.heading),
        gauge_view(face, GAUGE_SIZE),
        text(value_caption).size(18),
        refresh,
    ]
    .spacing(10)
    .align_x(Alignment::Center);

    let content: Column<'_, Message> = column![
        header_view(page.connection),
        gauge_column,
        submit_view(page.input, page.can_submit),
        notice_view(page.notice),
    ]
    .spacing(20)
    .padding(20)
    .align_x(Alignment::Center);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .into()
}

fn header_view(connection: &Connection) -> Element<'_, Message> {
    let title = text("GaugeLink").size(24);

    let status = match connection {
        Connection::Connecting => text("Connecting...")
            .size(14)
            .style(|t: &Theme| text::Style {
                color: Some(colors(t).status_unknown()),
            }),
        Connection::Connected(backend) => text(format!("Connected ({})", backend))
            .size(14)
            .style(|t: &Theme| text::Style {
                color: Some(colors(t).status_connected()),
            }),
        Connection::Disconnected(error) => text(format!("Disconnected: {}", error))
            .size(14)
            .style(|t: &Theme| text::Style {
                color: Some(colors(t).status_disconnected()),
            }),
    };

    row![title, status]
        .spacing(20)
        .align_y(Alignment::Center)
        .into()
}

fn heading_view(heading: Option<&str>) -> Element<'_, Message> {
    match heading {
        Some(heading) => text(heading).size(20).into(),
        None => text("No heading")
            .size(20)
            .style(|t: &Theme| text::Style {
                color: Some(colors(t).text_muted()),
            })
            .into(),
    }
}

fn submit_view(input: &str, can_submit: bool) -> Element<'_, Message> {
    let ready = can_submit && !input.trim().is_empty();

    let field = text_input(INPUT_PLACEHOLDER, input)
        .on_input(Message::InputChanged)
        .on_submit_maybe(ready.then_some(Message::Submit))
        .padding(8)
        .width(Length::Fixed(260.0));

    let submit = button(text("Submit").size(14))
        .on_press_maybe(ready.then_some(Message::Submit))
        .style(iced::widget::button::primary);

    row![field, submit]
        .spacing(10)
        .align_y(Alignment::Center)
        .into()
}

fn notice_view(notice: Option<&Notice>) -> Element<'_, Message> {
    match notice {
        Some(Notice::Sent(id)) => text(format!("Sent ({})", id)).size(12).into(),
        Some(Notice::Failed(error)) => text(format!("Submit failed: {}", error))
            .size(12)
            .style(|t: &Theme| text::Style {
                color: Some(colors(t).status_disconnected()),
            })
            .into(),
        None => text("").size(12).into(),
    }
}
