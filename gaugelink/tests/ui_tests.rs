//! UI tests using iced_test Simulator.
//!
//! These tests verify the page without a Zenoh connection.

use std::time::Instant;

use iced_test::simulator;

use gaugelink::bridge::GaugeBridge;
use gaugelink::gauge::GaugeConfig;
use gaugelink::message::Message;
use gaugelink::view::{Connection, Notice, Page, page_view};
use gaugelink::{AppConfig, GaugeLink};
use gaugelink_common::{Reading, Snapshot, StorePath};

fn snapshot(value: f64) -> Snapshot {
    Snapshot {
        path: StorePath::new("Current Temperature").unwrap(),
        value: Some(Reading::Number(value)),
        timestamp: Some(1),
    }
}

fn page<'a>(
    bridge: &'a GaugeBridge,
    input: &'a str,
    connection: &'a Connection,
    can_submit: bool,
) -> Page<'a> {
    Page {
        bridge,
        heading: None,
        input,
        connection,
        notice: None,
        can_submit,
        now: Instant::now(),
    }
}

/// Before any reading the placeholder value is shown.
#[test]
fn test_page_shows_placeholder() {
    let bridge = GaugeBridge::new(GaugeConfig::default());
    let connection = Connection::Connecting;
    let mut ui = simulator(page_view(page(&bridge, "", &connection, false)));

    assert!(ui.find("0.0 °C").is_ok());
    assert!(ui.find("Connecting...").is_ok());
    assert!(ui.find("No heading").is_ok());
}

/// The caption follows the latest reading.
#[test]
fn test_page_shows_latest_reading() {
    let mut bridge = GaugeBridge::new(GaugeConfig::default());
    let now = Instant::now();
    bridge.on_reading(&snapshot(68.0), now);
    bridge.on_reading(&snapshot(30.0), now);

    let connection = Connection::Connected("memory");
    let mut ui = simulator(page_view(page(&bridge, "", &connection, true)));

    assert!(ui.find("30.0 °C").is_ok());
    assert!(ui.find("68.0 °C").is_err());
    assert!(ui.find("Connected (memory)").is_ok());
}

/// The heading text is shown above the gauge.
#[test]
fn test_page_shows_heading() {
    let bridge = GaugeBridge::new(GaugeConfig::default());
    let connection = Connection::Connected("zenoh");
    let mut view = page(&bridge, "", &connection, true);
    view.heading = Some("North-East");
    let mut ui = simulator(page_view(view));

    assert!(ui.find("North-East").is_ok());
}

/// Refresh is clickable while the gauge is idle.
#[test]
fn test_refresh_enabled_when_idle() {
    let bridge = GaugeBridge::new(GaugeConfig::default());
    let connection = Connection::Connecting;
    let mut ui = simulator(page_view(page(&bridge, "", &connection, false)));

    let _ = ui.click("Refresh");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(messages.iter().any(|m| matches!(m, Message::Refresh)));
}

/// Refresh is disabled during an animated draw.
#[test]
fn test_refresh_disabled_while_drawing() {
    let mut bridge = GaugeBridge::new(GaugeConfig::default());
    bridge.on_reading(&snapshot(68.0), Instant::now());
    assert!(bridge.is_drawing());

    let connection = Connection::Connecting;
    let mut ui = simulator(page_view(page(&bridge, "", &connection, false)));

    let _ = ui.click("Refresh");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(!messages.iter().any(|m| matches!(m, Message::Refresh)));
}

/// Clicking Submit with text produces exactly one Submit message.
#[test]
fn test_submit_button_sends_once() {
    let bridge = GaugeBridge::new(GaugeConfig::default());
    let connection = Connection::Connected("memory");
    let mut ui = simulator(page_view(page(&bridge, "hello", &connection, true)));

    let _ = ui.click("Submit");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert_eq!(
        messages
            .iter()
            .filter(|m| matches!(m, Message::Submit))
            .count(),
        1
    );
}

/// Submit does nothing with an empty input.
#[test]
fn test_submit_disabled_when_empty() {
    let bridge = GaugeBridge::new(GaugeConfig::default());
    let connection = Connection::Connected("memory");
    let mut ui = simulator(page_view(page(&bridge, "   ", &connection, true)));

    let _ = ui.click("Submit");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(!messages.iter().any(|m| matches!(m, Message::Submit)));
}

/// Submit does nothing without a store.
#[test]
fn test_submit_disabled_when_disconnected() {
    let bridge = GaugeBridge::new(GaugeConfig::default());
    let connection = Connection::Disconnected("no route".to_string());
    let mut ui = simulator(page_view(page(&bridge, "hello", &connection, false)));

    assert!(ui.find("Disconnected: no route").is_ok());
    let _ = ui.click("Submit");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(!messages.iter().any(|m| matches!(m, Message::Submit)));
}

/// A failed submission is reported on the page.
#[test]
fn test_failed_submission_notice() {
    let bridge = GaugeBridge::new(GaugeConfig::default());
    let connection = Connection::Connected("zenoh");
    let notice = Notice::Failed("store closed".to_string());
    let mut view = page(&bridge, "", &connection, true);
    view.notice = Some(&notice);
    let mut ui = simulator(page_view(view));

    assert!(ui.find("Submit failed: store closed").is_ok());
}

/// The full application view renders in demo mode.
#[test]
fn test_app_view_renders() {
    let mut app = GaugeLink::new(&AppConfig::default(), true).unwrap();
    let _ = app.update(Message::ReadingReceived(snapshot(21.5)));

    let mut ui = simulator(app.view());
    assert!(ui.find("21.5 °C").is_ok());
    assert!(ui.find("GaugeLink").is_ok());
}
