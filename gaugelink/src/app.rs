//! GaugeLink Iced application.

use std::time::Instant;

use iced::{Element, Subscription, Task, Theme};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use gaugelink_common::{AnyStore, StorePath};

use crate::bridge::{DrawEvent, GaugeBridge, SubmitBridge};
use crate::config::AppConfig;
use crate::message::Message;
use crate::subscription::{StoreSettings, frame_subscription, store_subscription};
use crate::view::{Connection, Notice, Page, page_view};

/// The GaugeLink application.
#[derive(Debug, Clone)]
pub struct GaugeLink {
    /// Store backend and watched paths.
    settings: StoreSettings,
    /// Collection submissions are appended to.
    submissions: StorePath,
    bridge: GaugeBridge,
    heading: Option<String>,
    input: String,
    connection: Connection,
    submit: Option<SubmitBridge<AnyStore>>,
    notice: Option<Notice>,
    rng: SmallRng,
    /// Time of the last processed message; the needle is drawn for it.
    now: Instant,
}

impl GaugeLink {
    /// Build the application state from a validated configuration.
    pub fn new(config: &AppConfig, demo: bool) -> gaugelink_common::Result<Self> {
        let settings = StoreSettings {
            zenoh: config.zenoh.clone(),
            store: config.store.clone(),
            reading: config.bindings.reading_path()?,
            heading: config.bindings.heading_path()?,
            demo,
        };

        Ok(Self {
            settings,
            submissions: config.bindings.submissions_path()?,
            bridge: GaugeBridge::new(config.gauge.clone()),
            heading: None,
            input: String::new(),
            connection: Connection::Connecting,
            submit: None,
            notice: None,
            rng: SmallRng::from_os_rng(),
            now: Instant::now(),
        })
    }

    /// Boot the application (called by iced::application).
    pub fn boot(self) -> (Self, Task<Message>) {
        (self, Task::none())
    }

    /// Get the window title.
    pub fn title(&self) -> String {
        if self.bridge.has_reading() {
            let config = self.bridge.config();
            format!(
                "GaugeLink - {} {}",
                config.format_value(self.bridge.displayed_value()),
                config.label
            )
            .trim_end()
            .to_string()
        } else {
            "GaugeLink".to_string()
        }
    }

    /// Handle incoming messages.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        self.now = Instant::now();

        match message {
            Message::Connected(store) => {
                tracing::info!(backend = store.backend(), "Connected to store");
                self.connection = Connection::Connected(store.backend());
                self.submit = Some(SubmitBridge::new(store, self.submissions.clone()));
            }

            Message::Disconnected(error) => {
                tracing::warn!(error = %error, "Disconnected from store");
                self.connection = Connection::Disconnected(error);
                self.submit = None;
            }

            Message::ReadingReceived(snapshot) => {
                self.bridge.on_reading(&snapshot, self.now);
            }

            Message::HeadingReceived(snapshot) => {
                self.heading = snapshot.value.map(|reading| reading.to_string());
            }

            Message::Frame => {
                if let Some(DrawEvent::Ready) = self.bridge.advance(self.now) {
                    tracing::trace!(value = self.bridge.displayed_value(), "Gauge draw ready");
                }
            }

            Message::Refresh => {
                if let Some(value) = self.bridge.refresh(&mut self.rng, self.now) {
                    tracing::debug!(value, "Showing demo value");
                }
            }

            Message::InputChanged(input) => {
                self.input = input;
            }

            Message::Submit => {
                return self.submit();
            }

            Message::Submitted(Ok(id)) => {
                self.notice = Some(Notice::Sent(id));
            }

            Message::Submitted(Err(error)) => {
                tracing::warn!(error = %error, "Submission failed");
                self.notice = Some(Notice::Failed(error));
            }
        }

        Task::none()
    }

    /// Append the input to the store and clear it.
    fn submit(&mut self) -> Task<Message> {
        let Some(bridge) = self.submit.clone() else {
            tracing::debug!("Submit ignored: no store");
            return Task::none();
        };
        if self.input.trim().is_empty() {
            return Task::none();
        }

        let text = std::mem::take(&mut self.input);
        Task::perform(
            async move { bridge.submit(&text).await.map_err(|e| e.to_string()) },
            Message::Submitted,
        )
    }

    /// Store notifications, plus animation frames while drawing.
    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            store_subscription(self.settings.clone()),
            frame_subscription(self.bridge.is_drawing()),
        ])
    }

    /// Render the view.
    pub fn view(&self) -> Element<'_, Message> {
        page_view(Page {
            bridge: &self.bridge,
            heading: self.heading.as_deref(),
            input: &self.input,
            connection: &self.connection,
            notice: self.notice.as_ref(),
            can_submit: self.submit.is_some(),
            now: self.now,
        })
    }

    /// Get the application theme.
    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    pub fn bridge(&self) -> &GaugeBridge {
        &self.bridge
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn heading(&self) -> Option<&str> {
        self.heading.as_deref()
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaugelink_common::{MemoryStore, Reading, Snapshot};

    fn app() -> GaugeLink {
        GaugeLink::new(&AppConfig::default(), true).unwrap()
    }

    fn reading(value: f64) -> Message {
        Message::ReadingReceived(Snapshot {
            path: StorePath::new("Current Temperature").unwrap(),
            value: Some(Reading::Number(value)),
            timestamp: Some(1),
        })
    }

    #[test]
    fn test_starts_with_placeholder() {
        let app = app();
        assert_eq!(app.bridge().displayed_value(), 0.0);
        assert_eq!(app.connection(), &Connection::Connecting);
        assert_eq!(app.title(), "GaugeLink");
    }

    #[test]
    fn test_last_reading_wins() {
        let mut app = app();
        for value in [0.0, 68.0, 30.0] {
            let _ = app.update(reading(value));
            assert_eq!(app.bridge().displayed_value(), value);
        }
        assert_eq!(app.title(), "GaugeLink - 30.0 °C");
    }

    #[test]
    fn test_heading_updates() {
        let mut app = app();
        let path = StorePath::new("Heading").unwrap();
        let _ = app.update(Message::HeadingReceived(Snapshot {
            path: path.clone(),
            value: Some(Reading::from("North")),
            timestamp: Some(1),
        }));
        assert_eq!(app.heading(), Some("North"));

        let _ = app.update(Message::HeadingReceived(Snapshot::empty(path)));
        assert_eq!(app.heading(), None);
    }

    #[test]
    fn test_connection_enables_submit() {
        let mut app = app();
        let _ = app.update(Message::Connected(MemoryStore::new().into()));
        assert_eq!(app.connection(), &Connection::Connected("memory"));

        let _ = app.update(Message::Disconnected("gone".to_string()));
        assert_eq!(
            app.connection(),
            &Connection::Disconnected("gone".to_string())
        );
    }

    #[test]
    fn test_submit_clears_input() {
        let mut app = app();
        let _ = app.update(Message::Connected(MemoryStore::new().into()));
        let _ = app.update(Message::InputChanged("hello".to_string()));
        assert_eq!(app.input(), "hello");

        let _ = app.update(Message::Submit);
        assert_eq!(app.input(), "");

        let _ = app.update(Message::InputChanged("again".to_string()));
        assert_eq!(app.input(), "again");
    }

    #[test]
    fn test_submit_without_store_keeps_input() {
        let mut app = app();
        let _ = app.update(Message::InputChanged("hello".to_string()));
        let _ = app.update(Message::Submit);
        assert_eq!(app.input(), "hello");
    }

    #[test]
    fn test_submission_outcome_is_shown() {
        let mut app = app();
        let _ = app.update(Message::Submitted(Ok("-Nabc".to_string())));
        assert_eq!(app.notice(), Some(&Notice::Sent("-Nabc".to_string())));

        let _ = app.update(Message::Submitted(Err("closed".to_string())));
        assert_eq!(app.notice(), Some(&Notice::Failed("closed".to_string())));
    }
}
