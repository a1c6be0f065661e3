use std::time::Duration;

use iced::Subscription;

use gaugelink_common::{
    AnyStore, MemoryStore, Snapshot, Store, StoreConfig, StorePath, Watch, ZenohConfig, ZenohStore,
};

use crate::demo::DemoFeed;
use crate::message::Message;

/// Interval between animation frames (about 60 per second).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// First wait before retrying a failed store open.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Longest wait between store open attempts.
pub const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);

/// Interval between simulated readings in demo mode.
pub const DEMO_INTERVAL: Duration = Duration::from_secs(2);

/// Where the page's values come from. Changing any field restarts the
/// store subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreSettings {
    pub zenoh: ZenohConfig,
    pub store: StoreConfig,
    pub reading: StorePath,
    pub heading: Option<StorePath>,
    /// Use an in-process store fed by the demo simulator.
    pub demo: bool,
}

/// Create a subscription that opens the store and watches the bound paths.
///
/// Yields [`Message::Connected`] once, then one message per notification.
/// The first notification of each watch carries the current value. A failed
/// open yields [`Message::Disconnected`] and is retried with backoff.
pub fn store_subscription(settings: StoreSettings) -> Subscription<Message> {
    Subscription::run_with(settings, move |settings| {
        let settings = settings.clone();
        async_stream::stream! {
            let mut attempt = 0;
            let (store, _feed) = loop {
                match open_store(&settings).await {
                    Ok(opened) => break opened,
                    Err(e) => {
                        let delay = reconnect_delay(attempt);
                        tracing::error!(
                            error = %e,
                            retry_in_secs = delay.as_secs(),
                            "Failed to open store"
                        );
                        yield Message::Disconnected(e.to_string());
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                }
            };
            tracing::info!(backend = store.backend(), "Store opened");
            yield Message::Connected(store.clone());

            let mut reading = match store.watch(&settings.reading).await {
                Ok(watch) => watch,
                Err(e) => {
                    tracing::error!(error = %e, path = %settings.reading, "Failed to watch reading");
                    yield Message::Disconnected(e.to_string());
                    return;
                }
            };

            let mut heading = match &settings.heading {
                Some(path) => match store.watch(path).await {
                    Ok(watch) => Some(watch),
                    Err(e) => {
                        tracing::warn!(error = %e, path = %path, "Failed to watch heading");
                        None
                    }
                },
                None => None,
            };

            loop {
                let message = tokio::select! {
                    snapshot = reading.next() => match snapshot {
                        Some(snapshot) => Message::ReadingReceived(snapshot),
                        None => Message::Disconnected("Reading watch ended".to_string()),
                    },
                    Some(snapshot) = next_heading(&mut heading) => Message::HeadingReceived(snapshot),
                };

                let ended = matches!(message, Message::Disconnected(_));
                yield message;
                if ended {
                    return;
                }
            }
        }
    })
}

/// Wait before open attempt `attempt + 1`: doubles from
/// [`RECONNECT_DELAY`] up to [`MAX_RECONNECT_DELAY`].
pub fn reconnect_delay(attempt: u32) -> Duration {
    RECONNECT_DELAY
        .saturating_mul(2u32.saturating_pow(attempt.min(16)))
        .min(MAX_RECONNECT_DELAY)
}

/// Open the configured backend. In demo mode the returned feed keeps the
/// simulator running.
async fn open_store(
    settings: &StoreSettings,
) -> gaugelink_common::Result<(AnyStore, Option<DemoFeed>)> {
    if settings.demo {
        let store = MemoryStore::new();
        let feed = DemoFeed::start(
            store.clone(),
            settings.reading.clone(),
            settings.heading.clone(),
            DEMO_INTERVAL,
        );
        return Ok((store.into(), Some(feed)));
    }

    let store = ZenohStore::connect(&settings.zenoh, settings.store.clone()).await?;
    Ok((store.into(), None))
}

async fn next_heading(watch: &mut Option<Watch>) -> Option<Snapshot> {
    match watch {
        Some(watch) => watch.next().await,
        None => std::future::pending().await,
    }
}

/// Animation frames, only while a draw is in progress.
pub fn frame_subscription(drawing: bool) -> Subscription<Message> {
    if drawing {
        iced::time::every(FRAME_INTERVAL).map(|_| Message::Frame)
    } else {
        Subscription::none()
    }
}
