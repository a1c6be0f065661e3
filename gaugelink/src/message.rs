use gaugelink_common::{AnyStore, Snapshot};

/// Messages for the GaugeLink application.
#[derive(Debug, Clone)]
pub enum Message {
    /// Store opened; submissions go through this handle.
    Connected(AnyStore),

    /// Store connection failed or the watch ended.
    Disconnected(String),

    /// Notification for the gauge's reading path.
    ReadingReceived(Snapshot),

    /// Notification for the heading path.
    HeadingReceived(Snapshot),

    /// Animation frame while a draw is running.
    Frame,

    /// User pressed Refresh.
    Refresh,

    /// User edited the submission input.
    InputChanged(String),

    /// User pressed Submit (or Enter in the input).
    Submit,

    /// Result of an append: the new record id, or the error text.
    Submitted(Result<String, String>),
}
