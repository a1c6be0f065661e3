//! GaugeLink - live gauge for a realtime store value.
//!
//! This library exposes the core components for testing.

pub mod app;
pub mod bridge;
pub mod config;
pub mod demo;
pub mod gauge;
pub mod message;
pub mod subscription;
pub mod view;

// Re-export commonly used types
pub use app::GaugeLink;
pub use bridge::{DrawEvent, GaugeBridge, SubmitBridge, SubmitError};
pub use config::AppConfig;
pub use message::Message;
