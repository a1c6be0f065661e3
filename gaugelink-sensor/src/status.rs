//! Client status reporting.
//!
//! Status lives next to the devices: `clientModules/<client>/status` holds
//! the state and `clientModules/<client>/lastUpdate` the time of the last
//! successful poll (RFC 3339).

use chrono::{DateTime, SecondsFormat, Utc};

use gaugelink_common::{Reading, Store, StorePath};

use crate::error::Result;

/// Lifecycle state of the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientState {
    Running,
    /// Running but not publishing (`enabled: false`).
    Paused,
    Offline,
    Error(String),
}

impl ClientState {
    /// Text stored at the status path.
    pub fn as_text(&self) -> String {
        match self {
            ClientState::Running => "running".to_string(),
            ClientState::Paused => "paused".to_string(),
            ClientState::Offline => "offline".to_string(),
            ClientState::Error(error) => format!("error: {}", error),
        }
    }
}

/// Writes the client's state to the store.
#[derive(Debug, Clone)]
pub struct StatusReporter<S> {
    store: S,
    status_path: StorePath,
    last_update_path: StorePath,
}

impl<S: Store> StatusReporter<S> {
    /// Report under `client_root` (`clientModules/<client>`).
    pub fn new(store: S, client_root: &StorePath) -> Result<Self> {
        Ok(Self {
            store,
            status_path: client_root.child("status")?,
            last_update_path: client_root.child("lastUpdate")?,
        })
    }

    pub fn status_path(&self) -> &StorePath {
        &self.status_path
    }

    pub fn last_update_path(&self) -> &StorePath {
        &self.last_update_path
    }

    pub async fn report(&self, state: &ClientState) -> Result<()> {
        self.store
            .set(&self.status_path, &Reading::Text(state.as_text()))
            .await?;
        Ok(())
    }

    /// Record a successful poll at `at`.
    pub async fn touch(&self, at: DateTime<Utc>) -> Result<()> {
        let stamp = at.to_rfc3339_opts(SecondsFormat::Secs, true);
        self.store
            .set(&self.last_update_path, &Reading::Text(stamp))
            .await?;
        Ok(())
    }
}
