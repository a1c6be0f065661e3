use std::fmt;
use std::str::FromStr;

use zenoh::Session;

use crate::config::ZenohConfig;
use crate::error::{Error, Result};

/// Zenoh node role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZenohMode {
    Client,
    Peer,
    Router,
}

impl ZenohMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZenohMode::Client => "client",
            ZenohMode::Peer => "peer",
            ZenohMode::Router => "router",
        }
    }
}

impl FromStr for ZenohMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "client" => Ok(ZenohMode::Client),
            "peer" => Ok(ZenohMode::Peer),
            "router" => Ok(ZenohMode::Router),
            other => Err(Error::Config(format!(
                "Invalid Zenoh mode: '{}'. Expected 'client', 'peer', or 'router'",
                other
            ))),
        }
    }
}

impl fmt::Display for ZenohMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translate a [`ZenohConfig`] into a native Zenoh configuration.
pub fn build_zenoh_config(config: &ZenohConfig) -> Result<zenoh::Config> {
    let mode: ZenohMode = config.mode.parse()?;
    let mut zenoh_config = zenoh::Config::default();

    zenoh_config
        .insert_json5("mode", &format!("\"{}\"", mode))
        .map_err(|e| Error::Config(format!("Failed to set mode: {}", e)))?;

    for (key, endpoints) in [
        ("connect/endpoints", &config.connect),
        ("listen/endpoints", &config.listen),
    ] {
        if endpoints.is_empty() {
            continue;
        }
        let json = serde_json::to_string(endpoints)?;
        zenoh_config
            .insert_json5(key, &json)
            .map_err(|e| Error::Config(format!("Failed to set {}: {}", key, e)))?;
    }

    Ok(zenoh_config)
}

/// Open a Zenoh session using the provided configuration.
pub async fn connect(config: &ZenohConfig) -> Result<Session> {
    let zenoh_config = build_zenoh_config(config)?;

    tracing::info!(
        mode = %config.mode,
        connect = ?config.connect,
        listen = ?config.listen,
        "Connecting to Zenoh"
    );

    let session = zenoh::open(zenoh_config).await?;

    tracing::info!(zid = %session.zid(), "Connected to Zenoh");

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("client".parse::<ZenohMode>().unwrap(), ZenohMode::Client);
        assert_eq!("peer".parse::<ZenohMode>().unwrap(), ZenohMode::Peer);
        assert_eq!("router".parse::<ZenohMode>().unwrap(), ZenohMode::Router);
        assert!("mesh".parse::<ZenohMode>().is_err());
    }

    #[test]
    fn test_build_config_rejects_bad_mode() {
        let config = ZenohConfig {
            mode: "bogus".to_string(),
            ..ZenohConfig::default()
        };
        assert!(matches!(build_zenoh_config(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_build_config_with_endpoints() {
        let config = ZenohConfig {
            mode: "client".to_string(),
            connect: vec!["tcp/127.0.0.1:7447".to_string()],
            listen: vec![],
        };
        assert!(build_zenoh_config(&config).is_ok());
    }
}
