//! Startup configuration for the robot agent
//!
//! Values are fixed once the agent starts; nothing is reloaded at runtime.

use crate::connection::LinkConfig;
use anyhow::{bail, Context, Result};
use robot_shared::{link, DeviceIdentity};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const ENV_SERVER_URI: &str = "ROBOT_SERVER_URI";
pub const ENV_DEVICE_ID: &str = "ROBOT_DEVICE_ID";
pub const ENV_RECONNECT_DELAY_MS: &str = "ROBOT_RECONNECT_DELAY_MS";
pub const ENV_RX_BUFFER_BYTES: &str = "ROBOT_RX_BUFFER_BYTES";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "ROBOT_CONNECT_TIMEOUT_MS";
pub const ENV_SEND_TIMEOUT_MS: &str = "ROBOT_SEND_TIMEOUT_MS";

/// Configuration for the agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Relay WebSocket endpoint
    pub server_uri: String,
    /// Identity announced on every connect
    pub device_id: String,
    /// Fixed delay between reconnect attempts
    pub reconnect_delay: Duration,
    /// Receive buffer size in bytes, including the terminator
    pub receive_buffer_capacity: usize,
    /// Link task timing and queue limits
    pub link: LinkConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            server_uri: "ws://127.0.0.1:8080".into(),
            device_id: "robot1".into(),
            reconnect_delay: Duration::from_millis(link::RECONNECT_DELAY_MS),
            receive_buffer_capacity: link::RECEIVE_BUFFER_CAPACITY,
            link: LinkConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Defaults overridden by `ROBOT_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(uri) = lookup(ENV_SERVER_URI) {
            config.server_uri = uri;
        }
        if let Some(id) = lookup(ENV_DEVICE_ID) {
            config.device_id = id;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_RECONNECT_DELAY_MS)? {
            config.reconnect_delay = Duration::from_millis(ms);
        }
        if let Some(bytes) = parse_var::<usize, _>(&lookup, ENV_RX_BUFFER_BYTES)? {
            config.receive_buffer_capacity = bytes;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_CONNECT_TIMEOUT_MS)? {
            config.link.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_SEND_TIMEOUT_MS)? {
            config.link.send_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Parse and check the relay endpoint
    pub fn server_url(&self) -> Result<Url> {
        let url = Url::parse(&self.server_uri)
            .with_context(|| format!("invalid server uri: {}", self.server_uri))?;
        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => bail!("unsupported scheme {:?} in {}", other, self.server_uri),
        }
    }

    /// Validate the configured device identity
    pub fn identity(&self) -> Result<DeviceIdentity> {
        DeviceIdentity::new(self.device_id.as_str())
            .with_context(|| format!("invalid device id: {:?}", self.device_id))
    }

    /// Check every field; any failure is fatal at startup
    pub fn validate(&self) -> Result<()> {
        self.server_url()?;
        self.identity()?;

        if self.reconnect_delay.is_zero() {
            bail!("reconnect delay must be greater than zero");
        }
        if !(2..=link::MAX_RECEIVE_BUFFER_CAPACITY).contains(&self.receive_buffer_capacity) {
            bail!(
                "receive buffer capacity must be between 2 and {} bytes, got {}",
                link::MAX_RECEIVE_BUFFER_CAPACITY,
                self.receive_buffer_capacity
            );
        }
        if self.link.connect_timeout.is_zero() || self.link.send_timeout.is_zero() {
            bail!("link timeouts must be greater than zero");
        }

        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("invalid value for {}: {:?}", key, raw))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.device_id, "robot1");
        assert_eq!(config.reconnect_delay, Duration::from_secs(5));
        assert_eq!(config.receive_buffer_capacity, 64);
        config.validate().unwrap();
    }

    #[test]
    fn test_overrides() {
        let config = AgentConfig::from_lookup(lookup_from(&[
            (ENV_SERVER_URI, "ws://192.168.0.107:8080"),
            (ENV_DEVICE_ID, "robot7"),
            (ENV_RECONNECT_DELAY_MS, "2500"),
            (ENV_RX_BUFFER_BYTES, " 128 "),
            (ENV_SEND_TIMEOUT_MS, "750"),
        ]))
        .unwrap();

        assert_eq!(config.server_url().unwrap().host_str(), Some("192.168.0.107"));
        assert_eq!(config.identity().unwrap().as_str(), "robot7");
        assert_eq!(config.reconnect_delay, Duration::from_millis(2500));
        assert_eq!(config.receive_buffer_capacity, 128);
        assert_eq!(config.link.send_timeout, Duration::from_millis(750));
        config.validate().unwrap();
    }

    #[test]
    fn test_unparseable_number() {
        let err = AgentConfig::from_lookup(lookup_from(&[(ENV_RECONNECT_DELAY_MS, "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_RECONNECT_DELAY_MS));
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = AgentConfig {
            server_uri: "http://127.0.0.1:8080".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.server_uri = "not a uri".into();
        assert!(config.validate().is_err());

        config = AgentConfig {
            device_id: "robot:1".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config = AgentConfig {
            receive_buffer_capacity: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config = AgentConfig {
            reconnect_delay: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
