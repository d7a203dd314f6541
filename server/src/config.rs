//! Relay configuration

use anyhow::{Context, Result};
use std::net::SocketAddr;

pub const ENV_BIND_ADDR: &str = "RELAY_BIND_ADDR";

/// Configuration for the relay server
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address the WebSocket listener binds to
    pub bind_addr: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".into(),
        }
    }
}

impl RelayConfig {
    /// Defaults overridden by `RELAY_BIND_ADDR`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var(ENV_BIND_ADDR) {
            config.bind_addr = addr;
        }
        config
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind_addr
            .parse()
            .with_context(|| format!("invalid bind address: {}", self.bind_addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bind_addr() {
        let addr = RelayConfig::default().bind_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_invalid_bind_addr() {
        let config = RelayConfig {
            bind_addr: "localhost".into(),
        };
        assert!(config.bind_addr().is_err());
    }
}
