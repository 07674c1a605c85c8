//! Client configuration.
//!
//! A [`ConsulConfig`] can be built in code or loaded from TOML:
//!
//! ```toml
//! address = "http://consul.service.internal:8500"
//! datacenter = "eu-west"
//! timeout-secs = 10
//! user-agent = "inventory-sync/1.4"
//! ```
//!
//! Every field is optional; missing fields take the defaults below. Nothing
//! is read from the environment.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Address of a Consul agent running on the local host.
pub const DEFAULT_ADDRESS: &str = "http://localhost:8500";

/// Default timeout for requests, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for a [`ConsulClient`](crate::ConsulClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsulConfig {
    /// Base URL of the agent's HTTP API.
    #[serde(default = "default_address")]
    pub address: String,

    /// Datacenter callers should pass to endpoints taking one. The client
    /// itself never adds it to requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ConsulConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            datacenter: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl ConsulConfig {
    /// Configuration pointing at `address` with default settings otherwise.
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::Config(format!("invalid config: {}", e)))
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            let path = path.display();
            Error::Config(format!("failed to read config file '{path}': {e}"))
        })?;
        Self::from_toml(&content)
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
