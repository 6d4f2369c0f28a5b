//! xComfort integration configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the xComfort integration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct XComfortConfig {
    /// Whether the integration is started at all.
    pub enabled: bool,
    /// IP address of the bridge. Also the hub id.
    pub ip: String,
    /// Name used in entity unique ids. Defaults to `ip` when unset.
    pub identifier: Option<String>,
    /// How long a rocker binary sensor stays `on` after a press, in milliseconds.
    pub momentary_reset_ms: u64,
    /// How long to wait for the bridge to report its devices and rooms, in seconds.
    pub discovery_timeout_secs: u16,
    /// Capacity of the inbound bridge message queue.
    pub feed_capacity: usize,
}

impl XComfortConfig {
    #[must_use]
    pub fn momentary_reset(&self) -> Duration {
        Duration::from_millis(self.momentary_reset_ms)
    }

    #[must_use]
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.discovery_timeout_secs))
    }
}

impl Default for XComfortConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ip: String::new(),
            identifier: None,
            momentary_reset_ms: 500,
            discovery_timeout_secs: 30,
            feed_capacity: 256,
        }
    }
}
