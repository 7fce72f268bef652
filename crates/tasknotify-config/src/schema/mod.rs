//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::time::Duration;

mod schema_delivery;

pub use schema_delivery::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub hub: HubConfig,

    #[serde(default)]
    pub email: EmailConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Notification client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Page origin the socket address is derived from (`http`/`https`/`ws`/`wss`).
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Socket path on the origin.
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,

    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

impl ClientConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            path: default_path(),
            heartbeat_interval_secs: default_heartbeat_interval(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

fn default_origin() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_path() -> String {
    "/ws".to_string()
}

fn default_heartbeat_interval() -> u64 {
    25
}

/// Fixed-delay reconnect policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl ReconnectConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_delay_ms() -> u64 {
    3000
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Also write daily-rotated log files.
    #[serde(default = "default_true")]
    pub file: bool,

    /// Log directory (default: ~/.tasknotify/logs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: default_true(),
            directory: None,
        }
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
