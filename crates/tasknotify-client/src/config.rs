//! Client configuration.

use std::time::Duration;

/// Notification client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Page origin the socket address is derived from.
    pub origin: String,
    /// Socket path on the origin.
    pub path: String,
    /// Interval between liveness pings while open.
    pub heartbeat_interval: Duration,
    /// Close-triggered retries allowed before giving up.
    pub max_reconnect_attempts: u32,
    /// Fixed wait before each retry.
    pub reconnect_delay: Duration,
}

impl ClientConfig {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:8080".to_string(),
            path: "/ws".to_string(),
            heartbeat_interval: Duration::from_secs(25),
            max_reconnect_attempts: 5,
            reconnect_delay: Duration::from_secs(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.path, "/ws");
        assert_eq!(config.heartbeat_interval, Duration::from_secs(25));
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.reconnect_delay, Duration::from_secs(3));
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new("https://tasks.example.com")
            .with_path("/socket")
            .with_heartbeat_interval(Duration::from_secs(5))
            .with_max_reconnect_attempts(2)
            .with_reconnect_delay(Duration::from_millis(100));
        assert_eq!(config.origin, "https://tasks.example.com");
        assert_eq!(config.path, "/socket");
        assert_eq!(config.heartbeat_interval, Duration::from_secs(5));
        assert_eq!(config.max_reconnect_attempts, 2);
        assert_eq!(config.reconnect_delay, Duration::from_millis(100));
    }
}
