//! Delivery-side configuration types (hub, email).

use serde::{Deserialize, Serialize};

/// Notification hub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Outbound frames buffered per connection before sends start failing.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            outbound_buffer: default_outbound_buffer(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_outbound_buffer() -> usize {
    32
}

/// Transactional email configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Provider API key (usually `${SENDGRID_API_KEY}`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_from_address")]
    pub from_address: String,

    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Public URL of the web application, used for task links.
    #[serde(default = "default_app_url")]
    pub app_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            base_url: default_base_url(),
            from_address: default_from_address(),
            from_name: default_from_name(),
            app_url: default_app_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.sendgrid.com".to_string()
}

fn default_from_address() -> String {
    "notifications@localhost".to_string()
}

fn default_from_name() -> String {
    "Task Manager".to_string()
}

fn default_app_url() -> String {
    "http://localhost:3000".to_string()
}
