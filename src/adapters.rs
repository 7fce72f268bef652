//! Bridges from file configuration to runtime types.

use std::path::PathBuf;
use std::sync::Arc;

use tasknotify_client::ClientConfig;
use tasknotify_config::{ConfigLoader, EmailConfig, LoggingConfig};
use tasknotify_email::{EmailError, EmailNotifier, SendGridProvider, Sender};

/// Get the .tasknotify directory path.
pub(crate) fn tasknotify_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".tasknotify"))
        .unwrap_or_else(|| PathBuf::from(".tasknotify"))
}

/// Directory for rotated log files.
pub(crate) fn log_dir(logging: &LoggingConfig) -> PathBuf {
    logging
        .directory
        .as_deref()
        .map(|dir| PathBuf::from(ConfigLoader::expand_path(dir)))
        .unwrap_or_else(|| tasknotify_dir().join("logs"))
}

/// Client settings from the `[client]` section, with an optional origin override.
pub(crate) fn client_config(
    config: &tasknotify_config::ClientConfig,
    origin: Option<String>,
) -> ClientConfig {
    ClientConfig::new(origin.unwrap_or_else(|| config.origin.clone()))
        .with_path(config.path.clone())
        .with_heartbeat_interval(config.heartbeat_interval())
        .with_max_reconnect_attempts(config.reconnect.max_attempts)
        .with_reconnect_delay(config.reconnect.delay())
}

/// Email notifier from the `[email]` section; `None` when email is disabled.
pub(crate) fn email_notifier(config: &EmailConfig) -> Result<Option<EmailNotifier>, EmailError> {
    if !config.enabled {
        return Ok(None);
    }
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| EmailError::NotConfigured("email.api_key is not set".to_string()))?;
    let provider = SendGridProvider::with_base_url(api_key, config.base_url.clone())?;

    Ok(Some(EmailNotifier::new(
        Arc::new(provider),
        Sender::new(config.from_address.clone(), config.from_name.clone()),
        config.app_url.clone(),
    )))
}
