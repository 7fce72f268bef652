use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.hub.host, "127.0.0.1");
    assert_eq!(config.hub.port, 8080);
    assert_eq!(config.client.path, "/ws");
    assert!(!config.email.enabled);
}

#[test]
fn test_client_config_default() {
    let client = ClientConfig::default();
    assert_eq!(client.origin, "http://127.0.0.1:8080");
    assert_eq!(client.heartbeat_interval(), Duration::from_secs(25));
    assert_eq!(client.reconnect.max_attempts, 5);
    assert_eq!(client.reconnect.delay(), Duration::from_secs(3));
}

#[test]
fn test_hub_config_default() {
    let hub = HubConfig::default();
    assert_eq!(hub.outbound_buffer, 32);
}

#[test]
fn test_email_config_default() {
    let email = EmailConfig::default();
    assert!(email.api_key.is_none());
    assert_eq!(email.base_url, "https://api.sendgrid.com");
    assert_eq!(email.from_name, "Task Manager");
}

#[test]
fn test_logging_config_default() {
    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(logging.file);
    assert!(logging.directory.is_none());
}

#[test]
fn test_config_serialization() {
    let config = Config::default();
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("127.0.0.1"));
    assert!(json.contains("heartbeat_interval_secs"));
    assert!(!json.contains("api_key"));
}

#[test]
fn test_partial_reconnect_section() {
    let config: Config = toml::from_str("[client.reconnect]\nmax_attempts = 9").unwrap();
    assert_eq!(config.client.reconnect.max_attempts, 9);
    assert_eq!(config.client.reconnect.delay_ms, 3000);
}
