//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Convert the first error into a `ConfigError`.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_client(config, &mut result);
        Self::validate_hub(config, &mut result);
        Self::validate_email(config, &mut result);
        Self::validate_logging(config, &mut result);

        result
    }

    fn validate_client(config: &Config, result: &mut ValidationResult) {
        let client = &config.client;

        match url::Url::parse(&client.origin) {
            Ok(origin) => {
                if !matches!(origin.scheme(), "http" | "https" | "ws" | "wss") {
                    result.add_error(ValidationError::new(
                        "client.origin",
                        format!("Unsupported scheme '{}'", origin.scheme()),
                    ));
                }
            }
            Err(e) => {
                result.add_error(ValidationError::new(
                    "client.origin",
                    format!("Invalid origin URL: {}", e),
                ));
            }
        }

        if !client.path.starts_with('/') {
            result.add_error(ValidationError::new(
                "client.path",
                "path must start with '/'",
            ));
        }

        if client.heartbeat_interval_secs == 0 {
            result.add_error(ValidationError::new(
                "client.heartbeat_interval_secs",
                "heartbeat_interval_secs must be greater than 0",
            ));
        }

        if client.reconnect.max_attempts == 0 {
            result.add_warning(ValidationWarning::new(
                "client.reconnect.max_attempts",
                "max_attempts is 0, the client will never reconnect after a close",
            ));
        }

        if client.reconnect.delay_ms == 0 && client.reconnect.max_attempts > 0 {
            result.add_warning(ValidationWarning::new(
                "client.reconnect.delay_ms",
                "delay_ms is 0, reconnect attempts will run back to back",
            ));
        }
    }

    fn validate_hub(config: &Config, result: &mut ValidationResult) {
        if config.hub.port == 0 {
            result.add_error(ValidationError::new("hub.port", "Port cannot be 0"));
        }

        if config.hub.host.is_empty() {
            result.add_error(ValidationError::new("hub.host", "Host cannot be empty"));
        }

        if config.hub.outbound_buffer == 0 {
            result.add_error(ValidationError::new(
                "hub.outbound_buffer",
                "outbound_buffer must be greater than 0",
            ));
        }
    }

    fn validate_email(config: &Config, result: &mut ValidationResult) {
        let email = &config.email;
        if !email.enabled {
            return;
        }

        if email.api_key.as_deref().is_none_or(str::is_empty) {
            result.add_error(ValidationError::new(
                "email.api_key",
                "api_key is required when email is enabled",
            ));
        }

        if !email.from_address.contains('@') {
            result.add_error(ValidationError::new(
                "email.from_address",
                format!("'{}' is not an email address", email.from_address),
            ));
        }

        for (path, value) in [
            ("email.base_url", &email.base_url),
            ("email.app_url", &email.app_url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                result.add_error(ValidationError::new(
                    path,
                    "URL must start with http:// or https://",
                ));
            }
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        if config.logging.level.trim().is_empty() {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                "level is empty, falling back to 'info'",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
