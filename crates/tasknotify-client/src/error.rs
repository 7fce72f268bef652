//! Client error types.

use thiserror::Error;

/// Notification client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured origin is not a URL.
    #[error("Invalid origin: {0}")]
    InvalidOrigin(String),

    /// The origin's scheme has no socket equivalent.
    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),

    /// Failed to open the socket.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Frame could not be sent.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Frame encoding error.
    #[error("Protocol error: {0}")]
    Protocol(#[from] tasknotify_protocols::ProtocolError),
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        ClientError::WebSocket(e.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(e: url::ParseError) -> Self {
        ClientError::InvalidOrigin(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_scheme_display() {
        let err = ClientError::UnsupportedScheme("ftp".to_string());
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn test_url_parse_error_from() {
        let err = ClientError::from(url::Url::parse("::nope").unwrap_err());
        assert!(matches!(err, ClientError::InvalidOrigin(_)));
    }

    #[test]
    fn test_tungstenite_error_from() {
        let err = ClientError::from(tokio_tungstenite::tungstenite::Error::ConnectionClosed);
        assert!(err.to_string().contains("WebSocket error"));
    }
}
