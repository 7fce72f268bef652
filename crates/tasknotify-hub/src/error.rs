//! Hub error types.

use thiserror::Error;

/// Notification hub errors.
#[derive(Debug, Error)]
pub enum HubError {
    /// Host/port do not form a socket address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Could not bind the listener.
    #[error("Failed to bind: {0}")]
    Bind(#[from] std::io::Error),

    /// The connection's outbound queue is full.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// The connection has closed.
    #[error("Disconnected")]
    Disconnected,
}
