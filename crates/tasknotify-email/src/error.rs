//! Email error types.

use thiserror::Error;

/// Email dispatch errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Request never reached the provider, or its response was unreadable.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("Provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// Provider is missing required settings.
    #[error("Email not configured: {0}")]
    NotConfigured(String),
}
