//! Protocol errors.

use thiserror::Error;

/// Frame encoding and decoding errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),
}
