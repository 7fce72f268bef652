//! JSON envelopes exchanged over the `/ws` socket.
//!
//! Every frame is a UTF-8 JSON object discriminated by its `type` field.
//! Unrecognised `type` values decode to the `Unknown` variant so callers can
//! ignore them without treating them as errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::notification::Notification;

/// Frames sent from client to hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Liveness ping carrying the sender's epoch-ms clock.
    Ping { timestamp: i64 },
    #[serde(other)]
    Unknown,
}

/// Frames sent from hub to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Pong {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },
    Notification {
        data: Notification,
    },
    Welcome {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    AuthSuccess {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl ClientFrame {
    pub fn ping(timestamp: i64) -> Self {
        Self::Ping { timestamp }
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ServerFrame {
    pub fn notification(data: Notification) -> Self {
        Self::Notification { data }
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode an inbound frame without rejecting unfamiliar shapes.
    ///
    /// Fails only on text that is not JSON and on a `notification` whose
    /// `data` is not a [`Notification`]. A missing or non-string `type`, an
    /// unknown `type`, or a non-object payload reads as `Unknown`; optional
    /// fields of the wrong type are dropped.
    pub fn read(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        let Some(kind) = value.get("type").and_then(Value::as_str) else {
            return Ok(Self::Unknown);
        };

        let message = || {
            value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let frame = match kind {
            "pong" => Self::Pong {
                timestamp: value.get("timestamp").and_then(Value::as_i64),
            },
            "notification" => Self::Notification {
                data: Notification::deserialize(value.get("data").unwrap_or(&Value::Null))?,
            },
            "welcome" => Self::Welcome { message: message() },
            "auth_success" => Self::AuthSuccess { message: message() },
            _ => Self::Unknown,
        };
        Ok(frame)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
