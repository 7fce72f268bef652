//! Connection lifecycle state.

/// Lifecycle of a client's connection.
///
/// ```text
/// Idle ──connect──▶ Connecting ──open──▶ Open ──disconnect──▶ Closing ──▶ Idle
///                       ▲                 │
///                       │               close
///                       │                 ▼
///                       └──delay── Backoff(n) ──cap reached──▶ Exhausted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No driver is running.
    Idle,
    /// A socket is being opened.
    Connecting,
    /// The socket is open and the heartbeat is running.
    Open,
    /// An explicit disconnect is closing the socket.
    Closing,
    /// Waiting out the fixed delay before retry `attempt`.
    Backoff { attempt: u32 },
    /// The retry cap was reached; only an explicit `connect` starts over.
    Exhausted,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Whether a driver is still working on this connection.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Open | Self::Backoff { .. })
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Connecting => f.write_str("connecting"),
            Self::Open => f.write_str("open"),
            Self::Closing => f.write_str("closing"),
            Self::Backoff { attempt } => write!(f, "backoff({})", attempt),
            Self::Exhausted => f.write_str("exhausted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_open_is_open() {
        assert!(ConnectionState::Open.is_open());
        assert!(!ConnectionState::Connecting.is_open());
        assert!(!ConnectionState::Backoff { attempt: 1 }.is_open());
    }

    #[test]
    fn test_active_states() {
        assert!(ConnectionState::Connecting.is_active());
        assert!(ConnectionState::Backoff { attempt: 3 }.is_active());
        assert!(!ConnectionState::Idle.is_active());
        assert!(!ConnectionState::Exhausted.is_active());
        assert!(!ConnectionState::Closing.is_active());
    }

    #[test]
    fn test_display() {
        assert_eq!(ConnectionState::Backoff { attempt: 2 }.to_string(), "backoff(2)");
        assert_eq!(ConnectionState::Exhausted.to_string(), "exhausted");
    }
}
