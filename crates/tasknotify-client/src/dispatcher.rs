//! Inbound frame dispatch.

use tracing::{debug, info, warn};

use tasknotify_protocols::ServerFrame;

use crate::registry::ListenerRegistry;

/// What happened to one inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Heartbeat acknowledged.
    Pong,
    /// Notification handed to this many listeners.
    Delivered(usize),
    /// `welcome` or `auth_success` greeting.
    Greeting,
    /// JSON without a recognised string `type`.
    Ignored,
    /// Not JSON, or a `notification` whose `data` does not parse. Dropped.
    Malformed,
}

/// Parse one text frame and route it by its `type`.
///
/// Never fails: a bad frame is logged and dropped so it cannot tear down the
/// connection.
pub fn dispatch(text: &str, registry: &ListenerRegistry) -> Dispatch {
    let frame = match ServerFrame::read(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Dropping malformed frame: {}", e);
            return Dispatch::Malformed;
        }
    };

    match frame {
        ServerFrame::Pong { .. } => {
            debug!("Heartbeat acknowledged");
            Dispatch::Pong
        }
        ServerFrame::Notification { data } => {
            debug!("Notification {} for task {} received", data.kind(), data.task_id());
            Dispatch::Delivered(registry.notify(&data))
        }
        ServerFrame::Welcome { message } | ServerFrame::AuthSuccess { message } => {
            info!("Server greeting: {}", message.as_deref().unwrap_or("(no message)"));
            Dispatch::Greeting
        }
        ServerFrame::Unknown => {
            debug!("Ignoring frame without a known type");
            Dispatch::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use parking_lot::Mutex;
    use tasknotify_protocols::{Notification, NotificationKind};

    const NOTIFICATION_FRAME: &str = r#"{"type":"notification","data":{"type":"task_assigned","taskId":7,"taskTitle":"Fix bug","message":"You were assigned Fix bug","timestamp":1700000000000}}"#;

    fn recording_registry() -> (
        ListenerRegistry,
        Arc<Mutex<Vec<Notification>>>,
        crate::Subscription,
    ) {
        let registry = ListenerRegistry::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let sub = registry.subscribe(move |n: &Notification| sink.lock().push(n.clone()));
        (registry, received, sub)
    }

    #[test]
    fn test_notification_delivered_unchanged() {
        let (registry, received, _sub) = recording_registry();

        assert_eq!(dispatch(NOTIFICATION_FRAME, &registry), Dispatch::Delivered(1));
        let expected = Notification::new(
            NotificationKind::TaskAssigned,
            7,
            "Fix bug",
            "You were assigned Fix bug",
            1_700_000_000_000,
        );
        assert_eq!(received.lock().as_slice(), &[expected]);
    }

    #[test]
    fn test_malformed_then_valid() {
        let (registry, received, _sub) = recording_registry();

        assert_eq!(dispatch("not-json", &registry), Dispatch::Malformed);
        assert_eq!(dispatch(NOTIFICATION_FRAME, &registry), Dispatch::Delivered(1));
        assert_eq!(received.lock().len(), 1);
    }

    #[test]
    fn test_pong_and_greetings_do_not_notify() {
        let (registry, received, _sub) = recording_registry();

        assert_eq!(dispatch(r#"{"type":"pong"}"#, &registry), Dispatch::Pong);
        assert_eq!(
            dispatch(r#"{"type":"welcome","message":"hello"}"#, &registry),
            Dispatch::Greeting
        );
        assert_eq!(dispatch(r#"{"type":"auth_success"}"#, &registry), Dispatch::Greeting);
        assert!(received.lock().is_empty());
    }

    #[test]
    fn test_unknown_type_ignored() {
        let (registry, received, _sub) = recording_registry();
        assert_eq!(
            dispatch(r#"{"type":"typing","user":3}"#, &registry),
            Dispatch::Ignored
        );
        assert!(received.lock().is_empty());
    }

    #[test]
    fn test_json_without_known_type_ignored() {
        let (registry, received, _sub) = recording_registry();

        assert_eq!(dispatch(r#"{"event":"x"}"#, &registry), Dispatch::Ignored);
        assert_eq!(dispatch("[1,2]", &registry), Dispatch::Ignored);
        assert_eq!(dispatch(r#"{"type":3}"#, &registry), Dispatch::Ignored);
        assert_eq!(
            dispatch(r#"{"type":"welcome","message":5}"#, &registry),
            Dispatch::Greeting
        );
        assert!(received.lock().is_empty());
    }

    #[test]
    fn test_notification_with_bad_payload_is_malformed() {
        let (registry, received, _sub) = recording_registry();
        let frame = r#"{"type":"notification","data":{"type":"task_assigned","taskId":"seven"}}"#;
        assert_eq!(dispatch(frame, &registry), Dispatch::Malformed);
        assert!(received.lock().is_empty());
    }

    #[test]
    fn test_notification_without_listeners() {
        let registry = ListenerRegistry::new();
        assert_eq!(dispatch(NOTIFICATION_FRAME, &registry), Dispatch::Delivered(0));
    }
}
