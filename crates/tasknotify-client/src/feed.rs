//! View-layer adapter over a [`NotificationClient`].

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use tasknotify_protocols::Notification;

use crate::client::NotificationClient;
use crate::error::ClientError;
use crate::registry::Subscription;
use crate::state::ConnectionState;

/// Newest-first list of received notifications plus a connected flag.
///
/// Attaching with an identity connects the client and subscribes; dropping
/// the feed unsubscribes but leaves the connection up. Attaching without an
/// identity does nothing and yields an empty, disconnected feed.
pub struct NotificationFeed {
    notifications: Arc<Mutex<VecDeque<Notification>>>,
    state_rx: Option<watch::Receiver<ConnectionState>>,
    subscription: Option<Subscription>,
}

impl NotificationFeed {
    pub fn attach(
        client: &NotificationClient,
        identity: Option<&str>,
    ) -> Result<Self, ClientError> {
        let notifications = Arc::new(Mutex::new(VecDeque::new()));

        let Some(identity) = identity else {
            return Ok(Self {
                notifications,
                state_rx: None,
                subscription: None,
            });
        };

        client.connect(identity)?;
        let sink = notifications.clone();
        let subscription =
            client.subscribe(move |n: &Notification| sink.lock().push_front(n.clone()));

        Ok(Self {
            notifications,
            state_rx: Some(client.watch_state()),
            subscription: Some(subscription),
        })
    }

    /// Whether the underlying socket is currently open.
    pub fn is_connected(&self) -> bool {
        self.state_rx
            .as_ref()
            .is_some_and(|rx| rx.borrow().is_open())
    }

    /// Wait for the connection state to change and return the new connected flag.
    ///
    /// Returns `None` for a detached feed or once the client is gone.
    pub async fn connection_changed(&mut self) -> Option<bool> {
        let rx = self.state_rx.as_mut()?;
        rx.changed().await.ok()?;
        let open = rx.borrow_and_update().is_open();
        Some(open)
    }

    /// All received notifications, newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<Notification> {
        self.notifications.lock().front().cloned()
    }

    pub fn len(&self) -> usize {
        self.notifications.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.lock().is_empty()
    }

    pub fn clear(&self) {
        self.notifications.lock().clear();
    }

    /// Whether this feed is subscribed to a client.
    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Stop receiving notifications. The connection stays up.
    pub fn detach(self) {}
}
