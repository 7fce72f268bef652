//! Notification listener registry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::trace;

use tasknotify_protocols::Notification;

/// Receives notifications as they arrive.
///
/// Called on the client's driver task, in subscription order. Keep it short:
/// the next frame is not read until every listener has returned.
pub trait NotificationListener: Send + Sync {
    fn on_notification(&self, notification: &Notification);
}

impl<F> NotificationListener for F
where
    F: Fn(&Notification) + Send + Sync,
{
    fn on_notification(&self, notification: &Notification) {
        self(notification)
    }
}

struct RegistryInner {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(u64, Arc<dyn NotificationListener>)>>,
}

/// Ordered set of subscriptions.
///
/// Every `subscribe` call creates its own entry, even for the same listener,
/// and only its [`Subscription`] removes it.
#[derive(Clone)]
pub struct ListenerRegistry {
    inner: Arc<RegistryInner>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                next_id: AtomicU64::new(1),
                listeners: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Register a listener.
    pub fn subscribe<L>(&self, listener: L) -> Subscription
    where
        L: NotificationListener + 'static,
    {
        self.subscribe_arc(Arc::new(listener))
    }

    /// Register a shared listener.
    pub fn subscribe_arc(&self, listener: Arc<dyn NotificationListener>) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.write().push((id, listener));
        trace!("Listener {} subscribed", id);

        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Invoke every listener with `notification`, in subscription order.
    ///
    /// Listeners run outside the lock, so they may subscribe or unsubscribe;
    /// such changes apply from the next notification on. Returns the number of
    /// listeners invoked.
    pub fn notify(&self, notification: &Notification) -> usize {
        let snapshot: Vec<Arc<dyn NotificationListener>> = self
            .inner
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in &snapshot {
            listener.on_notification(notification);
        }
        snapshot.len()
    }

    pub fn len(&self) -> usize {
        self.inner.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryInner {
    fn remove(&self, id: u64) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(entry_id, _)| *entry_id != id);
        before != listeners.len()
    }
}

/// Registration token; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<RegistryInner>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remove the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keep the listener registered for the registry's whole lifetime.
    pub fn forget(mut self) {
        self.registry = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if registry.remove(self.id) {
                trace!("Listener {} unsubscribed", self.id);
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
