//! # tasknotify Hub
//!
//! Server half of the notification socket.
//!
//! - `GET /ws?token=<user id>` upgrades to a WebSocket; the hub greets with
//!   `welcome` and `auth_success`, answers every `ping` with a `pong`, and
//!   pushes `notification` frames queued through [`HubState::notify_user`]
//! - `GET /health` reports connection and user counts
//! - [`NotificationService`] turns task events into socket and email deliveries
//!
//! ## Usage
//!
//! ```ignore
//! use tasknotify_hub::NotificationHub;
//!
//! let hub = NotificationHub::new(HubConfig::default());
//! let addr = hub.start().await?;
//! hub.state().notify_user("42", &notification);
//! hub.stop().await;
//! ```

mod connection;
mod error;
mod server;
mod service;

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use tasknotify_config::HubConfig;
use tasknotify_protocols::{Notification, ServerFrame};

pub use connection::HubConnection;
pub use error::HubError;
pub use server::create_router;
pub use service::{DeliveryReport, NotificationService};

/// Hub state shared across handlers.
pub struct HubState {
    /// Active sockets by connection ID.
    pub connections: DashMap<String, HubConnection>,
    /// Per-connection outbound queue size.
    pub outbound_buffer: usize,
    /// Server started flag.
    pub started: AtomicBool,
}

impl HubState {
    pub fn new(outbound_buffer: usize) -> Self {
        Self {
            connections: DashMap::new(),
            outbound_buffer,
            started: AtomicBool::new(false),
        }
    }

    /// Queue `notification` on every socket of `user_id`.
    ///
    /// Returns how many sockets it was queued on. Full or closed sockets are
    /// skipped.
    pub fn notify_user(&self, user_id: &str, notification: &Notification) -> usize {
        let Some(frame) = encode(notification) else {
            return 0;
        };
        let queued = self.send_where(&frame, |conn| conn.user_id == user_id);
        debug!(
            "Notification {} for user {} queued on {} socket(s)",
            notification.kind(),
            user_id,
            queued
        );
        queued
    }

    /// Queue `notification` on every socket.
    pub fn broadcast(&self, notification: &Notification) -> usize {
        let Some(frame) = encode(notification) else {
            return 0;
        };
        self.send_where(&frame, |_| true)
    }

    fn send_where<F>(&self, frame: &str, filter: F) -> usize
    where
        F: Fn(&HubConnection) -> bool,
    {
        let mut queued = 0;
        for entry in self.connections.iter() {
            let conn = entry.value();
            if !filter(conn) {
                continue;
            }
            match conn.try_send(frame.to_string()) {
                Ok(()) => queued += 1,
                Err(e) => warn!("Skipping connection {}: {}", conn.id, e),
            }
        }
        queued
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of distinct users with at least one socket.
    pub fn user_count(&self) -> usize {
        self.connections
            .iter()
            .map(|entry| entry.value().user_id.clone())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn is_user_connected(&self, user_id: &str) -> bool {
        self.connections
            .iter()
            .any(|entry| entry.value().user_id == user_id)
    }
}

fn encode(notification: &Notification) -> Option<String> {
    match ServerFrame::notification(notification.clone()).encode() {
        Ok(frame) => Some(frame),
        Err(e) => {
            error!("Failed to encode notification: {}", e);
            None
        }
    }
}

/// Running server handle.
struct Running {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Notification hub: binds, serves and stops the socket endpoint.
pub struct NotificationHub {
    config: HubConfig,
    state: Arc<HubState>,
    running: Mutex<Option<Running>>,
}

impl NotificationHub {
    pub fn new(config: HubConfig) -> Self {
        let state = Arc::new(HubState::new(config.outbound_buffer));
        Self {
            config,
            state,
            running: Mutex::new(None),
        }
    }

    /// The configured listen address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    pub fn state(&self) -> Arc<HubState> {
        self.state.clone()
    }

    pub fn is_started(&self) -> bool {
        self.state.started.load(Ordering::SeqCst)
    }

    /// Bind and start serving. Returns the bound address, which differs from
    /// the configured one when port 0 is used.
    pub async fn start(&self) -> Result<SocketAddr, HubError> {
        if let Some(running) = self.running.lock().as_ref() {
            return Ok(running.addr);
        }

        let addr = self.address();
        let listener_addr: SocketAddr = addr
            .parse()
            .map_err(|e| HubError::InvalidAddress(format!("{}: {}", addr, e)))?;
        let listener = tokio::net::TcpListener::bind(listener_addr).await?;
        let bound = listener.local_addr()?;

        let router = create_router(self.state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("Notification hub server error: {}", e);
            }
        });

        self.state.started.store(true, Ordering::SeqCst);
        info!("Notification hub listening at ws://{}/ws", bound);

        let mut running = self.running.lock();
        if let Some(existing) = running.as_ref() {
            // Lost a concurrent start; keep the first server.
            let _ = shutdown_tx.send(());
            return Ok(existing.addr);
        }
        *running = Some(Running {
            addr: bound,
            shutdown_tx,
            handle,
        });
        Ok(bound)
    }

    /// Close every socket and stop the server.
    pub async fn stop(&self) {
        let Some(running) = self.running.lock().take() else {
            return;
        };

        self.state.started.store(false, Ordering::SeqCst);
        for entry in self.state.connections.iter() {
            entry.value().close();
        }
        self.state.connections.clear();

        let _ = running.shutdown_tx.send(());
        if let Err(e) = running.handle.await {
            warn!("Notification hub task ended abnormally: {}", e);
        }
        info!("Notification hub stopped");
    }

    /// Bound address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().as_ref().map(|running| running.addr)
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
