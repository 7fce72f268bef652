//! Notification client: connection manager and driver task.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::dispatcher::{Dispatch, dispatch};
use crate::endpoint::endpoint_url;
use crate::error::ClientError;
use crate::heartbeat::Heartbeat;
use crate::reconnect::{ReconnectDecision, ReconnectPolicy};
use crate::registry::{ListenerRegistry, NotificationListener, Subscription};
use crate::state::ConnectionState;
use crate::transport::{Connection, Connector, WsConnector};

/// Upper bound on the close handshake during an explicit shutdown.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Point-in-time counters for a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Socket opens attempted, initial and retries.
    pub connect_attempts: u64,
    pub pings_sent: u64,
    pub notifications_received: u64,
    pub malformed_frames: u64,
    /// Heartbeat timers currently alive. Never more than one.
    pub active_heartbeats: usize,
    /// Close-triggered retries since the last successful open.
    pub reconnect_attempts: u32,
}

/// State shared between the client handle and its driver task.
struct Shared {
    config: ClientConfig,
    connector: Arc<dyn Connector>,
    registry: ListenerRegistry,
    state_tx: watch::Sender<ConnectionState>,
    policy: Mutex<ReconnectPolicy>,
    /// Bumped whenever a driver is replaced, so a stale driver cannot publish state.
    generation: AtomicU64,
    heartbeats: Arc<AtomicUsize>,
    connect_attempts: AtomicU64,
    pings_sent: AtomicU64,
    notifications_received: AtomicU64,
    malformed_frames: AtomicU64,
}

impl Shared {
    /// Publish `state` if `generation` still owns the connection.
    fn set_state(&self, generation: u64, state: ConnectionState) -> bool {
        self.state_tx.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation || *current == state {
                return false;
            }
            *current = state;
            true
        })
    }

    /// Retire the current driver's generation and publish `state`.
    fn invalidate(&self, state: ConnectionState) -> u64 {
        let mut generation = 0;
        self.state_tx.send_modify(|current| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *current = state;
        });
        generation
    }
}

struct Driver {
    identity: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

struct ClientInner {
    shared: Arc<Shared>,
    driver: Mutex<Option<Driver>>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.get_mut().take() {
            driver.cancel.cancel();
        }
    }
}

/// WebSocket notification client.
///
/// Owns at most one socket at a time. Clones share the same connection,
/// listeners and state; the connection is torn down when the last clone is
/// dropped or on [`disconnect`](Self::disconnect).
///
/// # Example
///
/// ```rust,ignore
/// let client = NotificationClient::new(ClientConfig::new("https://tasks.example.com"));
/// let _sub = client.subscribe(|n: &Notification| println!("{}", n.message()));
/// client.connect("42")?;
/// ```
#[derive(Clone)]
pub struct NotificationClient {
    inner: Arc<ClientInner>,
}

impl NotificationClient {
    /// Create a client that opens real WebSockets.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_connector(config, WsConnector::new())
    }

    /// Create a client over a custom transport.
    pub fn with_connector<C: Connector>(config: ClientConfig, connector: C) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Idle);
        let policy = ReconnectPolicy::new(config.max_reconnect_attempts, config.reconnect_delay);

        let shared = Arc::new(Shared {
            config,
            connector: Arc::new(connector),
            registry: ListenerRegistry::new(),
            state_tx,
            policy: Mutex::new(policy),
            generation: AtomicU64::new(0),
            heartbeats: Arc::new(AtomicUsize::new(0)),
            connect_attempts: AtomicU64::new(0),
            pings_sent: AtomicU64::new(0),
            notifications_received: AtomicU64::new(0),
            malformed_frames: AtomicU64::new(0),
        });

        Self {
            inner: Arc::new(ClientInner {
                shared,
                driver: Mutex::new(None),
            }),
        }
    }

    /// Connect as `identity`.
    ///
    /// A no-op when a connection for the same identity is already connecting,
    /// open or backing off. A different identity replaces the running
    /// connection. After the retry cap was reached this starts a fresh
    /// attempt, but only a successful open resets the retry counter.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(&self, identity: &str) -> Result<(), ClientError> {
        let shared = &self.inner.shared;
        let url = endpoint_url(&shared.config.origin, &shared.config.path, identity)?;

        let mut slot = self.inner.driver.lock();
        if let Some(driver) = slot.as_ref() {
            if driver.identity == identity && shared.state_tx.borrow().is_active() {
                debug!("Notification socket already active, reusing it");
                return Ok(());
            }
            if driver.identity != identity {
                info!("Replacing notification socket for a new identity");
                shared.policy.lock().reset();
            }
            driver.cancel.cancel();
        }

        let generation = shared.invalidate(ConnectionState::Connecting);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_driver(
            shared.clone(),
            url,
            generation,
            cancel.clone(),
        ));

        *slot = Some(Driver {
            identity: identity.to_string(),
            cancel,
            task,
        });
        Ok(())
    }

    /// Close the socket and stop heartbeats and reconnects.
    ///
    /// Returns immediately; the state reads `Idle` as soon as this returns and
    /// the next `connect` always starts from fresh state.
    pub fn disconnect(&self) {
        let Some(driver) = self.inner.driver.lock().take() else {
            return;
        };
        let shared = &self.inner.shared;
        shared.invalidate(ConnectionState::Idle);
        shared.policy.lock().reset();
        driver.cancel.cancel();
        info!("Notification socket disconnected");
    }

    /// Like [`disconnect`](Self::disconnect), but waits for the close
    /// handshake and for the driver task to finish.
    pub async fn shutdown(&self) {
        let Some(driver) = self.inner.driver.lock().take() else {
            return;
        };
        let shared = &self.inner.shared;
        let generation = shared.invalidate(ConnectionState::Closing);
        shared.policy.lock().reset();
        driver.cancel.cancel();

        if let Err(e) = driver.task.await {
            warn!("Notification driver ended abnormally: {}", e);
        }
        shared.set_state(generation, ConnectionState::Idle);
        info!("Notification socket shut down");
    }

    /// Register a notification listener.
    pub fn subscribe<L>(&self, listener: L) -> Subscription
    where
        L: NotificationListener + 'static,
    {
        self.inner.shared.registry.subscribe(listener)
    }

    pub fn registry(&self) -> &ListenerRegistry {
        &self.inner.shared.registry
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.shared.state_tx.borrow()
    }

    /// Receiver that observes every state change.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.shared.state_tx.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_open()
    }

    /// Identity of the current connection, if any.
    pub fn identity(&self) -> Option<String> {
        self.inner
            .driver
            .lock()
            .as_ref()
            .map(|driver| driver.identity.clone())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.shared.config
    }

    pub fn stats(&self) -> ClientStats {
        let shared = &self.inner.shared;
        ClientStats {
            connect_attempts: shared.connect_attempts.load(Ordering::Relaxed),
            pings_sent: shared.pings_sent.load(Ordering::Relaxed),
            notifications_received: shared.notifications_received.load(Ordering::Relaxed),
            malformed_frames: shared.malformed_frames.load(Ordering::Relaxed),
            active_heartbeats: shared.heartbeats.load(Ordering::SeqCst),
            reconnect_attempts: shared.policy.lock().attempts(),
        }
    }
}

/// How one open socket ended.
enum ConnectionEnd {
    Closed,
    Cancelled,
}

/// Connect, run, and reconnect until cancelled or out of retries.
async fn run_driver(shared: Arc<Shared>, url: Url, generation: u64, cancel: CancellationToken) {
    let target = display_url(&url);

    loop {
        shared.set_state(generation, ConnectionState::Connecting);
        shared.connect_attempts.fetch_add(1, Ordering::Relaxed);
        debug!("Connecting to {}", target);

        let attempt = tokio::select! {
            _ = cancel.cancelled() => break,
            result = shared.connector.connect(&url) => result,
        };

        match attempt {
            Ok(connection) => {
                if cancel.is_cancelled() {
                    break;
                }
                shared.policy.lock().on_open();
                shared.set_state(generation, ConnectionState::Open);
                info!("Notification socket open: {}", target);

                if let ConnectionEnd::Cancelled = run_connection(&shared, connection, &cancel).await
                {
                    break;
                }
            }
            // The failed open counts as a close below; the error itself never retries.
            Err(e) => error!("Notification socket error: {}", e),
        }

        if cancel.is_cancelled() {
            break;
        }

        let decision = shared.policy.lock().on_close();
        match decision {
            ReconnectDecision::Retry { attempt, delay } => {
                shared.set_state(generation, ConnectionState::Backoff { attempt });
                info!(
                    "Reconnecting in {:?} (attempt {}/{})",
                    delay, attempt, shared.config.max_reconnect_attempts
                );
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            ReconnectDecision::GiveUp { attempts } => {
                shared.set_state(generation, ConnectionState::Exhausted);
                error!(
                    "Notification socket closed for good after {} reconnect attempts",
                    attempts
                );
                return;
            }
        }
    }

    debug!("Notification driver for {} stopped", target);
}

/// Pump one open socket: inbound frames, heartbeats and cancellation.
async fn run_connection(
    shared: &Shared,
    connection: Connection,
    cancel: &CancellationToken,
) -> ConnectionEnd {
    let Connection {
        mut sink,
        mut stream,
    } = connection;
    let mut heartbeat =
        Heartbeat::start(shared.config.heartbeat_interval, shared.heartbeats.clone());

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                drop(heartbeat);
                match tokio::time::timeout(CLOSE_TIMEOUT, sink.close()).await {
                    Ok(Err(e)) => debug!("Close handshake failed: {}", e),
                    Err(_) => debug!("Close handshake timed out"),
                    Ok(Ok(())) => {}
                }
                return ConnectionEnd::Cancelled;
            }

            frame = stream.next() => match frame {
                Some(Ok(text)) => match dispatch(&text, &shared.registry) {
                    Dispatch::Delivered(_) => {
                        shared.notifications_received.fetch_add(1, Ordering::Relaxed);
                    }
                    Dispatch::Malformed => {
                        shared.malformed_frames.fetch_add(1, Ordering::Relaxed);
                    }
                    Dispatch::Pong | Dispatch::Greeting | Dispatch::Ignored => {}
                },
                Some(Err(e)) => {
                    error!("Notification socket error: {}", e);
                    return ConnectionEnd::Closed;
                }
                None => {
                    info!("Notification socket closed");
                    return ConnectionEnd::Closed;
                }
            },

            ping = heartbeat.tick() => {
                let text = match ping.encode() {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Failed to encode heartbeat: {}", e);
                        continue;
                    }
                };
                if let Err(e) = sink.send(text).await {
                    warn!("Heartbeat send failed: {}", e);
                    return ConnectionEnd::Closed;
                }
                shared.pings_sent.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// The socket address without its query, which carries the identity token.
fn display_url(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_url_hides_token() {
        let url = endpoint_url("http://tasks.example.com", "/ws", "secret").unwrap();
        assert_eq!(display_url(&url), "ws://tasks.example.com/ws");
    }

    #[test]
    fn test_new_client_is_idle() {
        let client = NotificationClient::new(ClientConfig::default());
        assert_eq!(client.state(), ConnectionState::Idle);
        assert!(!client.is_connected());
        assert!(client.identity().is_none());
        assert_eq!(client.stats(), ClientStats::default());
    }

    #[test]
    fn test_connect_rejects_bad_origin_before_spawning() {
        let client = NotificationClient::new(ClientConfig::new("mailto:ops@example.com"));
        let err = client.connect("1").unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedScheme(_)));
        assert_eq!(client.state(), ConnectionState::Idle);
    }

    #[test]
    fn test_disconnect_without_connection_is_noop() {
        let client = NotificationClient::new(ClientConfig::default());
        client.disconnect();
        assert_eq!(client.state(), ConnectionState::Idle);
    }
}
