//! Per-socket connection handling.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use tasknotify_protocols::{ClientFrame, ServerFrame, now_millis};

use crate::HubState;
use crate::error::HubError;

/// A connected client, as seen by the hub.
pub struct HubConnection {
    /// Unique connection ID.
    pub id: String,
    /// Identity the client connected with.
    pub user_id: String,
    /// Queue of frames for the socket task.
    tx: mpsc::Sender<String>,
    open: Arc<AtomicBool>,
}

impl HubConnection {
    /// Create a connection and the receiving end of its outbound queue.
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        buffer: usize,
    ) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let conn = Self {
            id: id.into(),
            user_id: user_id.into(),
            tx,
            open: Arc::new(AtomicBool::new(true)),
        };
        (conn, rx)
    }

    /// Queue a frame without waiting.
    pub fn try_send(&self, frame: String) -> Result<(), HubError> {
        if !self.is_open() {
            return Err(HubError::Disconnected);
        }
        self.tx.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                HubError::SendFailed(format!("outbound queue full for {}", self.id))
            }
            mpsc::error::TrySendError::Closed(_) => HubError::Disconnected,
        })
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Stop accepting frames. The socket task exits once the connection is dropped.
    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    pub(crate) fn open_flag(&self) -> Arc<AtomicBool> {
        self.open.clone()
    }
}

/// Drive one socket until either side closes.
pub(crate) async fn handle_connection(
    conn_id: String,
    user_id: String,
    socket: WebSocket,
    mut outbound_rx: mpsc::Receiver<String>,
    state: Arc<HubState>,
    open: Arc<AtomicBool>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    info!("Notification socket connected: {} (user {})", conn_id, user_id);

    let greetings = [
        ServerFrame::Welcome {
            message: Some("Connected to notification hub".to_string()),
        },
        ServerFrame::AuthSuccess {
            message: Some(format!("Authenticated as user {}", user_id)),
        },
    ];
    for frame in &greetings {
        if let Err(e) = send_frame(&mut ws_tx, frame).await {
            warn!("Failed to greet {}: {}", conn_id, e);
            finish(&conn_id, &state, &open);
            return;
        }
    }

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                let Some(text) = outbound else {
                    debug!("Hub released connection {}", conn_id);
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                };
                if let Err(e) = ws_tx.send(Message::Text(text.into())).await {
                    warn!("Failed to send frame to {}: {}", conn_id, e);
                    break;
                }
            }

            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = answer(&conn_id, text.as_str()) {
                            if let Err(e) = send_frame(&mut ws_tx, &reply).await {
                                warn!("Failed to reply to {}: {}", conn_id, e);
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Notification socket closed: {}", conn_id);
                        break;
                    }
                    Some(Ok(_)) => {
                        debug!("Ignoring non-text frame from {}", conn_id);
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error from {}: {}", conn_id, e);
                        break;
                    }
                }
            }
        }
    }

    finish(&conn_id, &state, &open);
}

/// Reply to one inbound text frame, if it calls for one.
fn answer(conn_id: &str, text: &str) -> Option<ServerFrame> {
    match ClientFrame::decode(text) {
        Ok(ClientFrame::Ping { .. }) => {
            debug!("Ping from {}", conn_id);
            Some(ServerFrame::Pong {
                timestamp: Some(now_millis()),
            })
        }
        Ok(ClientFrame::Unknown) => {
            debug!("Ignoring unknown frame from {}", conn_id);
            None
        }
        Err(e) => {
            warn!("Dropping malformed frame from {}: {}", conn_id, e);
            None
        }
    }
}

async fn send_frame<S>(ws_tx: &mut S, frame: &ServerFrame) -> Result<(), String>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let text = frame.encode().map_err(|e| e.to_string())?;
    ws_tx
        .send(Message::Text(text.into()))
        .await
        .map_err(|e| e.to_string())
}

fn finish(conn_id: &str, state: &HubState, open: &AtomicBool) {
    open.store(false, Ordering::SeqCst);
    state.connections.remove(conn_id);
    debug!("Notification socket removed: {}", conn_id);
}
