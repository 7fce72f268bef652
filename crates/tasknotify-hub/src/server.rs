//! HTTP server and routing.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Query, State,
        ws::{WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::HubState;
use crate::connection::{HubConnection, handle_connection};

/// Query string of the socket endpoint.
#[derive(Debug, Deserialize)]
pub struct SocketParams {
    #[serde(default)]
    pub token: Option<String>,
}

/// Create the Axum router for the hub.
pub fn create_router(state: Arc<HubState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// WebSocket upgrade handler. The token is checked before the upgrade.
async fn ws_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    Query(params): Query<SocketParams>,
    State(state): State<Arc<HubState>>,
) -> Response {
    let Some(user_id) = params
        .token
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
    else {
        warn!("Rejected socket without token");
        return (StatusCode::UNAUTHORIZED, "Missing token").into_response();
    };

    match ws {
        Ok(ws) => ws.on_upgrade(move |socket| handle_socket(socket, user_id, state)),
        Err(rejection) => rejection.into_response(),
    }
}

/// Register a new socket and start its task.
async fn handle_socket(socket: WebSocket, user_id: String, state: Arc<HubState>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    debug!("New notification socket {} for user {}", conn_id, user_id);

    let (conn, outbound_rx) = HubConnection::new(&conn_id, &user_id, state.outbound_buffer);
    let open = conn.open_flag();
    state.connections.insert(conn_id.clone(), conn);

    handle_connection(conn_id, user_id, socket, outbound_rx, state, open).await;
}

/// Health check endpoint.
async fn health_check(State(state): State<Arc<HubState>>) -> impl IntoResponse {
    let status = if state.started.load(std::sync::atomic::Ordering::SeqCst) {
        "ok"
    } else {
        "starting"
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        serde_json::json!({
            "status": status,
            "connections": state.connection_count(),
            "users": state.user_count(),
        })
        .to_string(),
    )
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
