//! End-to-end tests against a hub bound to an ephemeral port.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use tasknotify_client::{ClientConfig, ConnectionState, NotificationClient};
use tasknotify_config::HubConfig;
use tasknotify_hub::NotificationHub;
use tasknotify_protocols::{ClientFrame, Notification, NotificationKind, ServerFrame};

const TIMEOUT: Duration = Duration::from_secs(5);

async fn start_hub() -> (NotificationHub, std::net::SocketAddr) {
    let hub = NotificationHub::new(HubConfig {
        port: 0,
        ..HubConfig::default()
    });
    let addr = hub.start().await.unwrap();
    (hub, addr)
}

fn notification() -> Notification {
    Notification::new(
        NotificationKind::TaskAssigned,
        7,
        "Fix bug",
        "You were assigned Fix bug",
        1_700_000_000_000,
    )
}

async fn next_frame<S>(stream: &mut S) -> ServerFrame
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let msg = tokio::time::timeout(TIMEOUT, stream.next())
            .await
            .expect("timed out waiting for frame")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = msg {
            return ServerFrame::decode(text.as_str()).unwrap();
        }
    }
}

#[tokio::test]
async fn test_greeting_ping_and_notification() {
    let (hub, addr) = start_hub().await;
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws?token=42", addr))
        .await
        .unwrap();
    let (mut tx, mut rx) = ws.split();

    assert!(matches!(next_frame(&mut rx).await, ServerFrame::Welcome { .. }));
    assert!(matches!(
        next_frame(&mut rx).await,
        ServerFrame::AuthSuccess { .. }
    ));
    assert!(hub.state().is_user_connected("42"));

    let ping = ClientFrame::ping(1).encode().unwrap();
    tx.send(Message::Text(ping.into())).await.unwrap();
    assert!(matches!(
        next_frame(&mut rx).await,
        ServerFrame::Pong { timestamp: Some(_) }
    ));

    tx.send(Message::Text("not-json".into())).await.unwrap();
    assert_eq!(hub.state().notify_user("42", &notification()), 1);
    assert_eq!(
        next_frame(&mut rx).await,
        ServerFrame::notification(notification())
    );

    hub.stop().await;
}

#[tokio::test]
async fn test_socket_without_token_rejected() {
    let (hub, addr) = start_hub().await;
    let err = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .unwrap_err();

    match err {
        tokio_tungstenite::tungstenite::Error::Http(response) => {
            assert_eq!(response.status().as_u16(), 401);
        }
        other => panic!("unexpected error: {other}"),
    }
    hub.stop().await;
}

#[tokio::test]
async fn test_closed_socket_unregisters() {
    let (hub, addr) = start_hub().await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws?token=9", addr))
        .await
        .unwrap();
    next_frame(&mut ws).await;
    assert_eq!(hub.state().connection_count(), 1);

    ws.close(None).await.unwrap();
    tokio::time::timeout(TIMEOUT, async {
        while hub.state().connection_count() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("connection was not removed");

    hub.stop().await;
}

#[tokio::test]
async fn test_client_round_trip() {
    let (hub, addr) = start_hub().await;
    let client = NotificationClient::new(ClientConfig::new(format!("http://{}", addr)));
    let (tx, mut received) = mpsc::unbounded_channel();
    let _sub = client.subscribe(move |n: &Notification| {
        let _ = tx.send(n.clone());
    });

    let mut state = client.watch_state();
    client.connect("42").unwrap();
    tokio::time::timeout(TIMEOUT, state.wait_for(|s| *s == ConnectionState::Open))
        .await
        .unwrap()
        .unwrap();

    // The hub registers the socket before greeting, so wait for it to show up.
    tokio::time::timeout(TIMEOUT, async {
        while !hub.state().is_user_connected("42") {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(hub.state().notify_user("42", &notification()), 1);
    let delivered = tokio::time::timeout(TIMEOUT, received.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(delivered, notification());

    client.shutdown().await;
    hub.stop().await;
}

#[tokio::test]
async fn test_stop_closes_client_sockets() {
    let (hub, addr) = start_hub().await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws?token=1", addr))
        .await
        .unwrap();
    next_frame(&mut ws).await;

    hub.stop().await;

    let closed = tokio::time::timeout(TIMEOUT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(closed.is_ok());
}
