//! Socket transport.
//!
//! The client drives a [`Connection`] made of a text-frame sink and a
//! text-frame stream. [`WsConnector`] opens real WebSockets with
//! `tokio-tungstenite`; any other [`Connector`] (e.g. in-memory channels in
//! tests) can stand in for it.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Sink, SinkExt, Stream, StreamExt, future};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace};
use url::Url;

use crate::error::ClientError;

/// Outbound text frames.
pub type FrameSink = Pin<Box<dyn Sink<String, Error = ClientError> + Send>>;

/// Inbound text frames. The stream ends when the socket closes.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, ClientError>> + Send>>;

/// An open socket split into its two halves.
pub struct Connection {
    pub sink: FrameSink,
    pub stream: FrameStream,
}

impl Connection {
    pub fn new(sink: FrameSink, stream: FrameStream) -> Self {
        Self { sink, stream }
    }
}

/// Opens sockets.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, url: &Url) -> Result<Connection, ClientError>;
}

/// WebSocket connector backed by `tokio-tungstenite`.
#[derive(Debug, Default, Clone)]
pub struct WsConnector;

impl WsConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &Url) -> Result<Connection, ClientError> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| ClientError::ConnectionFailed(format!("{}: {}", url, e)))?;

        let (ws_sink, ws_source) = ws_stream.split();

        let sink = ws_sink
            .sink_map_err(ClientError::from)
            .with(|text: String| future::ready(Ok::<_, ClientError>(Message::Text(text.into()))));

        let stream = ws_source.filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Text(text)) => {
                    trace!("WebSocket recv: {}", text.as_str());
                    Some(Ok(text.as_str().to_owned()))
                }
                Ok(Message::Close(frame)) => {
                    debug!("WebSocket close frame: {:?}", frame);
                    None
                }
                Ok(_) => None,
                Err(e) => Some(Err(ClientError::from(e))),
            })
        });

        Ok(Connection::new(Box::pin(sink), Box::pin(stream)))
    }
}
