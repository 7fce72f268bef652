//! # tasknotify Client
//!
//! WebSocket client for real-time task notifications.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐  ws://origin/ws?token=ID  ┌──────────────┐
//! │ NotificationClient │ ◄───────────────────────► │ Notification │
//! │   driver task      │   ping / pong / notify    │     hub      │
//! └─────────┬──────────┘                           └──────────────┘
//!           │ ListenerRegistry
//!           ▼
//!   listeners, NotificationFeed
//! ```
//!
//! - One socket per client, derived from the page origin (`http` → `ws`,
//!   `https` → `wss`) with the identity as the `token` query parameter.
//! - A `ping` frame every 25 seconds while open.
//! - After a close, a fixed 3 second delay before each retry, at most 5
//!   retries. A successful open resets the count.
//! - `notification` frames are fanned out to listeners in subscription order;
//!   malformed frames are logged and dropped.

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod feed;
pub mod heartbeat;
pub mod reconnect;
pub mod registry;
pub mod state;
pub mod transport;

pub use client::{ClientStats, NotificationClient};
pub use config::ClientConfig;
pub use dispatcher::{Dispatch, dispatch};
pub use endpoint::endpoint_url;
pub use error::ClientError;
pub use feed::NotificationFeed;
pub use heartbeat::Heartbeat;
pub use reconnect::{ReconnectDecision, ReconnectPhase, ReconnectPolicy};
pub use registry::{ListenerRegistry, NotificationListener, Subscription};
pub use state::ConnectionState;
pub use transport::{Connection, Connector, FrameSink, FrameStream, WsConnector};
