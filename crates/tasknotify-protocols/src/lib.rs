//! # tasknotify Protocols
//!
//! Types shared by every tasknotify crate. Contains only data definitions,
//! no IO.
//!
//! ## Contents
//!
//! - [`Notification`] - Immutable task notification delivered to subscribers
//! - [`ClientFrame`] / [`ServerFrame`] - The JSON envelopes exchanged over `/ws`
//! - [`User`], [`Task`], [`NotificationPreferences`] - Inputs to email and hub delivery

pub mod domain;
pub mod error;
pub mod frame;
pub mod notification;

pub use domain::{DeliveryChannel, NotificationPreferences, Task, TaskPriority, TaskStatus, User};
pub use error::ProtocolError;
pub use frame::{ClientFrame, ServerFrame};
pub use notification::{Notification, NotificationKind, now_millis};
