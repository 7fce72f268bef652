//! # tasknotify Email
//!
//! Task notification emails, gated by each recipient's preferences.
//!
//! - [`templates`] renders the subject, text and HTML bodies
//! - [`EmailProvider`] hands a rendered message to a transactional provider;
//!   [`SendGridProvider`] talks to the SendGrid v3 API
//! - [`EmailNotifier`] checks preferences and address, then sends. Every
//!   failure is logged and reported as `false`, never raised

pub mod error;
pub mod notifier;
pub mod provider;
pub mod templates;

pub use error::EmailError;
pub use notifier::EmailNotifier;
pub use provider::{EmailProvider, OutgoingEmail, Sender, SendGridProvider};
pub use templates::EmailContent;
