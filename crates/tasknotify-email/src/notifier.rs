//! Preference-gated task notification emails.

use std::sync::Arc;

use tracing::{debug, info, warn};

use tasknotify_protocols::{DeliveryChannel, NotificationKind, Task, User};

use crate::provider::{EmailProvider, OutgoingEmail, Sender};
use crate::templates::{self, EmailContent};

/// Sends task notification emails.
///
/// Each `send_*` call returns whether the message was handed to the provider.
/// `false` means not sent: the recipient opted out, has no address, or the
/// provider failed. Nothing is retried.
#[derive(Clone)]
pub struct EmailNotifier {
    provider: Arc<dyn EmailProvider>,
    from: Sender,
    app_url: String,
}

/// Why a message was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    NoPreferences,
    ChannelDisabled,
    KindDisabled,
    NoAddress,
}

impl EmailNotifier {
    pub fn new(provider: Arc<dyn EmailProvider>, from: Sender, app_url: impl Into<String>) -> Self {
        Self {
            provider,
            from,
            app_url: app_url.into(),
        }
    }

    pub async fn send_task_assignment_notification(
        &self,
        task: &Task,
        assignee: &User,
        assigned_by: &User,
    ) -> bool {
        self.dispatch(assignee, NotificationKind::TaskAssigned, || {
            templates::task_assignment(task, assignee, assigned_by, &self.app_url)
        })
        .await
    }

    pub async fn send_task_update_notification(
        &self,
        task: &Task,
        recipient: &User,
        updated_by: &User,
        changes: &[String],
    ) -> bool {
        self.dispatch(recipient, NotificationKind::TaskUpdated, || {
            templates::task_update(task, recipient, updated_by, changes, &self.app_url)
        })
        .await
    }

    pub async fn send_task_completion_notification(
        &self,
        task: &Task,
        recipient: &User,
        completed_by: &User,
    ) -> bool {
        self.dispatch(recipient, NotificationKind::TaskCompleted, || {
            templates::task_completion(task, recipient, completed_by, &self.app_url)
        })
        .await
    }

    async fn dispatch<F>(&self, recipient: &User, kind: NotificationKind, render: F) -> bool
    where
        F: FnOnce() -> EmailContent,
    {
        let to = match gate(recipient, kind) {
            Ok(address) => address.to_string(),
            Err(reason) => {
                debug!("Skipping {} email for user {}: {:?}", kind, recipient.id, reason);
                return false;
            }
        };

        let content = render();
        let email = OutgoingEmail {
            from: self.from.clone(),
            to,
            subject: content.subject,
            text: content.text,
            html: content.html,
        };

        match self.provider.send(&email).await {
            Ok(()) => {
                info!(
                    "Sent {} email to user {} via {}",
                    kind,
                    recipient.id,
                    self.provider.name()
                );
                true
            }
            Err(e) => {
                warn!("Failed to send {} email to user {}: {}", kind, recipient.id, e);
                false
            }
        }
    }
}

/// The recipient's address, if they accept `kind` by email.
fn gate(recipient: &User, kind: NotificationKind) -> Result<&str, Skip> {
    let prefs = recipient.preferences.as_ref().ok_or(Skip::NoPreferences)?;
    if !prefs.allows_channel(DeliveryChannel::Email) {
        return Err(Skip::ChannelDisabled);
    }
    if !prefs.allows_kind(kind) {
        return Err(Skip::KindDisabled);
    }
    recipient.email_address().ok_or(Skip::NoAddress)
}
