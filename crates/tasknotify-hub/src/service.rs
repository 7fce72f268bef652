//! Task event delivery over the socket and by email.

use std::sync::Arc;

use tracing::debug;

use tasknotify_email::EmailNotifier;
use tasknotify_protocols::{DeliveryChannel, Notification, NotificationKind, Task, User, now_millis};

use crate::HubState;

/// Outcome of delivering one task event to one recipient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Sockets the notification was queued on.
    pub socket_deliveries: usize,
    /// Whether the email was handed to the provider.
    pub email_sent: bool,
}

/// Fans task events out to the hub and, when configured, to email.
#[derive(Clone)]
pub struct NotificationService {
    hub: Arc<HubState>,
    email: Option<EmailNotifier>,
}

impl NotificationService {
    pub fn new(hub: Arc<HubState>) -> Self {
        Self { hub, email: None }
    }

    pub fn with_email(mut self, email: EmailNotifier) -> Self {
        self.email = Some(email);
        self
    }

    pub async fn task_assigned(
        &self,
        task: &Task,
        assignee: &User,
        assigned_by: &User,
    ) -> DeliveryReport {
        let message = format!("{} assigned you to \"{}\"", assigned_by.name, task.title);
        let email = self.email.as_ref().map(|email| {
            email.send_task_assignment_notification(task, assignee, assigned_by)
        });
        self.deliver(NotificationKind::TaskAssigned, task, assignee, message, email)
            .await
    }

    pub async fn task_updated(
        &self,
        task: &Task,
        recipient: &User,
        updated_by: &User,
        changes: &[String],
    ) -> DeliveryReport {
        let message = format!("{} updated \"{}\"", updated_by.name, task.title);
        let email = self.email.as_ref().map(|email| {
            email.send_task_update_notification(task, recipient, updated_by, changes)
        });
        self.deliver(NotificationKind::TaskUpdated, task, recipient, message, email)
            .await
    }

    pub async fn task_completed(
        &self,
        task: &Task,
        recipient: &User,
        completed_by: &User,
    ) -> DeliveryReport {
        let message = format!("{} completed \"{}\"", completed_by.name, task.title);
        let email = self.email.as_ref().map(|email| {
            email.send_task_completion_notification(task, recipient, completed_by)
        });
        self.deliver(NotificationKind::TaskCompleted, task, recipient, message, email)
            .await
    }

    /// Push the notification, then run the email send if one was built.
    async fn deliver<F>(
        &self,
        kind: NotificationKind,
        task: &Task,
        recipient: &User,
        message: String,
        email: Option<F>,
    ) -> DeliveryReport
    where
        F: Future<Output = bool>,
    {
        let notification = Notification::new(kind, task.id, &task.title, message, now_millis());
        let socket_deliveries = self.push(recipient, &notification);

        let email_sent = match email {
            Some(send) => send.await,
            None => false,
        };

        DeliveryReport {
            socket_deliveries,
            email_sent,
        }
    }

    /// Queue on the recipient's sockets unless they opted out of socket delivery.
    fn push(&self, recipient: &User, notification: &Notification) -> usize {
        let allowed = recipient.preferences.as_ref().is_none_or(|prefs| {
            prefs.allows(DeliveryChannel::Websocket, notification.kind())
        });
        if !allowed {
            debug!(
                "User {} opted out of {} socket notifications",
                recipient.id,
                notification.kind()
            );
            return 0;
        }
        self.hub.notify_user(&recipient.id.to_string(), notification)
    }
}
