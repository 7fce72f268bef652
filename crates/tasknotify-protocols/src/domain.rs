//! Users, tasks and per-user delivery preferences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::notification::NotificationKind;

/// Delivery channels a user can opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryChannel {
    Email,
    Websocket,
    /// Any channel this service does not deliver to (e.g. `push`).
    #[serde(other)]
    Other,
}

/// Per-user notification preferences.
///
/// A kind flag that is absent counts as disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    #[serde(default)]
    pub channels: Vec<DeliveryChannel>,
    #[serde(default)]
    pub task_assignment: bool,
    #[serde(default)]
    pub task_updates: bool,
    #[serde(default)]
    pub task_completion: bool,
}

impl NotificationPreferences {
    /// Preferences with every channel and every kind enabled.
    pub fn all() -> Self {
        Self {
            channels: vec![DeliveryChannel::Email, DeliveryChannel::Websocket],
            task_assignment: true,
            task_updates: true,
            task_completion: true,
        }
    }

    pub fn allows_channel(&self, channel: DeliveryChannel) -> bool {
        self.channels.contains(&channel)
    }

    pub fn allows_kind(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::TaskAssigned => self.task_assignment,
            NotificationKind::TaskUpdated => self.task_updates,
            NotificationKind::TaskCompleted => self.task_completion,
        }
    }

    /// Whether `kind` may be delivered over `channel`.
    pub fn allows(&self, channel: DeliveryChannel, kind: NotificationKind) -> bool {
        self.allows_channel(channel) && self.allows_kind(kind)
    }
}

/// An application user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    /// A non-string address in the input reads as no address.
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<NotificationPreferences>,
}

impl User {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            preferences: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_preferences(mut self, preferences: NotificationPreferences) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// The user's address if it is present and non-blank.
    pub fn email_address(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(address) => Some(address),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Todo => "To do",
            Self::InProgress => "In progress",
            Self::Review => "In review",
            Self::Done => "Done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// A task as seen by the notification layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
}

impl Task {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            due_date: None,
            status: TaskStatus::default(),
            priority: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_missing_flags_are_disabled() {
        let prefs: NotificationPreferences =
            serde_json::from_str(r#"{"channels":["email"]}"#).unwrap();
        assert!(prefs.allows_channel(DeliveryChannel::Email));
        assert!(!prefs.allows_kind(NotificationKind::TaskAssigned));
        assert!(!prefs.allows(DeliveryChannel::Email, NotificationKind::TaskCompleted));
    }

    #[test]
    fn test_preferences_explicit_false() {
        let prefs: NotificationPreferences =
            serde_json::from_str(r#"{"channels":["email"],"taskAssignment":false,"taskUpdates":true}"#)
                .unwrap();
        assert!(!prefs.allows(DeliveryChannel::Email, NotificationKind::TaskAssigned));
        assert!(prefs.allows(DeliveryChannel::Email, NotificationKind::TaskUpdated));
        assert!(!prefs.allows(DeliveryChannel::Websocket, NotificationKind::TaskUpdated));
    }

    #[test]
    fn test_preferences_unknown_channel_tolerated() {
        let prefs: NotificationPreferences =
            serde_json::from_str(r#"{"channels":["push","websocket"],"taskCompletion":true}"#)
                .unwrap();
        assert_eq!(prefs.channels, vec![DeliveryChannel::Other, DeliveryChannel::Websocket]);
        assert!(prefs.allows(DeliveryChannel::Websocket, NotificationKind::TaskCompleted));
    }

    #[test]
    fn test_preferences_all() {
        let prefs = NotificationPreferences::all();
        for kind in [
            NotificationKind::TaskAssigned,
            NotificationKind::TaskUpdated,
            NotificationKind::TaskCompleted,
        ] {
            assert!(prefs.allows(DeliveryChannel::Email, kind));
            assert!(prefs.allows(DeliveryChannel::Websocket, kind));
        }
    }

    #[test]
    fn test_non_string_email_reads_as_missing() {
        for json in [
            r#"{"id":5,"name":"Ada","email":42}"#,
            r#"{"id":5,"name":"Ada","email":null}"#,
            r#"{"id":5,"name":"Ada","email":{"work":"a@example.com"}}"#,
        ] {
            let user: User = serde_json::from_str(json).unwrap();
            assert_eq!(user.email, None, "{}", json);
            assert_eq!(user.email_address(), None);
        }
    }

    #[test]
    fn test_email_address_blank_is_missing() {
        assert_eq!(User::new(1, "a").email_address(), None);
        assert_eq!(User::new(1, "a").with_email("   ").email_address(), None);
        assert_eq!(
            User::new(1, "a").with_email("a@example.com").email_address(),
            Some("a@example.com")
        );
    }

    #[test]
    fn test_user_deserialization() {
        let json = r#"{"id":5,"name":"Ada","email":"ada@example.com","preferences":{"channels":["email"],"taskAssignment":true}}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 5);
        assert!(user.preferences.unwrap().task_assignment);
    }

    #[test]
    fn test_task_defaults() {
        let task: Task = serde_json::from_str(r#"{"id":1,"title":"Write docs"}"#).unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(task.due_date.is_none());
        assert!(task.priority.is_none());
    }

    #[test]
    fn test_task_status_serialization() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        assert_eq!(TaskStatus::Review.label(), "In review");
    }

    #[test]
    fn test_priority_ordering() {
        assert!(TaskPriority::Low < TaskPriority::Urgent);
    }
}
