//! Task notifications.

use serde::{Deserialize, Serialize};

/// Kind of task event a notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TaskAssigned,
    TaskUpdated,
    TaskCompleted,
}

impl NotificationKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskAssigned => "task_assigned",
            Self::TaskUpdated => "task_updated",
            Self::TaskCompleted => "task_completed",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task notification.
///
/// Built once (by the client dispatcher from a wire payload, or by the hub
/// from a task event) and never mutated afterwards, so fields are only
/// reachable through accessors. Serializes to the same camelCase shape it is
/// parsed from:
///
/// ```json
/// {"type":"task_assigned","taskId":7,"taskTitle":"Fix bug",
///  "message":"You were assigned Fix bug","timestamp":1700000000000}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "type")]
    kind: NotificationKind,
    task_id: i64,
    task_title: String,
    message: String,
    timestamp: i64,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        task_id: i64,
        task_title: impl Into<String>,
        message: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            kind,
            task_id,
            task_title: task_title.into(),
            message: message.into(),
            timestamp,
        }
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    pub fn task_id(&self) -> i64 {
        self.task_id
    }

    pub fn task_title(&self) -> &str {
        &self.task_title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Emission time in epoch milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
