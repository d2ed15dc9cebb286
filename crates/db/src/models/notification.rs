//! Notification row model and insert DTO.

use medportal_core::types::{RecordId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// A row from the `notificaciones` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: RecordId,
    pub user_id: UserId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "mensaje")]
    pub message: String,
    #[serde(rename = "leida", default)]
    pub read: bool,
    /// Producer tag, e.g. `"cita"` for appointment confirmations.
    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting a notification. New notifications are always unread.
#[derive(Debug, Clone, Serialize)]
pub struct NewNotification {
    pub user_id: UserId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "mensaje")]
    pub message: String,
    #[serde(rename = "leida")]
    pub read: bool,
    #[serde(rename = "tipo", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl NewNotification {
    pub fn new(user_id: UserId, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id,
            title: title.into(),
            message: message.into(),
            read: false,
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}
