// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::retention::RetentionSubject;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum NotificationType {
    JobFailed,
    BackupFailed,
    SystemMessage,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub level: NotificationLevel,
    pub notification_type: NotificationType,
    pub title: String,
    pub description: Option<String>,
    /// Arbitrary JSON payload, stored as text.
    pub data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<&Notification> for RetentionSubject {
    fn from(n: &Notification) -> Self {
        Self {
            created_at: n.created_at,
            read_at: n.read_at,
            deleted_at: n.deleted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: String,
    pub level: NotificationLevel,
    pub notification_type: NotificationType,
    pub title: String,
    pub description: Option<String>,
    pub data: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewNotification {
    /// A notification created now with no description or payload.
    pub fn new(
        user_id: impl Into<String>,
        level: NotificationLevel,
        notification_type: NotificationType,
        title: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            level,
            notification_type,
            title: title.into(),
            description: None,
            data: None,
            created_at: Utc::now(),
        }
    }
}

/// Search filter; every set field must match. Soft-deleted rows never match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationSearch {
    pub id: Option<String>,
    pub level: Option<NotificationLevel>,
    pub notification_type: Option<NotificationType>,
    pub unread: bool,
}

/// Partial update. `read_at: Some(None)` marks a notification unread again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationUpdate {
    pub read_at: Option<Option<DateTime<Utc>>>,
}

impl NotificationUpdate {
    pub fn mark_read(at: DateTime<Utc>) -> Self {
        Self {
            read_at: Some(Some(at)),
        }
    }

    pub fn mark_unread() -> Self {
        Self {
            read_at: Some(None),
        }
    }
}
