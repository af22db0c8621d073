// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification persistence contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ApertureError;
use crate::notification::{NewNotification, Notification, NotificationSearch, NotificationUpdate};
use crate::retention::RetentionPolicy;

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Live notifications of the user matching the filter, newest first.
    async fn search_notifications(
        &self,
        user_id: &str,
        search: &NotificationSearch,
    ) -> Result<Vec<Notification>, ApertureError>;

    async fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, ApertureError>;

    async fn get_notification(&self, id: &str) -> Result<Option<Notification>, ApertureError>;

    /// Fails with [`ApertureError::NotFound`] if missing or soft-deleted.
    async fn update_notification(
        &self,
        id: &str,
        update: &NotificationUpdate,
    ) -> Result<Notification, ApertureError>;

    async fn update_notifications(
        &self,
        ids: &[String],
        update: &NotificationUpdate,
    ) -> Result<usize, ApertureError>;

    async fn delete_notification(&self, id: &str, now: DateTime<Utc>) -> Result<(), ApertureError>;

    async fn delete_notifications(
        &self,
        ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<usize, ApertureError>;

    /// Hard delete every notification matched by the policy; returns the count.
    async fn purge_notifications(
        &self,
        policy: &RetentionPolicy,
        now: DateTime<Utc>,
    ) -> Result<usize, ApertureError>;
}
