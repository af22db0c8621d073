// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduled garbage collection of expired notifications and trashed assets.
//!
//! A sweep is idempotent: running it twice, or from two processes, only
//! deletes what a single run would have deleted.

use std::sync::Arc;
use std::time::Duration;

use aperture_config::model::RetentionConfig;
use aperture_core::{ApertureError, AssetRepository, NotificationRepository, RetentionPolicy};
use chrono::{DateTime, TimeDelta, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Rows removed by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub notifications_purged: usize,
    pub assets_purged: usize,
}

#[derive(Clone)]
pub struct RetentionEngine {
    notifications: Arc<dyn NotificationRepository>,
    assets: Arc<dyn AssetRepository>,
    policy: RetentionPolicy,
    asset_trash_age: TimeDelta,
}

impl RetentionEngine {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        assets: Arc<dyn AssetRepository>,
        policy: RetentionPolicy,
        asset_trash_age: TimeDelta,
    ) -> Self {
        Self {
            notifications,
            assets,
            policy,
            asset_trash_age,
        }
    }

    /// Engine using the thresholds of the `[retention]` section.
    pub fn from_config(
        notifications: Arc<dyn NotificationRepository>,
        assets: Arc<dyn AssetRepository>,
        config: &RetentionConfig,
    ) -> Self {
        Self::new(
            notifications,
            assets,
            config.notification_policy(),
            TimeDelta::days(i64::from(config.asset_trash_days)),
        )
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Purge expired notifications, then trashed assets past their age.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, ApertureError> {
        let notifications_purged = self.notifications.purge_notifications(&self.policy, now).await?;
        let assets_purged = self
            .assets
            .purge_trashed_assets(now - self.asset_trash_age)
            .await?;
        let report = SweepReport {
            notifications_purged,
            assets_purged,
        };
        info!(notifications_purged, assets_purged, "retention sweep complete");
        Ok(report)
    }

    /// Sweep every `interval` until `cancel` fires.
    ///
    /// The first sweep runs one full interval after spawning. A failed sweep
    /// is logged and the loop carries on.
    pub fn spawn(self, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // Skip the first immediate tick.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.sweep(Utc::now()).await {
                            warn!(error = %e, "retention sweep failed (non-fatal)");
                        }
                    }
                    _ = cancel.cancelled() => {
                        debug!("retention task shutting down");
                        break;
                    }
                }
            }
        })
    }
}
