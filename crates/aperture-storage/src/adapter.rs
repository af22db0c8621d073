// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the catalog repository traits.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use aperture_config::model::StorageConfig;
use aperture_core::{
    ApertureError, Asset, AssetRepository, AssetStats, AssetStatsOptions, AssetUpdate, Checksum,
    ChecksumLookup, DeltaSyncOptions, DuplicateGroup, DuplicateRepository, FullSyncOptions,
    HealthStatus, LivePhotoSearch, NewAsset, NewNotification, Notification,
    NotificationRepository, NotificationSearch, NotificationUpdate, PluginAdapter,
    RegroupOptions, RetentionPolicy, StorageAdapter, SyncRepository, TimeBucketCount,
    TimeBucketKey, TimeBucketOptions, TimelineRepository,
};

use crate::database::{map_tr_err, Database};
use crate::queries;

/// SQLite-backed catalog store.
///
/// Wraps a [`Database`] handle and delegates every operation to the typed
/// query modules. The database is opened by [`StorageAdapter::initialize`]
/// and closed for good by [`StorageAdapter::close`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
    closed: AtomicBool,
}

impl SqliteStorage {
    /// The connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Open the database at the configured path and return the ready store.
    pub async fn open(config: StorageConfig) -> Result<Self, ApertureError> {
        let storage = Self::new(config);
        storage.initialize().await?;
        Ok(storage)
    }

    fn db(&self) -> Result<&Database, ApertureError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ApertureError::Storage {
                source: "storage closed".into(),
            });
        }
        self.db.get().ok_or_else(|| ApertureError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ApertureError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ApertureError> {
        self.close().await?;
        debug!("shutdown: storage closed");
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ApertureError> {
        let path = self.config.database_path.clone();
        let db = Database::open_with(&path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ApertureError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    /// Checkpoint the WAL and close the connection. Idempotent; every later
    /// operation fails with "storage closed".
    async fn close(&self) -> Result<(), ApertureError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!(path = %self.config.database_path, "SQLite storage closed");
        }
        Ok(())
    }
}

#[async_trait]
impl AssetRepository for SqliteStorage {
    async fn create_asset(&self, asset: &NewAsset) -> Result<Asset, ApertureError> {
        queries::assets::create_asset(self.db()?, asset).await
    }

    async fn get_asset(&self, id: &str) -> Result<Option<Asset>, ApertureError> {
        queries::assets::get_asset(self.db()?, id).await
    }

    async fn get_assets(&self, ids: &[String]) -> Result<Vec<Asset>, ApertureError> {
        queries::assets::get_assets(self.db()?, ids).await
    }

    async fn get_by_checksum(
        &self,
        lookup: &ChecksumLookup,
    ) -> Result<Option<Asset>, ApertureError> {
        queries::assets::get_by_checksum(self.db()?, lookup).await
    }

    async fn get_by_checksums(
        &self,
        owner_id: &str,
        checksums: &[Checksum],
    ) -> Result<Vec<Asset>, ApertureError> {
        queries::assets::get_by_checksums(self.db()?, owner_id, checksums).await
    }

    async fn get_by_device_asset_id(
        &self,
        owner_id: &str,
        device_id: &str,
        device_asset_id: &str,
    ) -> Result<Option<Asset>, ApertureError> {
        queries::assets::get_by_device_asset_id(self.db()?, owner_id, device_id, device_asset_id)
            .await
    }

    async fn existing_device_asset_ids(
        &self,
        owner_id: &str,
        device_id: &str,
        device_asset_ids: &[String],
    ) -> Result<Vec<String>, ApertureError> {
        queries::assets::existing_device_asset_ids(
            self.db()?,
            owner_id,
            device_id,
            device_asset_ids,
        )
        .await
    }

    async fn all_device_asset_ids(
        &self,
        owner_id: &str,
        device_id: &str,
    ) -> Result<Vec<String>, ApertureError> {
        queries::assets::all_device_asset_ids(self.db()?, owner_id, device_id).await
    }

    async fn update_asset(&self, id: &str, update: &AssetUpdate) -> Result<Asset, ApertureError> {
        queries::assets::update_asset(self.db()?, id, update).await
    }

    async fn update_assets(
        &self,
        ids: &[String],
        update: &AssetUpdate,
    ) -> Result<usize, ApertureError> {
        queries::assets::update_assets(self.db()?, ids, update).await
    }

    async fn soft_delete_assets(
        &self,
        ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<usize, ApertureError> {
        queries::assets::soft_delete_assets(self.db()?, ids, now).await
    }

    async fn restore_assets(&self, ids: &[String]) -> Result<usize, ApertureError> {
        queries::assets::restore_assets(self.db()?, ids).await
    }

    async fn remove_asset(&self, id: &str) -> Result<(), ApertureError> {
        queries::assets::remove_asset(self.db()?, id).await
    }

    async fn purge_trashed_assets(
        &self,
        deleted_before: DateTime<Utc>,
    ) -> Result<usize, ApertureError> {
        queries::assets::purge_trashed_assets(self.db()?, deleted_before).await
    }

    async fn find_live_photo_match(
        &self,
        search: &LivePhotoSearch,
    ) -> Result<Option<Asset>, ApertureError> {
        queries::live_photos::find_live_photo_match(self.db()?, search).await
    }

    async fn link_live_photo(&self, still_id: &str, motion_id: &str) -> Result<(), ApertureError> {
        queries::live_photos::link_live_photo(self.db()?, still_id, motion_id).await
    }

    async fn live_photo_link_count(&self, motion_id: &str) -> Result<usize, ApertureError> {
        queries::live_photos::live_photo_link_count(self.db()?, motion_id).await
    }

    async fn create_stack(
        &self,
        owner_id: &str,
        primary_asset_id: &str,
        asset_ids: &[String],
    ) -> Result<String, ApertureError> {
        queries::assets::create_stack(self.db()?, owner_id, primary_asset_id, asset_ids).await
    }

    async fn asset_statistics(
        &self,
        owner_id: &str,
        options: &AssetStatsOptions,
    ) -> Result<AssetStats, ApertureError> {
        queries::assets::asset_statistics(self.db()?, owner_id, options).await
    }

    async fn add_album_assets(
        &self,
        album_id: &str,
        asset_ids: &[String],
    ) -> Result<(), ApertureError> {
        queries::relations::add_album_assets(self.db()?, album_id, asset_ids).await
    }

    async fn add_tag_assets(&self, tag_id: &str, asset_ids: &[String]) -> Result<(), ApertureError> {
        queries::relations::add_tag_assets(self.db()?, tag_id, asset_ids).await
    }

    async fn add_person_assets(
        &self,
        person_id: &str,
        asset_ids: &[String],
    ) -> Result<(), ApertureError> {
        queries::relations::add_person_assets(self.db()?, person_id, asset_ids).await
    }
}

#[async_trait]
impl TimelineRepository for SqliteStorage {
    async fn time_buckets(
        &self,
        options: &TimeBucketOptions,
    ) -> Result<Vec<TimeBucketCount>, ApertureError> {
        queries::time_buckets::time_buckets(self.db()?, options).await
    }

    async fn time_bucket_assets(
        &self,
        bucket: &TimeBucketKey,
        options: &TimeBucketOptions,
    ) -> Result<Vec<Asset>, ApertureError> {
        queries::time_buckets::time_bucket_assets(self.db()?, bucket, options).await
    }
}

#[async_trait]
impl SyncRepository for SqliteStorage {
    async fn full_sync_page(&self, options: &FullSyncOptions) -> Result<Vec<Asset>, ApertureError> {
        queries::sync::full_sync_page(self.db()?, options).await
    }

    async fn delta_sync_page(
        &self,
        options: &DeltaSyncOptions,
    ) -> Result<Vec<Asset>, ApertureError> {
        queries::sync::delta_sync_page(self.db()?, options).await
    }
}

#[async_trait]
impl DuplicateRepository for SqliteStorage {
    async fn regroup_duplicates(&self, options: &RegroupOptions) -> Result<(), ApertureError> {
        queries::duplicates::regroup(self.db()?, options).await
    }

    async fn duplicate_groups(&self, owner_id: &str) -> Result<Vec<DuplicateGroup>, ApertureError> {
        queries::duplicates::duplicate_groups(self.db()?, owner_id).await
    }
}

#[async_trait]
impl NotificationRepository for SqliteStorage {
    async fn search_notifications(
        &self,
        user_id: &str,
        search: &NotificationSearch,
    ) -> Result<Vec<Notification>, ApertureError> {
        queries::notifications::search_notifications(self.db()?, user_id, search).await
    }

    async fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, ApertureError> {
        queries::notifications::create_notification(self.db()?, notification).await
    }

    async fn get_notification(&self, id: &str) -> Result<Option<Notification>, ApertureError> {
        queries::notifications::get_notification(self.db()?, id).await
    }

    async fn update_notification(
        &self,
        id: &str,
        update: &NotificationUpdate,
    ) -> Result<Notification, ApertureError> {
        queries::notifications::update_notification(self.db()?, id, update).await
    }

    async fn update_notifications(
        &self,
        ids: &[String],
        update: &NotificationUpdate,
    ) -> Result<usize, ApertureError> {
        queries::notifications::update_notifications(self.db()?, ids, update).await
    }

    async fn delete_notification(&self, id: &str, now: DateTime<Utc>) -> Result<(), ApertureError> {
        queries::notifications::delete_notification(self.db()?, id, now).await
    }

    async fn delete_notifications(
        &self,
        ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<usize, ApertureError> {
        queries::notifications::delete_notifications(self.db()?, ids, now).await
    }

    async fn purge_notifications(
        &self,
        policy: &RetentionPolicy,
        now: DateTime<Utc>,
    ) -> Result<usize, ApertureError> {
        queries::notifications::purge_notifications(self.db()?, policy, now).await
    }
}
