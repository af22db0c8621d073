// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog services for the Aperture asset catalog.
//!
//! Each service depends only on the repository traits it needs, so any
//! backend implementing [`CatalogStore`] can drive them. [`Catalog`] bundles
//! all of them over one storage handle and provides the ingest pipeline.

pub mod duplicates;
pub mod identity;
pub mod pairing;
pub mod retention;
pub mod sync;
pub mod timeline;

use std::sync::Arc;

use aperture_config::ApertureConfig;
use aperture_core::{
    ApertureError, Asset, AssetRepository, AssetStats, AssetStatsOptions, AssetUpdate,
    CatalogStore, HealthStatus, NewAsset, NotificationRepository, StorageAdapter,
};
use chrono::{DateTime, Utc};
use tracing::info;

pub use duplicates::{DuplicateGroupManager, ResolveReport};
pub use identity::{insert_or_get, IdentityResolver, IngestResult, InsertOutcome, ResolutionStatus};
pub use pairing::{LivePhotoMatcher, LivePhotoPair};
pub use retention::{RetentionEngine, SweepReport};
pub use sync::{DeltaPage, SyncCursor, SyncEngine, SyncPage};
pub use timeline::TimelineIndex;

/// Every catalog service over one storage backend.
#[derive(Clone)]
pub struct Catalog {
    storage: Arc<dyn StorageAdapter>,
    assets: Arc<dyn AssetRepository>,
    notifications: Arc<dyn NotificationRepository>,
    identity: IdentityResolver,
    pairing: LivePhotoMatcher,
    timeline: TimelineIndex,
    sync: SyncEngine,
    duplicates: DuplicateGroupManager,
    retention: RetentionEngine,
}

impl Catalog {
    /// Wire the services to an initialized store.
    pub fn new<S: CatalogStore>(store: Arc<S>, config: &ApertureConfig) -> Self {
        Self {
            storage: store.clone(),
            assets: store.clone(),
            notifications: store.clone(),
            identity: IdentityResolver::new(store.clone()),
            pairing: LivePhotoMatcher::new(store.clone()),
            timeline: TimelineIndex::new(store.clone(), config.timeline.default_order),
            sync: SyncEngine::new(store.clone(), config.sync.max_page_size),
            duplicates: DuplicateGroupManager::new(store.clone(), store.clone()),
            retention: RetentionEngine::from_config(store.clone(), store, &config.retention),
        }
    }

    pub fn identity(&self) -> &IdentityResolver {
        &self.identity
    }

    pub fn pairing(&self) -> &LivePhotoMatcher {
        &self.pairing
    }

    pub fn timeline(&self) -> &TimelineIndex {
        &self.timeline
    }

    pub fn sync(&self) -> &SyncEngine {
        &self.sync
    }

    pub fn duplicates(&self) -> &DuplicateGroupManager {
        &self.duplicates
    }

    pub fn retention(&self) -> &RetentionEngine {
        &self.retention
    }

    pub fn notifications(&self) -> &Arc<dyn NotificationRepository> {
        &self.notifications
    }

    /// Resolve an upload to a record and, for new live-photo halves, try to
    /// complete the pair.
    pub async fn ingest(&self, candidate: &NewAsset) -> Result<IngestResult, ApertureError> {
        let mut result = self.identity.resolve(candidate).await?;
        if result.is_created() && result.asset.live_photo_cid.is_some() {
            if let Some(pair) = self.pairing.pair(&result.asset).await? {
                info!(still_id = %pair.still_id, motion_id = %pair.motion_id, "live photo paired");
                if let Some(refreshed) = self.assets.get_asset(&result.asset.id).await? {
                    result.asset = refreshed;
                }
            }
        }
        Ok(result)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Asset>, ApertureError> {
        self.assets.get_asset(id).await
    }

    pub async fn get_many(&self, ids: &[String]) -> Result<Vec<Asset>, ApertureError> {
        self.assets.get_assets(ids).await
    }

    pub async fn update(&self, id: &str, update: &AssetUpdate) -> Result<Asset, ApertureError> {
        self.assets.update_asset(id, update).await
    }

    pub async fn update_all(
        &self,
        ids: &[String],
        update: &AssetUpdate,
    ) -> Result<usize, ApertureError> {
        self.assets.update_assets(ids, update).await
    }

    /// Move assets to the trash.
    pub async fn trash(&self, ids: &[String], now: DateTime<Utc>) -> Result<usize, ApertureError> {
        self.assets.soft_delete_assets(ids, now).await
    }

    pub async fn restore(&self, ids: &[String]) -> Result<usize, ApertureError> {
        self.assets.restore_assets(ids).await
    }

    /// Hard delete, bypassing the trash.
    pub async fn remove(&self, id: &str) -> Result<(), ApertureError> {
        self.assets.remove_asset(id).await
    }

    pub async fn statistics(
        &self,
        owner_id: &str,
        options: &AssetStatsOptions,
    ) -> Result<AssetStats, ApertureError> {
        self.assets.asset_statistics(owner_id, options).await
    }

    pub async fn create_stack(
        &self,
        owner_id: &str,
        primary_asset_id: &str,
        asset_ids: &[String],
    ) -> Result<String, ApertureError> {
        self.assets
            .create_stack(owner_id, primary_asset_id, asset_ids)
            .await
    }

    pub async fn add_to_album(&self, album_id: &str, ids: &[String]) -> Result<(), ApertureError> {
        self.assets.add_album_assets(album_id, ids).await
    }

    pub async fn tag(&self, tag_id: &str, ids: &[String]) -> Result<(), ApertureError> {
        self.assets.add_tag_assets(tag_id, ids).await
    }

    pub async fn add_person(&self, person_id: &str, ids: &[String]) -> Result<(), ApertureError> {
        self.assets.add_person_assets(person_id, ids).await
    }

    pub async fn health(&self) -> Result<HealthStatus, ApertureError> {
        self.storage.health_check().await
    }

    /// Flush and close the backend.
    pub async fn close(&self) -> Result<(), ApertureError> {
        self.storage.close().await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use aperture_config::model::StorageConfig;
    use aperture_core::{AssetType, Checksum, NewAsset};
    use aperture_storage::SqliteStorage;
    use chrono::{NaiveDateTime, TimeZone, Utc};
    use tempfile::{tempdir, TempDir};

    pub async fn open_store() -> (TempDir, Arc<SqliteStorage>) {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("catalog.db").to_str().unwrap().to_string(),
            wal_mode: true,
        };
        let storage = SqliteStorage::open(config).await.unwrap();
        (dir, Arc::new(storage))
    }

    /// An image from `device-1` whose checksum is derived from `content`.
    pub fn new_asset(owner: &str, device_asset_id: &str, content: &str) -> NewAsset {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        NewAsset {
            owner_id: owner.to_string(),
            device_id: "device-1".to_string(),
            device_asset_id: device_asset_id.to_string(),
            asset_type: AssetType::Image,
            checksum: Checksum::compute(content.as_bytes()),
            original_path: format!("/upload/{owner}/{device_asset_id}.jpg"),
            original_file_name: format!("{device_asset_id}.jpg"),
            file_created_at: created,
            file_modified_at: created,
            local_date_time: created.naive_utc(),
            ..Default::default()
        }
    }

    pub fn asset_at(owner: &str, device_asset_id: &str, local: &str) -> NewAsset {
        NewAsset {
            local_date_time: NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M:%S").unwrap(),
            ..new_asset(owner, device_asset_id, device_asset_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{new_asset, open_store};
    use aperture_core::AssetType;

    #[tokio::test]
    async fn ingest_pairs_live_photo_halves() {
        let (_dir, store) = open_store().await;
        let catalog = Catalog::new(store, &ApertureConfig::default());

        let still = NewAsset {
            live_photo_cid: Some("cid".into()),
            ..new_asset("u1", "still", "still")
        };
        let motion = NewAsset {
            asset_type: AssetType::Video,
            live_photo_cid: Some("cid".into()),
            ..new_asset("u1", "motion", "motion")
        };
        let still = catalog.ingest(&still).await.unwrap();
        assert!(still.asset.live_photo_video_id.is_none());
        let motion = catalog.ingest(&motion).await.unwrap();
        assert!(!motion.asset.is_visible);

        let still = catalog.get(still.asset_id()).await.unwrap().unwrap();
        assert_eq!(still.live_photo_video_id.as_deref(), Some(motion.asset_id()));
    }

    #[tokio::test]
    async fn trash_restore_and_statistics() {
        let (_dir, store) = open_store().await;
        let catalog = Catalog::new(store, &ApertureConfig::default());
        let a = catalog.ingest(&new_asset("u1", "a", "a")).await.unwrap();
        catalog.ingest(&new_asset("u1", "b", "b")).await.unwrap();
        let ids = vec![a.asset_id().to_string()];

        assert_eq!(catalog.trash(&ids, Utc::now()).await.unwrap(), 1);
        let live = catalog
            .statistics("u1", &AssetStatsOptions::default())
            .await
            .unwrap();
        assert_eq!(live.total(), 1);
        let trashed = catalog
            .statistics(
                "u1",
                &AssetStatsOptions {
                    is_trashed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(trashed.images, 1);

        assert_eq!(catalog.restore(&ids).await.unwrap(), 1);
        assert_eq!(catalog.health().await.unwrap(), HealthStatus::Healthy);
    }
}
