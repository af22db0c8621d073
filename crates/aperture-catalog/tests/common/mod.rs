// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for the catalog integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use aperture_catalog::Catalog;
use aperture_config::ApertureConfig;
use aperture_config::model::StorageConfig;
use aperture_core::{AssetType, Checksum, NewAsset};
use aperture_storage::SqliteStorage;
use chrono::{NaiveDateTime, TimeZone, Utc};
use tempfile::{TempDir, tempdir};

pub async fn open_catalog() -> (TempDir, Arc<SqliteStorage>, Catalog) {
    let dir = tempdir().unwrap();
    let mut config = ApertureConfig::default();
    config.storage = StorageConfig {
        database_path: dir.path().join("catalog.db").to_str().unwrap().to_string(),
        wal_mode: true,
    };
    let store = Arc::new(SqliteStorage::open(config.storage.clone()).await.unwrap());
    let catalog = Catalog::new(store.clone(), &config);
    (dir, store, catalog)
}

pub fn upload(owner: &str, device_asset_id: &str, content: &str) -> NewAsset {
    let created = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
    NewAsset {
        owner_id: owner.to_string(),
        device_id: "phone".to_string(),
        device_asset_id: device_asset_id.to_string(),
        asset_type: AssetType::Image,
        checksum: Checksum::compute(content.as_bytes()),
        original_path: format!("/upload/{owner}/{device_asset_id}"),
        original_file_name: device_asset_id.to_string(),
        file_created_at: created,
        file_modified_at: created,
        local_date_time: created.naive_utc(),
        ..Default::default()
    }
}

pub fn upload_at(owner: &str, device_asset_id: &str, local: NaiveDateTime) -> NewAsset {
    NewAsset {
        local_date_time: local,
        ..upload(owner, device_asset_id, device_asset_id)
    }
}
