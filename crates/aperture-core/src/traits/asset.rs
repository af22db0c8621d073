// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Asset persistence contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::asset::{
    Asset, AssetStats, AssetStatsOptions, AssetUpdate, Checksum, ChecksumLookup, LivePhotoSearch,
    NewAsset,
};
use crate::error::ApertureError;

/// Asset records, identity lookups, live-photo links, and relations.
///
/// Lookups only see live (non-trashed) assets unless stated otherwise and
/// return `None`/empty when nothing matches. Every mutation advances the
/// touched rows' `updated_at`.
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Insert a new asset with a generated id.
    ///
    /// Fails with [`ApertureError::Conflict`] when the checksum or device
    /// uniqueness constraint is violated.
    async fn create_asset(&self, asset: &NewAsset) -> Result<Asset, ApertureError>;

    /// Fetch by id, including trashed assets.
    async fn get_asset(&self, id: &str) -> Result<Option<Asset>, ApertureError>;

    /// Fetch several assets by id, including trashed ones. Unknown ids are skipped.
    async fn get_assets(&self, ids: &[String]) -> Result<Vec<Asset>, ApertureError>;

    async fn get_by_checksum(&self, lookup: &ChecksumLookup)
        -> Result<Option<Asset>, ApertureError>;

    /// Live assets of `owner_id` (any library) whose checksum is in `checksums`.
    async fn get_by_checksums(
        &self,
        owner_id: &str,
        checksums: &[Checksum],
    ) -> Result<Vec<Asset>, ApertureError>;

    async fn get_by_device_asset_id(
        &self,
        owner_id: &str,
        device_id: &str,
        device_asset_id: &str,
    ) -> Result<Option<Asset>, ApertureError>;

    /// Subset of `device_asset_ids` already registered by the device.
    async fn existing_device_asset_ids(
        &self,
        owner_id: &str,
        device_id: &str,
        device_asset_ids: &[String],
    ) -> Result<Vec<String>, ApertureError>;

    /// Every device asset id registered by the device.
    async fn all_device_asset_ids(
        &self,
        owner_id: &str,
        device_id: &str,
    ) -> Result<Vec<String>, ApertureError>;

    /// Update a live asset. Fails with [`ApertureError::NotFound`] if it is
    /// missing or trashed.
    async fn update_asset(&self, id: &str, update: &AssetUpdate) -> Result<Asset, ApertureError>;

    /// Apply the same update to every live asset in `ids`; returns rows touched.
    async fn update_assets(&self, ids: &[String], update: &AssetUpdate)
        -> Result<usize, ApertureError>;

    async fn soft_delete_assets(
        &self,
        ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<usize, ApertureError>;

    /// Clear the soft-delete marker. Fails with [`ApertureError::Conflict`]
    /// when a live asset already holds the same checksum or device id.
    async fn restore_assets(&self, ids: &[String]) -> Result<usize, ApertureError>;

    /// Hard delete. Duplicate groups left with fewer than two members vanish.
    async fn remove_asset(&self, id: &str) -> Result<(), ApertureError>;

    /// Hard delete every asset trashed before `deleted_before`.
    async fn purge_trashed_assets(
        &self,
        deleted_before: DateTime<Utc>,
    ) -> Result<usize, ApertureError>;

    async fn find_live_photo_match(
        &self,
        search: &LivePhotoSearch,
    ) -> Result<Option<Asset>, ApertureError>;

    /// Point `still_id` at `motion_id` and hide the motion half.
    async fn link_live_photo(&self, still_id: &str, motion_id: &str) -> Result<(), ApertureError>;

    /// Number of stills referencing the motion asset.
    async fn live_photo_link_count(&self, motion_id: &str) -> Result<usize, ApertureError>;

    /// Group `asset_ids` (which must include `primary_asset_id`) into a new stack.
    async fn create_stack(
        &self,
        owner_id: &str,
        primary_asset_id: &str,
        asset_ids: &[String],
    ) -> Result<String, ApertureError>;

    async fn asset_statistics(
        &self,
        owner_id: &str,
        options: &AssetStatsOptions,
    ) -> Result<AssetStats, ApertureError>;

    async fn add_album_assets(&self, album_id: &str, asset_ids: &[String])
        -> Result<(), ApertureError>;

    async fn add_tag_assets(&self, tag_id: &str, asset_ids: &[String]) -> Result<(), ApertureError>;

    async fn add_person_assets(&self, person_id: &str, asset_ids: &[String])
        -> Result<(), ApertureError>;
}
