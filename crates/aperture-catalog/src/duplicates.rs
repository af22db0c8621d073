// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Duplicate group lifecycle: flagging, regrouping, listing, and resolution.
//!
//! Groups partition an owner's assets; an asset belongs to at most one
//! group and a group with fewer than two members ceases to exist.

use std::collections::BTreeSet;
use std::sync::Arc;

use aperture_core::{
    ApertureError, AssetRepository, DuplicateGroup, DuplicateRepository, RegroupOptions,
};
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

/// Result of [`DuplicateGroupManager::resolve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveReport {
    pub kept: usize,
    pub trashed: usize,
}

#[derive(Clone)]
pub struct DuplicateGroupManager {
    groups: Arc<dyn DuplicateRepository>,
    assets: Arc<dyn AssetRepository>,
}

impl DuplicateGroupManager {
    pub fn new(groups: Arc<dyn DuplicateRepository>, assets: Arc<dyn AssetRepository>) -> Self {
        Self { groups, assets }
    }

    pub async fn regroup(&self, options: &RegroupOptions) -> Result<(), ApertureError> {
        self.groups.regroup_duplicates(options).await
    }

    /// Groups with at least two live members.
    pub async fn list_groups(&self, owner_id: &str) -> Result<Vec<DuplicateGroup>, ApertureError> {
        self.groups.duplicate_groups(owner_id).await
    }

    /// Mark `asset_ids` as duplicates of each other.
    ///
    /// Groups the named assets already belong to are merged into one; the
    /// smallest existing group id survives, otherwise a new id is minted.
    pub async fn flag(&self, owner_id: &str, asset_ids: &[String]) -> Result<String, ApertureError> {
        let distinct: BTreeSet<&String> = asset_ids.iter().collect();
        if distinct.len() < 2 {
            return Err(ApertureError::InvalidRange(
                "flagging duplicates needs at least two assets".to_string(),
            ));
        }

        let assets = self.assets.get_assets(asset_ids).await?;
        let mut existing: BTreeSet<String> = assets
            .iter()
            .filter(|a| a.owner_id == owner_id)
            .filter_map(|a| a.duplicate_id.clone())
            .collect();
        let target = match existing.pop_first() {
            Some(group_id) => group_id,
            None => Uuid::new_v4().to_string(),
        };

        self.groups
            .regroup_duplicates(&RegroupOptions {
                owner_id: owner_id.to_string(),
                target_group_id: Some(target.clone()),
                asset_ids: asset_ids.to_vec(),
                source_group_ids: existing.into_iter().collect(),
            })
            .await?;
        info!(owner_id, group_id = %target, assets = distinct.len(), "duplicates flagged");
        Ok(target)
    }

    /// Settle a group: trash the `trash` members and dissolve the group.
    ///
    /// Every named asset must be a member of the group. A group with no
    /// members visible to `owner_id` is `NotFound`.
    pub async fn resolve(
        &self,
        owner_id: &str,
        group_id: &str,
        keep: &[String],
        trash: &[String],
        now: DateTime<Utc>,
    ) -> Result<ResolveReport, ApertureError> {
        let group = self
            .list_groups(owner_id)
            .await?
            .into_iter()
            .find(|g| g.duplicate_id == group_id)
            .ok_or_else(|| ApertureError::not_found("duplicate group", group_id))?;

        let members: BTreeSet<&str> = group.assets.iter().map(|a| a.id.as_str()).collect();
        if let Some(stranger) = keep
            .iter()
            .chain(trash)
            .find(|id| !members.contains(id.as_str()))
        {
            return Err(ApertureError::InvalidRange(format!(
                "asset {stranger} is not a member of duplicate group {group_id}"
            )));
        }

        let trashed = self.assets.soft_delete_assets(trash, now).await?;
        self.groups
            .regroup_duplicates(&RegroupOptions {
                owner_id: owner_id.to_string(),
                target_group_id: None,
                asset_ids: Vec::new(),
                source_group_ids: vec![group_id.to_string()],
            })
            .await?;
        info!(owner_id, group_id, kept = keep.len(), trashed, "duplicate group resolved");
        Ok(ResolveReport {
            kept: keep.len(),
            trashed,
        })
    }
}
