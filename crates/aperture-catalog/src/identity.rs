// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content-addressed identity resolution for uploads.
//!
//! A candidate asset resolves to an existing record when the owner already
//! holds the same checksum in the same upload space or library, or when the
//! same device re-announces a local asset id it registered before. Checksum
//! equality is treated as content equality.

use std::future::Future;
use std::sync::Arc;

use aperture_core::{ApertureError, Asset, AssetRepository, Checksum, ChecksumLookup, NewAsset};
use tracing::{debug, warn};

/// How an ingest request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionStatus {
    /// A new record was created.
    Created,
    /// The owner already holds this content.
    Duplicate,
    /// The device registered this local asset id before.
    Reannounced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestResult {
    pub asset: Asset,
    pub status: ResolutionStatus,
}

impl IngestResult {
    pub fn asset_id(&self) -> &str {
        &self.asset.id
    }

    pub fn is_created(&self) -> bool {
        self.status == ResolutionStatus::Created
    }
}

/// Outcome of [`insert_or_get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome<T> {
    Inserted(T),
    /// A concurrent writer won the race; this is its record.
    Existing(T),
}

impl<T> InsertOutcome<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Inserted(value) | Self::Existing(value) => value,
        }
    }
}

/// Run `insert`; on a uniqueness conflict run `lookup` once and return the
/// winner.
///
/// `lookup` is only polled after a conflict. A conflict with no visible
/// winner is returned unchanged. Other errors propagate without a lookup.
pub async fn insert_or_get<T, I, L>(insert: I, lookup: L) -> Result<InsertOutcome<T>, ApertureError>
where
    I: Future<Output = Result<T, ApertureError>>,
    L: Future<Output = Result<Option<T>, ApertureError>>,
{
    match insert.await {
        Ok(value) => Ok(InsertOutcome::Inserted(value)),
        Err(err) if err.is_conflict() => {
            warn!(error = %err, "insert lost a uniqueness race, looking up the winner");
            match lookup.await? {
                Some(existing) => Ok(InsertOutcome::Existing(existing)),
                None => Err(err),
            }
        }
        Err(err) => Err(err),
    }
}

/// Resolves uploads to catalog records.
#[derive(Clone)]
pub struct IdentityResolver {
    assets: Arc<dyn AssetRepository>,
}

impl IdentityResolver {
    pub fn new(assets: Arc<dyn AssetRepository>) -> Self {
        Self { assets }
    }

    /// The existing record `candidate` resolves to, checksum first.
    pub async fn find_existing(
        &self,
        candidate: &NewAsset,
    ) -> Result<Option<IngestResult>, ApertureError> {
        if let Some(asset) = self
            .assets
            .get_by_checksum(&ChecksumLookup::for_asset(candidate))
            .await?
        {
            return Ok(Some(IngestResult {
                asset,
                status: ResolutionStatus::Duplicate,
            }));
        }
        let reannounced = self
            .assets
            .get_by_device_asset_id(
                &candidate.owner_id,
                &candidate.device_id,
                &candidate.device_asset_id,
            )
            .await?;
        Ok(reannounced.map(|asset| IngestResult {
            asset,
            status: ResolutionStatus::Reannounced,
        }))
    }

    /// Return the record for `candidate`, creating it when none exists.
    pub async fn resolve(&self, candidate: &NewAsset) -> Result<IngestResult, ApertureError> {
        if let Some(existing) = self.find_existing(candidate).await? {
            debug!(
                asset_id = %existing.asset.id,
                status = ?existing.status,
                "upload resolved to existing asset"
            );
            return Ok(existing);
        }

        let insert = async {
            let asset = self.assets.create_asset(candidate).await?;
            Ok(IngestResult {
                asset,
                status: ResolutionStatus::Created,
            })
        };
        let outcome = insert_or_get(insert, self.find_existing(candidate)).await?;
        let result = outcome.into_inner();
        debug!(asset_id = %result.asset.id, status = ?result.status, "upload resolved");
        Ok(result)
    }

    /// Live assets of `owner_id` whose checksum is among `checksums`, in any
    /// library. Clients call this before uploading.
    pub async fn check_existing(
        &self,
        owner_id: &str,
        checksums: &[Checksum],
    ) -> Result<Vec<Asset>, ApertureError> {
        self.assets.get_by_checksums(owner_id, checksums).await
    }

    /// Subset of `device_asset_ids` the device already registered.
    pub async fn existing_device_asset_ids(
        &self,
        owner_id: &str,
        device_id: &str,
        device_asset_ids: &[String],
    ) -> Result<Vec<String>, ApertureError> {
        self.assets
            .existing_device_asset_ids(owner_id, device_id, device_asset_ids)
            .await
    }

    pub async fn all_device_asset_ids(
        &self,
        owner_id: &str,
        device_id: &str,
    ) -> Result<Vec<String>, ApertureError> {
        self.assets.all_device_asset_ids(owner_id, device_id).await
    }
}
