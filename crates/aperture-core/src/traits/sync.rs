// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered, paginated scans backing client synchronization.

use async_trait::async_trait;

use crate::asset::Asset;
use crate::error::ApertureError;
use crate::sync::{DeltaSyncOptions, FullSyncOptions};

#[async_trait]
pub trait SyncRepository: Send + Sync {
    /// Up to `limit` assets of the owner ordered by id, strictly after
    /// `last_id`, with `updated_at <= updated_until`. Trashed assets included.
    async fn full_sync_page(&self, options: &FullSyncOptions) -> Result<Vec<Asset>, ApertureError>;

    /// Assets of the named users changed after the watermark, ordered by
    /// `(updated_at, id)`.
    ///
    /// Without `after_id`, a full page is extended with every remaining row
    /// sharing its last `updated_at`, so the page may exceed `limit`.
    async fn delta_sync_page(&self, options: &DeltaSyncOptions)
        -> Result<Vec<Asset>, ApertureError>;
}
