// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live-photo pairing.
//!
//! A live photo arrives as two assets sharing a content identifier: a still
//! image and a short motion video. Whichever half is ingested second
//! completes the pair; the still then points at the motion half and the
//! motion half is hidden from timelines.

use std::sync::Arc;

use aperture_core::{ApertureError, Asset, AssetRepository, AssetType, LivePhotoSearch};
use tracing::debug;

/// A linked still/motion pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivePhotoPair {
    pub still_id: String,
    pub motion_id: String,
}

#[derive(Clone)]
pub struct LivePhotoMatcher {
    assets: Arc<dyn AssetRepository>,
}

impl LivePhotoMatcher {
    pub fn new(assets: Arc<dyn AssetRepository>) -> Self {
        Self { assets }
    }

    /// The sibling of the requested type, or `None` when it has not been
    /// ingested yet.
    pub async fn find_match(
        &self,
        search: &LivePhotoSearch,
    ) -> Result<Option<Asset>, ApertureError> {
        self.assets.find_live_photo_match(search).await
    }

    /// Link `asset` with its counterpart if both halves are present.
    ///
    /// Returns `None` when the asset carries no content identifier, is
    /// trashed, has no counterpart yet, or the still is already linked.
    pub async fn pair(&self, asset: &Asset) -> Result<Option<LivePhotoPair>, ApertureError> {
        let Some(cid) = asset.live_photo_cid.as_ref() else {
            return Ok(None);
        };
        if asset.is_trashed() {
            return Ok(None);
        }

        let search = LivePhotoSearch {
            owner_id: asset.owner_id.clone(),
            library_id: asset.library_id.clone(),
            live_photo_cid: cid.clone(),
            other_asset_id: asset.id.clone(),
            asset_type: asset.asset_type.counterpart(),
        };
        let Some(sibling) = self.find_match(&search).await? else {
            debug!(asset_id = %asset.id, cid = %cid, "live photo counterpart not ingested yet");
            return Ok(None);
        };

        let (still, motion) = match asset.asset_type {
            AssetType::Image => (asset, &sibling),
            AssetType::Video => (&sibling, asset),
        };
        if still.live_photo_video_id.is_some() {
            debug!(still_id = %still.id, "still already linked");
            return Ok(None);
        }

        self.assets.link_live_photo(&still.id, &motion.id).await?;
        Ok(Some(LivePhotoPair {
            still_id: still.id.clone(),
            motion_id: motion.id.clone(),
        }))
    }

    /// Live stills referencing the motion asset.
    pub async fn link_count(&self, motion_id: &str) -> Result<usize, ApertureError> {
        self.assets.live_photo_link_count(motion_id).await
    }
}
