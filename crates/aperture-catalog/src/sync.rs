// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full and delta synchronization for clients keeping a local mirror.
//!
//! A full sync walks an owner's assets in id order under a fixed
//! `updated_until` ceiling captured when the session starts. A delta sync
//! returns everything changed after a watermark, ordered by
//! `(updated_at, id)`, across all the users a client follows.

use std::sync::Arc;

use aperture_core::{
    ApertureError, Asset, DeltaSyncOptions, DeltaWatermark, FullSyncOptions, SyncRepository,
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Opaque resume point of a full sync session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCursor {
    pub owner_id: String,
    pub updated_until: DateTime<Utc>,
    pub last_id: String,
}

impl SyncCursor {
    /// URL-safe token for handing to clients.
    pub fn encode(&self) -> Result<String, ApertureError> {
        let json = serde_json::to_vec(self)
            .map_err(|e| ApertureError::Internal(format!("failed to encode sync cursor: {e}")))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    pub fn decode(token: &str) -> Result<Self, ApertureError> {
        let json = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| ApertureError::InvalidRange(format!("malformed sync cursor: {e}")))?;
        serde_json::from_slice(&json)
            .map_err(|e| ApertureError::InvalidRange(format!("malformed sync cursor: {e}")))
    }

    /// Options for the page after this cursor.
    pub fn resume(&self, limit: usize) -> FullSyncOptions {
        FullSyncOptions {
            owner_id: self.owner_id.clone(),
            last_id: Some(self.last_id.clone()),
            updated_until: self.updated_until,
            limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPage {
    pub assets: Vec<Asset>,
    /// Where the next page starts; `None` on an empty page.
    pub cursor: Option<SyncCursor>,
    /// Fewer rows than requested: the session is finished.
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaPage {
    pub assets: Vec<Asset>,
    /// Watermark to pass back, or `None` when nothing changed.
    pub watermark: Option<DeltaWatermark>,
    pub is_complete: bool,
}

impl DeltaPage {
    /// Options for the next page, resuming exactly after this one.
    pub fn next(&self, previous: &DeltaSyncOptions) -> Option<DeltaSyncOptions> {
        self.watermark.as_ref().map(|w| DeltaSyncOptions {
            user_ids: previous.user_ids.clone(),
            updated_after: w.updated_at,
            after_id: Some(w.last_id.clone()),
            limit: previous.limit,
        })
    }
}

#[derive(Clone)]
pub struct SyncEngine {
    repo: Arc<dyn SyncRepository>,
    max_page_size: usize,
}

impl SyncEngine {
    pub fn new(repo: Arc<dyn SyncRepository>, max_page_size: usize) -> Self {
        Self {
            repo,
            max_page_size,
        }
    }

    fn check_limit(&self, limit: usize) -> Result<(), ApertureError> {
        if limit == 0 {
            return Err(ApertureError::InvalidRange(
                "sync limit must be positive".to_string(),
            ));
        }
        if limit > self.max_page_size {
            return Err(ApertureError::InvalidRange(format!(
                "sync limit {limit} exceeds the maximum page size {}",
                self.max_page_size
            )));
        }
        Ok(())
    }

    pub async fn full_sync(&self, options: &FullSyncOptions) -> Result<SyncPage, ApertureError> {
        self.check_limit(options.limit)?;
        let assets = self.repo.full_sync_page(options).await?;
        let is_complete = assets.len() < options.limit;
        let cursor = assets.last().map(|last| SyncCursor {
            owner_id: options.owner_id.clone(),
            updated_until: options.updated_until,
            last_id: last.id.clone(),
        });
        debug!(
            owner_id = %options.owner_id,
            count = assets.len(),
            is_complete,
            "full sync page"
        );
        Ok(SyncPage {
            assets,
            cursor,
            is_complete,
        })
    }

    pub async fn delta_sync(&self, options: &DeltaSyncOptions) -> Result<DeltaPage, ApertureError> {
        self.check_limit(options.limit)?;
        if options.user_ids.is_empty() {
            return Err(ApertureError::InvalidRange(
                "delta sync needs at least one user id".to_string(),
            ));
        }
        let assets = self.repo.delta_sync_page(options).await?;
        let is_complete = assets.len() < options.limit;
        let watermark = assets.last().map(|last| DeltaWatermark {
            updated_at: last.updated_at,
            last_id: last.id.clone(),
        });
        debug!(users = options.user_ids.len(), count = assets.len(), is_complete, "delta sync page");
        Ok(DeltaPage {
            assets,
            watermark,
            is_complete,
        })
    }
}
