// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Asset records and the request types used to create, look up, and mutate them.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::types::AssetType;

/// Binary content digest of an asset's original file (SHA-1).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(pub Vec<u8>);

impl Checksum {
    /// Digest the given bytes.
    pub fn compute(data: &[u8]) -> Self {
        Self(Sha1::digest(data).to_vec())
    }

    /// Parse a hex-encoded digest.
    pub fn from_hex(value: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(value).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl From<Vec<u8>> for Checksum {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// A catalog record for one uploaded content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub owner_id: String,
    pub library_id: Option<String>,
    pub device_id: String,
    /// Client-assigned identifier, unique per device.
    pub device_asset_id: String,
    pub asset_type: AssetType,
    pub checksum: Checksum,
    pub original_path: String,
    pub original_file_name: String,
    pub file_created_at: DateTime<Utc>,
    pub file_modified_at: DateTime<Utc>,
    /// Capture time in the device's local clock; drives time buckets.
    pub local_date_time: NaiveDateTime,
    /// Content identifier shared by both halves of a live photo.
    pub live_photo_cid: Option<String>,
    /// Motion half linked to this still.
    pub live_photo_video_id: Option<String>,
    pub duplicate_id: Option<String>,
    pub stack_id: Option<String>,
    pub is_favorite: bool,
    pub is_archived: bool,
    pub is_offline: bool,
    /// `false` for motion halves already paired to a still.
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker. A trashed asset is restorable until purged.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Asset {
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Fields required to create an asset. The id and server timestamps are
/// assigned by the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAsset {
    pub owner_id: String,
    pub library_id: Option<String>,
    pub device_id: String,
    pub device_asset_id: String,
    pub asset_type: AssetType,
    pub checksum: Checksum,
    pub original_path: String,
    pub original_file_name: String,
    pub file_created_at: DateTime<Utc>,
    pub file_modified_at: DateTime<Utc>,
    pub local_date_time: NaiveDateTime,
    pub live_photo_cid: Option<String>,
    pub is_favorite: bool,
    pub is_archived: bool,
    pub is_offline: bool,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUpdate {
    pub is_favorite: Option<bool>,
    pub is_archived: Option<bool>,
    pub is_offline: Option<bool>,
    pub original_path: Option<String>,
    pub local_date_time: Option<NaiveDateTime>,
}

impl AssetUpdate {
    pub fn is_empty(&self) -> bool {
        self.is_favorite.is_none()
            && self.is_archived.is_none()
            && self.is_offline.is_none()
            && self.original_path.is_none()
            && self.local_date_time.is_none()
    }
}

/// Content-addressed lookup key. `library_id: None` means the owner's upload
/// space, not "any library".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumLookup {
    pub owner_id: String,
    pub checksum: Checksum,
    pub library_id: Option<String>,
}

impl ChecksumLookup {
    pub fn for_asset(asset: &NewAsset) -> Self {
        Self {
            owner_id: asset.owner_id.clone(),
            checksum: asset.checksum.clone(),
            library_id: asset.library_id.clone(),
        }
    }
}

/// Search for the other half of a live photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivePhotoSearch {
    pub owner_id: String,
    pub library_id: Option<String>,
    pub live_photo_cid: String,
    /// The asset claiming the pairing; never returned as its own match.
    pub other_asset_id: String,
    /// Type of the sibling being searched for.
    pub asset_type: AssetType,
}

/// Flag filters for [`AssetStats`]. Trashed assets are excluded unless
/// `is_trashed` is `Some(true)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetStatsOptions {
    pub is_favorite: Option<bool>,
    pub is_archived: Option<bool>,
    pub is_trashed: Option<bool>,
}

/// Per-type asset counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetStats {
    pub images: u64,
    pub videos: u64,
}

impl AssetStats {
    pub fn total(&self) -> u64 {
        self.images + self.videos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_compute_matches_known_sha1() {
        let checksum = Checksum::compute(b"abc");
        assert_eq!(
            checksum.to_string(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn checksum_hex_parse_round_trips() {
        let checksum = Checksum::compute(b"hello");
        let parsed = Checksum::from_hex(&checksum.to_string()).unwrap();
        assert_eq!(parsed, checksum);
        assert!(Checksum::from_hex("zz").is_err());
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(AssetUpdate::default().is_empty());
        let update = AssetUpdate {
            is_favorite: Some(true),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn stats_total_sums_types() {
        let stats = AssetStats {
            images: 3,
            videos: 2,
        };
        assert_eq!(stats.total(), 5);
    }
}
