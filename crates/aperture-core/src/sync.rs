// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request types for full and delta catalog synchronization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One page of a full sync session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullSyncOptions {
    pub owner_id: String,
    /// Resume strictly after this asset id.
    pub last_id: Option<String>,
    /// Ceiling captured once at session start; fixed for every page.
    pub updated_until: DateTime<Utc>,
    pub limit: usize,
}

/// One page of changes since a watermark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaSyncOptions {
    pub user_ids: Vec<String>,
    pub updated_after: DateTime<Utc>,
    /// Tie-break for records sharing `updated_after` exactly. When set, rows
    /// at the watermark with a larger id are also returned.
    pub after_id: Option<String>,
    pub limit: usize,
}

/// Resume point for delta sync: the last `(updated_at, id)` delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaWatermark {
    pub updated_at: DateTime<Utc>,
    pub last_id: String,
}
