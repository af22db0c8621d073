// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Duplicate group types.

use serde::{Deserialize, Serialize};

use crate::asset::Asset;

/// A set of probable duplicates owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub duplicate_id: String,
    pub assets: Vec<Asset>,
}

/// Reassignment of assets between duplicate groups.
///
/// With `target_group_id: None` the named assets, and every member of the
/// source groups, leave their groups. Otherwise all of them move into the
/// target group, which is created when it does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegroupOptions {
    pub owner_id: String,
    pub target_group_id: Option<String>,
    pub asset_ids: Vec<String>,
    pub source_group_ids: Vec<String>,
}
