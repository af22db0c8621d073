// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Duplicate group index.

use async_trait::async_trait;

use crate::duplicate::{DuplicateGroup, RegroupOptions};
use crate::error::ApertureError;

#[async_trait]
pub trait DuplicateRepository: Send + Sync {
    /// Apply a regroup atomically. Groups left with fewer than two members
    /// are deleted before returning.
    async fn regroup_duplicates(&self, options: &RegroupOptions) -> Result<(), ApertureError>;

    /// Groups of the owner with at least two live members.
    async fn duplicate_groups(&self, owner_id: &str) -> Result<Vec<DuplicateGroup>, ApertureError>;
}
