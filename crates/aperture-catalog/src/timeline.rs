// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-bucketed timeline browsing.

use std::sync::Arc;

use aperture_core::{
    ApertureError, Asset, AssetFilter, AssetOrder, TimeBucketCount, TimeBucketKey,
    TimeBucketOptions, TimeBucketSize, TimelineRepository,
};

#[derive(Clone)]
pub struct TimelineIndex {
    repo: Arc<dyn TimelineRepository>,
    default_order: AssetOrder,
}

impl TimelineIndex {
    pub fn new(repo: Arc<dyn TimelineRepository>, default_order: AssetOrder) -> Self {
        Self {
            repo,
            default_order,
        }
    }

    /// Options using the configured default order.
    pub fn options(&self, size: TimeBucketSize, filter: AssetFilter) -> TimeBucketOptions {
        TimeBucketOptions {
            size,
            order: self.default_order,
            filter,
        }
    }

    /// Asset count per bucket, in `options.order`.
    pub async fn buckets(
        &self,
        options: &TimeBucketOptions,
    ) -> Result<Vec<TimeBucketCount>, ApertureError> {
        require_scope(&options.filter)?;
        self.repo.time_buckets(options).await
    }

    /// Assets of the bucket named by `bucket`, ordered by local time then id.
    pub async fn assets_in_bucket(
        &self,
        bucket: &str,
        options: &TimeBucketOptions,
    ) -> Result<Vec<Asset>, ApertureError> {
        require_scope(&options.filter)?;
        let key = TimeBucketKey::parse(bucket, options.size)?;
        self.repo.time_bucket_assets(&key, options).await
    }
}

fn require_scope(filter: &AssetFilter) -> Result<(), ApertureError> {
    if filter.has_scope() {
        Ok(())
    } else {
        Err(ApertureError::InvalidRange(
            "a timeline needs at least one user id or an album id".to_string(),
        ))
    }
}
