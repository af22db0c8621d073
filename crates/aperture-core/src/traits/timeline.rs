// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grouped aggregation over local capture dates.

use async_trait::async_trait;

use crate::asset::Asset;
use crate::error::ApertureError;
use crate::timeline::{TimeBucketCount, TimeBucketKey, TimeBucketOptions};

#[async_trait]
pub trait TimelineRepository: Send + Sync {
    /// Count filtered assets per bucket, ordered by `options.order`.
    async fn time_buckets(
        &self,
        options: &TimeBucketOptions,
    ) -> Result<Vec<TimeBucketCount>, ApertureError>;

    /// Filtered assets inside one bucket, ordered by local time then id.
    async fn time_bucket_assets(
        &self,
        bucket: &TimeBucketKey,
        options: &TimeBucketOptions,
    ) -> Result<Vec<Asset>, ApertureError>;
}
