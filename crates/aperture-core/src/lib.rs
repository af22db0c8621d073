// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Aperture asset catalog.
//!
//! This crate provides the domain model, repository trait definitions, and
//! error types used throughout the Aperture workspace. Storage backends
//! implement the traits defined here; catalog services consume them.

pub mod asset;
pub mod duplicate;
pub mod error;
pub mod notification;
pub mod retention;
pub mod sync;
pub mod timeline;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use asset::{
    Asset, AssetStats, AssetStatsOptions, AssetUpdate, Checksum, ChecksumLookup, LivePhotoSearch,
    NewAsset,
};
pub use duplicate::{DuplicateGroup, RegroupOptions};
pub use error::ApertureError;
pub use notification::{
    NewNotification, Notification, NotificationLevel, NotificationSearch, NotificationType,
    NotificationUpdate,
};
pub use retention::{RecordCondition, RetentionPolicy, RetentionRule, RetentionSubject, RuleCutoffs};
pub use sync::{DeltaSyncOptions, DeltaWatermark, FullSyncOptions};
pub use timeline::{AssetFilter, TimeBucketCount, TimeBucketKey, TimeBucketOptions};
pub use types::{AssetOrder, AssetType, HealthStatus, TimeBucketSize};

pub use traits::{
    AssetRepository, DuplicateRepository, NotificationRepository, PluginAdapter, StorageAdapter,
    SyncRepository, TimelineRepository,
};

/// Every repository a catalog backend must provide.
pub trait CatalogStore:
    StorageAdapter
    + AssetRepository
    + TimelineRepository
    + SyncRepository
    + DuplicateRepository
    + NotificationRepository
{
}

impl<T> CatalogStore for T where
    T: StorageAdapter
        + AssetRepository
        + TimelineRepository
        + SyncRepository
        + DuplicateRepository
        + NotificationRepository
{
}
