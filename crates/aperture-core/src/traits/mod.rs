// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repository trait definitions consumed by the catalog services.
//!
//! Every storage backend extends the [`PluginAdapter`] base trait and uses
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod asset;
pub mod duplicate;
pub mod notification;
pub mod storage;
pub mod sync;
pub mod timeline;

pub use adapter::PluginAdapter;
pub use asset::AssetRepository;
pub use duplicate::DuplicateRepository;
pub use notification::NotificationRepository;
pub use storage::StorageAdapter;
pub use sync::SyncRepository;
pub use timeline::TimelineRepository;
