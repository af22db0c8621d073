// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter lifecycle.

use async_trait::async_trait;

use crate::error::ApertureError;
use crate::traits::adapter::PluginAdapter;

/// Lifecycle of a persistence backend.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), ApertureError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), ApertureError>;
}
