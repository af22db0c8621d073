// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Aperture catalog.

use thiserror::Error;

/// The primary error type used across all repository traits and catalog services.
#[derive(Debug, Error)]
pub enum ApertureError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Any failure reported by the persistence backend.
    ///
    /// Propagated unchanged; nothing in the catalog retries these.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A mutation targeted a record that does not exist (or is soft-deleted).
    ///
    /// Lookups never produce this; they return `None` or an empty list.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A write collided with a uniqueness constraint.
    #[error("{entity} conflicts with an existing record ({constraint})")]
    Conflict {
        entity: &'static str,
        constraint: String,
    },

    /// Caller supplied an internally inconsistent range, limit, or filter.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApertureError {
    /// Shorthand for [`ApertureError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns `true` for uniqueness collisions.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
