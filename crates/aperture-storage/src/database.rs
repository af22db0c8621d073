// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use aperture_core::ApertureError;
use tracing::debug;

/// Handle to the catalog database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` in WAL mode and run migrations.
    pub async fn open(path: &str) -> Result<Self, ApertureError> {
        Self::open_with(path, true).await
    }

    /// Open with explicit journal mode. Parent directories are created.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, ApertureError> {
        let parent = Path::new(path).parent();
        if let Some(parent) = parent.filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ApertureError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| ApertureError::Storage {
                source: Box::new(e),
            })?;

        let applied = conn
            .call(
                move |conn| -> Result<Result<usize, ApertureError>, rusqlite::Error> {
                    let journal = if wal_mode { "WAL" } else { "DELETE" };
                    conn.execute_batch(&format!(
                        "PRAGMA journal_mode = {journal};
                         PRAGMA synchronous = NORMAL;
                         PRAGMA foreign_keys = ON;
                         PRAGMA busy_timeout = 5000;"
                    ))?;
                    Ok(crate::migrations::run_migrations(conn))
                },
            )
            .await
            .map_err(map_tr_err)??;

        debug!(path, wal_mode, applied, "database opened");
        Ok(Self { conn })
    }

    /// The single serialized connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection. Every handle sharing the
    /// connection fails with a storage error afterwards.
    pub async fn close(&self) -> Result<(), ApertureError> {
        checkpoint(&self.conn).await?;
        self.conn.clone().close().await.map_err(|e| ApertureError::Storage {
            source: Box::new(e),
        })
    }
}

/// Flush the WAL into the main database file.
async fn checkpoint(conn: &tokio_rusqlite::Connection) -> Result<(), ApertureError> {
    conn.call(|conn| -> Result<(), rusqlite::Error> {
        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    })
    .await
    .map_err(map_tr_err)
}

/// Convert a tokio-rusqlite error into [`ApertureError::Storage`].
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ApertureError {
    ApertureError::Storage {
        source: Box::new(e),
    }
}

/// Constraint message when `err` is a UNIQUE or PRIMARY KEY violation.
pub(crate) fn unique_violation(err: &rusqlite::Error) -> Option<String> {
    match err {
        rusqlite::Error::SqliteFailure(e, message)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && matches!(
                    e.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                ) =>
        {
            Some(
                message
                    .clone()
                    .unwrap_or_else(|| "unique constraint".to_string()),
            )
        }
        _ => None,
    }
}

/// Split a write result into a uniqueness conflict on `entity` (inner `Err`)
/// or a storage failure (outer `Err`).
pub(crate) fn conflict_or<T>(
    result: Result<T, rusqlite::Error>,
    entity: &'static str,
) -> Result<Result<T, ApertureError>, rusqlite::Error> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(e) => match unique_violation(&e) {
            Some(constraint) => Ok(Err(ApertureError::Conflict { entity, constraint })),
            None => Err(e),
        },
    }
}
