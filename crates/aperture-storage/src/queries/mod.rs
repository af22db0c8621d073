// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the catalog tables.
//!
//! Every function takes `&Database` and runs one closure on the serialized
//! connection, so multi-statement operations observe a consistent state.

pub mod assets;
pub mod duplicates;
pub mod filter;
pub mod live_photos;
pub mod notifications;
pub mod relations;
pub mod sync;
pub mod time_buckets;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

/// Most ids bound into one statement. SQLite caps host parameters per
/// statement, so longer id lists are processed chunk by chunk.
pub(crate) const ID_CHUNK: usize = 500;

/// `?, ?, ?` with `n` placeholders.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

pub(crate) fn text_values<'a>(items: impl IntoIterator<Item = &'a String>) -> Vec<Value> {
    items.into_iter().cloned().map(Value::Text).collect()
}

/// Execute one statement per [`ID_CHUNK`] of `ids` in a single transaction.
///
/// `sql` receives the placeholder list for the chunk; `leading` is bound
/// ahead of the chunk's ids. Returns the total number of changed rows.
pub(crate) fn execute_chunked(
    conn: &mut Connection,
    ids: &[String],
    leading: &[Value],
    sql: impl Fn(&str) -> String,
) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let mut changed = 0;
    for chunk in ids.chunks(ID_CHUNK) {
        let mut values = leading.to_vec();
        values.extend(text_values(chunk));
        changed += tx.execute(&sql(&placeholders(chunk.len())), params_from_iter(values.iter()))?;
    }
    tx.commit()?;
    Ok(changed)
}

pub(crate) fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |v| Value::Text(v.to_string()))
}

/// SQLite binds integers as i64; saturate page sizes that do not fit.
pub(crate) fn limit_value(limit: usize) -> Value {
    Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX))
}

#[cfg(test)]
pub(crate) mod test_support {
    use aperture_core::{AssetType, Checksum, NewAsset};
    use chrono::{NaiveDateTime, TimeZone, Utc};
    use tempfile::{tempdir, TempDir};

    use crate::database::Database;

    pub async fn open_temp() -> (TempDir, Database) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (dir, db)
    }

    pub fn local(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    /// An image uploaded from `device-1` whose checksum is derived from `content`.
    pub fn new_asset(owner: &str, device_asset_id: &str, content: &str) -> NewAsset {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        NewAsset {
            owner_id: owner.to_string(),
            library_id: None,
            device_id: "device-1".to_string(),
            device_asset_id: device_asset_id.to_string(),
            asset_type: AssetType::Image,
            checksum: Checksum::compute(content.as_bytes()),
            original_path: format!("/upload/{owner}/{device_asset_id}.jpg"),
            original_file_name: format!("{device_asset_id}.jpg"),
            file_created_at: created,
            file_modified_at: created,
            local_date_time: local("2024-01-01T12:00:00"),
            ..Default::default()
        }
    }

    /// Same as [`new_asset`] but captured at `local_time` (`YYYY-MM-DDTHH:MM:SS`).
    pub fn asset_at(owner: &str, device_asset_id: &str, local_time: &str) -> NewAsset {
        NewAsset {
            local_date_time: local(local_time),
            ..new_asset(owner, device_asset_id, device_asset_id)
        }
    }
}
