// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered scans for full and delta synchronization.
//!
//! Both scans include trashed and hidden assets: clients learn about trash
//! and live-photo pairing through the flags on each record.

use aperture_core::{ApertureError, Asset, DeltaSyncOptions, FullSyncOptions};
use rusqlite::types::Value;

use crate::database::{map_tr_err, Database};
use crate::models::format_timestamp;
use crate::queries::assets::select_assets;
use crate::queries::{limit_value, placeholders, text_values};

/// One page of a full sync, ordered by id.
pub async fn full_sync_page(
    db: &Database,
    options: &FullSyncOptions,
) -> Result<Vec<Asset>, ApertureError> {
    let mut tail = String::from("WHERE a.owner_id = ? AND a.updated_at <= ?");
    let mut values = vec![
        Value::Text(options.owner_id.clone()),
        Value::Text(format_timestamp(options.updated_until)),
    ];
    if let Some(last_id) = &options.last_id {
        tail.push_str(" AND a.id > ?");
        values.push(Value::Text(last_id.clone()));
    }
    tail.push_str(" ORDER BY a.id LIMIT ?");
    values.push(limit_value(options.limit));

    db.connection()
        .call(move |conn| -> Result<Vec<Asset>, rusqlite::Error> {
            select_assets(conn, &tail, &values)
        })
        .await
        .map_err(map_tr_err)
}

/// One page of changes after the watermark, ordered by `(updated_at, id)`.
///
/// Without `after_id`, a full page is extended with the remaining rows that
/// share its last `updated_at`, so a caller advancing the watermark to that
/// value cannot skip anything.
pub async fn delta_sync_page(
    db: &Database,
    options: &DeltaSyncOptions,
) -> Result<Vec<Asset>, ApertureError> {
    if options.user_ids.is_empty() {
        return Ok(Vec::new());
    }
    let owners = format!("a.owner_id IN ({})", placeholders(options.user_ids.len()));
    let watermark = Value::Text(format_timestamp(options.updated_after));

    let mut values = text_values(&options.user_ids);
    let mut tail = format!("WHERE {owners} AND (a.updated_at > ?");
    values.push(watermark.clone());
    if let Some(after_id) = &options.after_id {
        tail.push_str(" OR (a.updated_at = ? AND a.id > ?)");
        values.push(watermark);
        values.push(Value::Text(after_id.clone()));
    }
    tail.push_str(") ORDER BY a.updated_at, a.id LIMIT ?");
    values.push(limit_value(options.limit));

    let spill = options.after_id.is_none();
    let limit = options.limit;
    let owner_values = text_values(&options.user_ids);

    db.connection()
        .call(move |conn| -> Result<Vec<Asset>, rusqlite::Error> {
            let mut page = select_assets(conn, &tail, &values)?;
            if spill && page.len() == limit {
                if let Some(last) = page.last() {
                    let mut rest_values = owner_values;
                    rest_values.push(Value::Text(format_timestamp(last.updated_at)));
                    rest_values.push(Value::Text(last.id.clone()));
                    let rest = select_assets(
                        conn,
                        &format!(
                            "WHERE {owners} AND a.updated_at = ? AND a.id > ? ORDER BY a.id"
                        ),
                        &rest_values,
                    )?;
                    page.extend(rest);
                }
            }
            Ok(page)
        })
        .await
        .map_err(map_tr_err)
}
