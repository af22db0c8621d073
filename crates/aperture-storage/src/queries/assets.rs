// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Asset CRUD, identity lookups, trash lifecycle, stacks, and statistics.

use std::collections::BTreeSet;

use aperture_core::{
    ApertureError, Asset, AssetStats, AssetStatsOptions, AssetType, AssetUpdate, Checksum,
    ChecksumLookup, NewAsset,
};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::database::{conflict_or, map_tr_err, Database};
use crate::models::{
    asset_from_row, format_local, format_timestamp, now_timestamp, ASSET_COLUMNS, ASSET_FROM,
};
use crate::queries::duplicates::{prune_small_groups, touch_group_peers};
use crate::queries::{execute_chunked, placeholders, text_values, ID_CHUNK};

/// Fetch one asset by id, trashed or not.
pub(crate) fn select_asset(conn: &Connection, id: &str) -> rusqlite::Result<Option<Asset>> {
    conn.query_row(
        &format!("SELECT {ASSET_COLUMNS} {ASSET_FROM} WHERE a.id = ?1"),
        params![id],
        asset_from_row,
    )
    .optional()
}

/// Run `SELECT <asset columns> FROM ... <tail>` with positional values.
pub(crate) fn select_assets(
    conn: &Connection,
    tail: &str,
    values: &[Value],
) -> rusqlite::Result<Vec<Asset>> {
    let mut stmt = conn.prepare(&format!("SELECT {ASSET_COLUMNS} {ASSET_FROM} {tail}"))?;
    let rows = stmt.query_map(params_from_iter(values.iter()), asset_from_row)?;
    rows.collect()
}

fn select_strings(conn: &Connection, sql: &str, values: &[Value]) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), |row| row.get(0))?;
    rows.collect()
}

/// Insert a new asset. Unique index violations surface as `Conflict`.
pub async fn create_asset(db: &Database, asset: &NewAsset) -> Result<Asset, ApertureError> {
    let asset = asset.clone();
    let id = Uuid::new_v4().to_string();
    let created = db
        .connection()
        .call(
            move |conn| -> Result<Result<Asset, ApertureError>, rusqlite::Error> {
                let now = now_timestamp();
                let inserted = conn.execute(
                    "INSERT INTO assets (id, owner_id, library_id, device_id, device_asset_id,
                        asset_type, checksum, original_path, original_file_name,
                        file_created_at, file_modified_at, local_date_time, live_photo_cid,
                        is_favorite, is_archived, is_offline, is_visible, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                        ?16, 1, ?17, ?17)",
                    params![
                        id,
                        asset.owner_id,
                        asset.library_id,
                        asset.device_id,
                        asset.device_asset_id,
                        asset.asset_type.to_string(),
                        asset.checksum.as_bytes(),
                        asset.original_path,
                        asset.original_file_name,
                        format_timestamp(asset.file_created_at),
                        format_timestamp(asset.file_modified_at),
                        format_local(asset.local_date_time),
                        asset.live_photo_cid,
                        asset.is_favorite,
                        asset.is_archived,
                        asset.is_offline,
                        now,
                    ],
                );
                if let Err(conflict) = conflict_or(inserted, "asset")? {
                    return Ok(Err(conflict));
                }
                let stored = select_asset(conn, &id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
                Ok(Ok(stored))
            },
        )
        .await
        .map_err(map_tr_err)?;

    match &created {
        Ok(asset) => debug!(asset_id = %asset.id, owner_id = %asset.owner_id, "asset created"),
        Err(e) => debug!(error = %e, "asset insert rejected"),
    }
    created
}

pub async fn get_asset(db: &Database, id: &str) -> Result<Option<Asset>, ApertureError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Asset>, rusqlite::Error> { select_asset(conn, &id) })
        .await
        .map_err(map_tr_err)
}

/// Fetch several assets by id, ordered by id. Unknown ids are skipped.
pub async fn get_assets(db: &Database, ids: &[String]) -> Result<Vec<Asset>, ApertureError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let ids = ids.to_vec();
    db.connection()
        .call(move |conn| -> Result<Vec<Asset>, rusqlite::Error> {
            let mut found = Vec::with_capacity(ids.len());
            for chunk in ids.chunks(ID_CHUNK) {
                found.extend(select_assets(
                    conn,
                    &format!("WHERE a.id IN ({})", placeholders(chunk.len())),
                    &text_values(chunk),
                )?);
            }
            found.sort_by(|a, b| a.id.cmp(&b.id));
            found.dedup_by(|a, b| a.id == b.id);
            Ok(found)
        })
        .await
        .map_err(map_tr_err)
}

/// Live asset holding `checksum` in the lookup's upload space or library.
pub async fn get_by_checksum(
    db: &Database,
    lookup: &ChecksumLookup,
) -> Result<Option<Asset>, ApertureError> {
    let values = vec![
        Value::Text(lookup.owner_id.clone()),
        Value::Blob(lookup.checksum.as_bytes().to_vec()),
        crate::queries::optional_text(lookup.library_id.as_deref()),
    ];
    db.connection()
        .call(move |conn| -> Result<Option<Asset>, rusqlite::Error> {
            let found = select_assets(
                conn,
                "WHERE a.owner_id = ? AND a.checksum = ? AND a.library_id IS ?
                   AND a.deleted_at IS NULL
                 ORDER BY a.id LIMIT 1",
                &values,
            )?;
            Ok(found.into_iter().next())
        })
        .await
        .map_err(map_tr_err)
}

/// Live assets of `owner_id`, in any library, whose checksum is listed.
pub async fn get_by_checksums(
    db: &Database,
    owner_id: &str,
    checksums: &[Checksum],
) -> Result<Vec<Asset>, ApertureError> {
    if checksums.is_empty() {
        return Ok(Vec::new());
    }
    let owner_id = owner_id.to_string();
    let checksums = checksums.to_vec();
    db.connection()
        .call(move |conn| -> Result<Vec<Asset>, rusqlite::Error> {
            let mut found = Vec::new();
            for chunk in checksums.chunks(ID_CHUNK) {
                let mut values = vec![Value::Text(owner_id.clone())];
                values.extend(chunk.iter().map(|c| Value::Blob(c.as_bytes().to_vec())));
                found.extend(select_assets(
                    conn,
                    &format!(
                        "WHERE a.owner_id = ? AND a.deleted_at IS NULL AND a.checksum IN ({})",
                        placeholders(chunk.len())
                    ),
                    &values,
                )?);
            }
            found.sort_by(|a, b| a.id.cmp(&b.id));
            found.dedup_by(|a, b| a.id == b.id);
            Ok(found)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_by_device_asset_id(
    db: &Database,
    owner_id: &str,
    device_id: &str,
    device_asset_id: &str,
) -> Result<Option<Asset>, ApertureError> {
    let values = text_values([
        &owner_id.to_string(),
        &device_id.to_string(),
        &device_asset_id.to_string(),
    ]);
    db.connection()
        .call(move |conn| -> Result<Option<Asset>, rusqlite::Error> {
            let found = select_assets(
                conn,
                "WHERE a.owner_id = ? AND a.device_id = ? AND a.device_asset_id = ?
                   AND a.deleted_at IS NULL",
                &values,
            )?;
            Ok(found.into_iter().next())
        })
        .await
        .map_err(map_tr_err)
}

/// Which of `device_asset_ids` the device already registered, trashed
/// assets included so clients do not re-upload items sitting in the trash.
pub async fn existing_device_asset_ids(
    db: &Database,
    owner_id: &str,
    device_id: &str,
    device_asset_ids: &[String],
) -> Result<Vec<String>, ApertureError> {
    if device_asset_ids.is_empty() {
        return Ok(Vec::new());
    }
    let scope = text_values([&owner_id.to_string(), &device_id.to_string()]);
    let device_asset_ids = device_asset_ids.to_vec();
    db.connection()
        .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
            let mut existing = BTreeSet::new();
            for chunk in device_asset_ids.chunks(ID_CHUNK) {
                let mut values = scope.clone();
                values.extend(text_values(chunk));
                existing.extend(select_strings(
                    conn,
                    &format!(
                        "SELECT device_asset_id FROM assets
                         WHERE owner_id = ? AND device_id = ? AND device_asset_id IN ({})",
                        placeholders(chunk.len())
                    ),
                    &values,
                )?);
            }
            Ok(existing.into_iter().collect())
        })
        .await
        .map_err(map_tr_err)
}

/// Device asset ids of every live, visible asset the device uploaded.
pub async fn all_device_asset_ids(
    db: &Database,
    owner_id: &str,
    device_id: &str,
) -> Result<Vec<String>, ApertureError> {
    let values = text_values([&owner_id.to_string(), &device_id.to_string()]);
    db.connection()
        .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
            select_strings(
                conn,
                "SELECT device_asset_id FROM assets
                 WHERE owner_id = ? AND device_id = ? AND is_visible = 1 AND deleted_at IS NULL
                 ORDER BY device_asset_id",
                &values,
            )
        })
        .await
        .map_err(map_tr_err)
}

/// `SET` list for an update; `updated_at` is always advanced.
fn assignments(update: &AssetUpdate, now: String) -> (String, Vec<Value>) {
    let mut columns = Vec::new();
    let mut values = Vec::new();
    if let Some(v) = update.is_favorite {
        columns.push("is_favorite = ?");
        values.push(Value::Integer(i64::from(v)));
    }
    if let Some(v) = update.is_archived {
        columns.push("is_archived = ?");
        values.push(Value::Integer(i64::from(v)));
    }
    if let Some(v) = update.is_offline {
        columns.push("is_offline = ?");
        values.push(Value::Integer(i64::from(v)));
    }
    if let Some(path) = &update.original_path {
        columns.push("original_path = ?");
        values.push(Value::Text(path.clone()));
    }
    if let Some(local) = update.local_date_time {
        columns.push("local_date_time = ?");
        values.push(Value::Text(format_local(local)));
    }
    columns.push("updated_at = ?");
    values.push(Value::Text(now));
    (columns.join(", "), values)
}

/// Update one live asset and return it. `NotFound` when missing or trashed.
pub async fn update_asset(
    db: &Database,
    id: &str,
    update: &AssetUpdate,
) -> Result<Asset, ApertureError> {
    let target = id.to_string();
    let update = update.clone();
    let updated = db
        .connection()
        .call(move |conn| -> Result<Option<Asset>, rusqlite::Error> {
            let (set, mut values) = assignments(&update, now_timestamp());
            values.push(Value::Text(target.clone()));
            let changed = conn.execute(
                &format!("UPDATE assets SET {set} WHERE id = ? AND deleted_at IS NULL"),
                params_from_iter(values.iter()),
            )?;
            if changed == 0 {
                return Ok(None);
            }
            select_asset(conn, &target)
        })
        .await
        .map_err(map_tr_err)?;
    updated.ok_or_else(|| ApertureError::not_found("asset", id))
}

/// Apply the same update to every live asset in `ids`.
pub async fn update_assets(
    db: &Database,
    ids: &[String],
    update: &AssetUpdate,
) -> Result<usize, ApertureError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let ids = ids.to_vec();
    let update = update.clone();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            let (set, assigned) = assignments(&update, now_timestamp());
            execute_chunked(conn, &ids, &assigned, |list| {
                format!("UPDATE assets SET {set} WHERE id IN ({list}) AND deleted_at IS NULL")
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Move live assets to the trash, stamping `deleted_at` with `now`.
pub async fn soft_delete_assets(
    db: &Database,
    ids: &[String],
    now: DateTime<Utc>,
) -> Result<usize, ApertureError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let ids = ids.to_vec();
    let deleted_at = format_timestamp(now);
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            let tx = conn.transaction()?;
            let touched_at = now_timestamp();
            let mut trashed = 0;
            for chunk in ids.chunks(ID_CHUNK) {
                let mut values = vec![
                    Value::Text(deleted_at.clone()),
                    Value::Text(touched_at.clone()),
                ];
                values.extend(text_values(chunk));
                trashed += tx.execute(
                    &format!(
                        "UPDATE assets SET deleted_at = ?, updated_at = ?
                         WHERE id IN ({}) AND deleted_at IS NULL",
                        placeholders(chunk.len())
                    ),
                    params_from_iter(values.iter()),
                )?;
            }
            if trashed > 0 {
                touch_group_peers(&tx, &ids, &touched_at)?;
            }
            tx.commit()?;
            Ok(trashed)
        })
        .await
        .map_err(map_tr_err)
}

/// Bring trashed assets back. Collisions with a live asset are `Conflict`
/// and leave every named asset in the trash.
pub async fn restore_assets(db: &Database, ids: &[String]) -> Result<usize, ApertureError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let ids = ids.to_vec();
    db.connection()
        .call(
            move |conn| -> Result<Result<usize, ApertureError>, rusqlite::Error> {
                let tx = conn.transaction()?;
                let now = now_timestamp();
                let mut restored = 0;
                for chunk in ids.chunks(ID_CHUNK) {
                    let mut values = vec![Value::Text(now.clone())];
                    values.extend(text_values(chunk));
                    let changed = tx.execute(
                        &format!(
                            "UPDATE assets SET deleted_at = NULL, updated_at = ?
                             WHERE id IN ({}) AND deleted_at IS NOT NULL",
                            placeholders(chunk.len())
                        ),
                        params_from_iter(values.iter()),
                    );
                    // Dropping the transaction rolls back earlier chunks.
                    match conflict_or(changed, "asset")? {
                        Ok(changed) => restored += changed,
                        Err(conflict) => return Ok(Err(conflict)),
                    }
                }
                if restored > 0 {
                    touch_group_peers(&tx, &ids, &now)?;
                }
                tx.commit()?;
                Ok(Ok(restored))
            },
        )
        .await
        .map_err(map_tr_err)?
}

/// Hard delete the assets `selector` (a `SELECT id FROM assets ...`
/// subquery bound to `values`) picks, inside an open transaction.
///
/// Stills pointing at a deleted motion half and members of a stack whose
/// primary is deleted get a fresh `updated_at`; foreign keys clear the
/// references.
fn delete_selected(
    conn: &Connection,
    selector: &str,
    values: &[Value],
    now: &str,
) -> rusqlite::Result<usize> {
    let mut touch = vec![Value::Text(now.to_string())];
    touch.extend(values.iter().cloned());
    touch.extend(values.iter().cloned());
    conn.execute(
        &format!(
            "UPDATE assets SET updated_at = ?
             WHERE live_photo_video_id IN ({selector})
                OR stack_id IN (SELECT id FROM stacks WHERE primary_asset_id IN ({selector}))"
        ),
        params_from_iter(touch.iter()),
    )?;
    conn.execute(
        &format!("DELETE FROM assets WHERE id IN ({selector})"),
        params_from_iter(values.iter()),
    )
}

/// Hard delete `ids` inside an open transaction. Duplicate groups left with
/// fewer than two members are pruned.
pub(crate) fn delete_assets_in(conn: &Connection, ids: &[String]) -> rusqlite::Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }
    let now = now_timestamp();
    let mut removed = 0;
    for chunk in ids.chunks(ID_CHUNK) {
        let selector = format!(
            "SELECT id FROM assets WHERE id IN ({})",
            placeholders(chunk.len())
        );
        removed += delete_selected(conn, &selector, &text_values(chunk), &now)?;
    }
    prune_small_groups(conn, &now)?;
    Ok(removed)
}

/// Hard delete one asset. `NotFound` when it does not exist.
pub async fn remove_asset(db: &Database, id: &str) -> Result<(), ApertureError> {
    let id = id.to_string();
    let target = id.clone();
    let removed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            let tx = conn.transaction()?;
            let removed = delete_assets_in(&tx, &[target])?;
            tx.commit()?;
            Ok(removed)
        })
        .await
        .map_err(map_tr_err)?;
    if removed == 0 {
        return Err(ApertureError::not_found("asset", id));
    }
    debug!(asset_id = %id, "asset removed");
    Ok(())
}

/// Hard delete every asset trashed strictly before `deleted_before`.
///
/// The expired set is selected inside the statements, so the purge binds a
/// single value however large the trash has grown.
pub async fn purge_trashed_assets(
    db: &Database,
    deleted_before: DateTime<Utc>,
) -> Result<usize, ApertureError> {
    let cutoff = vec![Value::Text(format_timestamp(deleted_before))];
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            let tx = conn.transaction()?;
            let now = now_timestamp();
            let removed = delete_selected(
                &tx,
                "SELECT id FROM assets WHERE deleted_at IS NOT NULL AND deleted_at < ?",
                &cutoff,
                &now,
            )?;
            prune_small_groups(&tx, &now)?;
            tx.commit()?;
            Ok(removed)
        })
        .await
        .map_err(map_tr_err)
}

/// Group assets into a new stack with `primary_asset_id` as representative.
///
/// Existing stacks touching any named asset are merged into the new one.
pub async fn create_stack(
    db: &Database,
    owner_id: &str,
    primary_asset_id: &str,
    asset_ids: &[String],
) -> Result<String, ApertureError> {
    let mut members: BTreeSet<String> = asset_ids.iter().cloned().collect();
    members.insert(primary_asset_id.to_string());
    if members.len() < 2 {
        return Err(ApertureError::InvalidRange(
            "a stack needs at least two assets".to_string(),
        ));
    }
    let members: Vec<String> = members.into_iter().collect();
    let owner_id = owner_id.to_string();
    let primary = primary_asset_id.to_string();
    let stack_id = Uuid::new_v4().to_string();
    let new_id = stack_id.clone();

    let created = db
        .connection()
        .call(
            move |conn| -> Result<Result<(), ApertureError>, rusqlite::Error> {
                let tx = conn.transaction()?;
                let now = now_timestamp();

                let mut owned = BTreeSet::new();
                let mut previous = BTreeSet::new();
                for chunk in members.chunks(ID_CHUNK) {
                    let list = placeholders(chunk.len());
                    let mut owned_values = vec![Value::Text(owner_id.clone())];
                    owned_values.extend(text_values(chunk));
                    owned.extend(select_strings(
                        &tx,
                        &format!(
                            "SELECT id FROM assets
                             WHERE owner_id = ? AND deleted_at IS NULL AND id IN ({list})"
                        ),
                        &owned_values,
                    )?);

                    let mut pair_values = text_values(chunk);
                    pair_values.extend(text_values(chunk));
                    previous.extend(select_strings(
                        &tx,
                        &format!(
                            "SELECT stack_id FROM assets
                             WHERE id IN ({list}) AND stack_id IS NOT NULL
                             UNION
                             SELECT id FROM stacks WHERE primary_asset_id IN ({list})"
                        ),
                        &pair_values,
                    )?);
                }
                if let Some(missing) = members.iter().find(|id| !owned.contains(*id)) {
                    return Ok(Err(ApertureError::not_found("asset", missing.clone())));
                }
                let previous: Vec<String> = previous.into_iter().collect();

                tx.execute(
                    "INSERT INTO stacks (id, owner_id, primary_asset_id, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![new_id, owner_id, primary, now],
                )?;

                for (column, ids) in [("id", &members), ("stack_id", &previous)] {
                    for chunk in ids.chunks(ID_CHUNK) {
                        let mut values = vec![Value::Text(new_id.clone()), Value::Text(now.clone())];
                        values.extend(text_values(chunk));
                        tx.execute(
                            &format!(
                                "UPDATE assets SET stack_id = ?, updated_at = ? WHERE {column} IN ({})",
                                placeholders(chunk.len())
                            ),
                            params_from_iter(values.iter()),
                        )?;
                    }
                }
                for chunk in previous.chunks(ID_CHUNK) {
                    tx.execute(
                        &format!("DELETE FROM stacks WHERE id IN ({})", placeholders(chunk.len())),
                        params_from_iter(text_values(chunk).iter()),
                    )?;
                }
                tx.commit()?;
                Ok(Ok(()))
            },
        )
        .await
        .map_err(map_tr_err)?;
    created?;
    debug!(stack_id = %stack_id, "stack created");
    Ok(stack_id)
}

/// Visible asset counts per type for one owner.
pub async fn asset_statistics(
    db: &Database,
    owner_id: &str,
    options: &AssetStatsOptions,
) -> Result<AssetStats, ApertureError> {
    let mut sql = String::from(
        "SELECT asset_type, COUNT(*) FROM assets WHERE owner_id = ? AND is_visible = 1",
    );
    let mut values = vec![Value::Text(owner_id.to_string())];
    if let Some(v) = options.is_favorite {
        sql.push_str(" AND is_favorite = ?");
        values.push(Value::Integer(i64::from(v)));
    }
    if let Some(v) = options.is_archived {
        sql.push_str(" AND is_archived = ?");
        values.push(Value::Integer(i64::from(v)));
    }
    if options.is_trashed == Some(true) {
        sql.push_str(" AND deleted_at IS NOT NULL");
    } else {
        sql.push_str(" AND deleted_at IS NULL");
    }
    sql.push_str(" GROUP BY asset_type");

    let counts = db
        .connection()
        .call(move |conn| -> Result<Vec<(String, i64)>, rusqlite::Error> {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;

    let mut stats = AssetStats::default();
    for (asset_type, count) in counts {
        let count = u64::try_from(count).unwrap_or_default();
        match asset_type.parse::<AssetType>() {
            Ok(AssetType::Image) => stats.images = count,
            Ok(AssetType::Video) => stats.videos = count,
            Err(e) => {
                return Err(ApertureError::Internal(format!(
                    "unknown asset type `{asset_type}`: {e}"
                )));
            }
        }
    }
    Ok(stats)
}
