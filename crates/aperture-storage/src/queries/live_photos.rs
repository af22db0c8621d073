// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live-photo pairing: locating the other half and linking the pair.

use aperture_core::{ApertureError, Asset, LivePhotoSearch};
use rusqlite::params;
use rusqlite::types::Value;
use tracing::debug;

use crate::database::{map_tr_err, Database};
use crate::models::now_timestamp;
use crate::queries::assets::select_assets;
use crate::queries::optional_text;

/// The live sibling sharing the content identifier, lowest id first.
pub async fn find_live_photo_match(
    db: &Database,
    search: &LivePhotoSearch,
) -> Result<Option<Asset>, ApertureError> {
    let values = vec![
        Value::Text(search.owner_id.clone()),
        Value::Text(search.live_photo_cid.clone()),
        Value::Text(search.other_asset_id.clone()),
        Value::Text(search.asset_type.to_string()),
        optional_text(search.library_id.as_deref()),
    ];
    let found = db
        .connection()
        .call(move |conn| -> Result<Vec<Asset>, rusqlite::Error> {
            select_assets(
                conn,
                "WHERE a.owner_id = ? AND a.live_photo_cid = ? AND a.id != ?
                   AND a.asset_type = ? AND a.library_id IS ? AND a.deleted_at IS NULL
                 ORDER BY a.id LIMIT 1",
                &values,
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(found.into_iter().next())
}

/// Point the still at its motion half and hide the motion half from the
/// timeline. Both rows get a fresh `updated_at`.
pub async fn link_live_photo(
    db: &Database,
    still_id: &str,
    motion_id: &str,
) -> Result<(), ApertureError> {
    let still = still_id.to_string();
    let motion = motion_id.to_string();
    db.connection()
        .call(
            move |conn| -> Result<Result<(), ApertureError>, rusqlite::Error> {
                let now = now_timestamp();
                let tx = conn.transaction()?;
                let hidden = tx.execute(
                    "UPDATE assets SET is_visible = 0, updated_at = ?1
                     WHERE id = ?2 AND deleted_at IS NULL",
                    params![now, motion],
                )?;
                if hidden == 0 {
                    return Ok(Err(ApertureError::not_found("asset", motion)));
                }
                let linked = tx.execute(
                    "UPDATE assets SET live_photo_video_id = ?1, updated_at = ?2
                     WHERE id = ?3 AND deleted_at IS NULL",
                    params![motion, now, still],
                )?;
                if linked == 0 {
                    return Ok(Err(ApertureError::not_found("asset", still)));
                }
                tx.commit()?;
                debug!(still_id = %still, motion_id = %motion, "live photo linked");
                Ok(Ok(()))
            },
        )
        .await
        .map_err(map_tr_err)?
}

/// Live stills referencing `motion_id`.
pub async fn live_photo_link_count(db: &Database, motion_id: &str) -> Result<usize, ApertureError> {
    let motion = motion_id.to_string();
    let count = db
        .connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*) FROM assets
                 WHERE live_photo_video_id = ?1 AND deleted_at IS NULL",
                params![motion],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(usize::try_from(count).unwrap_or_default())
}
