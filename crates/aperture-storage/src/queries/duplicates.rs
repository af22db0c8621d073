// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Duplicate group index: regrouping and listing.
//!
//! Membership lives in `duplicate_group_members`, keyed by asset id, so an
//! asset belongs to at most one group. Groups that fall below two members
//! are deleted in the same transaction that shrank them.

use std::collections::BTreeSet;

use aperture_core::{ApertureError, Asset, DuplicateGroup, RegroupOptions};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::debug;

use crate::database::{map_tr_err, Database};
use crate::models::{asset_from_row, now_timestamp, ASSET_COLUMNS, ASSET_FROM};
use crate::queries::{placeholders, text_values, ID_CHUNK};

/// Groups with fewer than two membership rows.
const SMALL_GROUPS: &str = "SELECT g.id FROM duplicate_groups g \
     LEFT JOIN duplicate_group_members m ON m.group_id = g.id \
     GROUP BY g.id HAVING COUNT(m.asset_id) < 2";

/// Delete every group with fewer than two members, touching the assets that
/// lose their membership. Returns the number of groups deleted.
pub(crate) fn prune_small_groups(conn: &Connection, now: &str) -> rusqlite::Result<usize> {
    conn.execute(
        &format!(
            "UPDATE assets SET updated_at = ?1
             WHERE id IN (SELECT asset_id FROM duplicate_group_members
                          WHERE group_id IN ({SMALL_GROUPS}))"
        ),
        params![now],
    )?;
    conn.execute(
        &format!("DELETE FROM duplicate_group_members WHERE group_id IN ({SMALL_GROUPS})"),
        [],
    )?;
    conn.execute(&format!("DELETE FROM duplicate_groups WHERE id IN ({SMALL_GROUPS})"), [])
}

/// Give every other member of the groups `ids` belong to a fresh
/// `updated_at`. Trashing or restoring a member can change whether the
/// group still counts, and sync clients learn that through the peers.
pub(crate) fn touch_group_peers(
    conn: &Connection,
    ids: &[String],
    now: &str,
) -> rusqlite::Result<usize> {
    let mut touched = 0;
    for chunk in ids.chunks(ID_CHUNK) {
        let mut values = vec![Value::Text(now.to_string())];
        values.extend(text_values(chunk));
        touched += conn.execute(
            &format!(
                "UPDATE assets SET updated_at = ?
                 WHERE id IN (SELECT gm.asset_id FROM duplicate_group_members gm
                              WHERE gm.group_id IN (SELECT group_id FROM duplicate_group_members
                                                    WHERE asset_id IN ({})))",
                placeholders(chunk.len())
            ),
            params_from_iter(values.iter()),
        )?;
    }
    Ok(touched)
}

/// Apply a regroup in one transaction.
///
/// Only assets owned by `options.owner_id` move. A target group owned by
/// someone else is reported as `NotFound`.
pub async fn regroup(db: &Database, options: &RegroupOptions) -> Result<(), ApertureError> {
    let options = options.clone();
    let outcome = db
        .connection()
        .call(
            move |conn| -> Result<Result<(usize, usize), ApertureError>, rusqlite::Error> {
                let tx = conn.transaction()?;
                let now = now_timestamp();
                let mut moving: BTreeSet<String> = BTreeSet::new();

                for chunk in options.asset_ids.chunks(ID_CHUNK) {
                    let mut values = vec![Value::Text(options.owner_id.clone())];
                    values.extend(text_values(chunk));
                    let mut stmt = tx.prepare(&format!(
                        "SELECT id FROM assets WHERE owner_id = ? AND id IN ({})",
                        placeholders(chunk.len())
                    ))?;
                    for id in stmt.query_map(params_from_iter(values.iter()), |row| row.get(0))? {
                        moving.insert(id?);
                    }
                }
                for chunk in options.source_group_ids.chunks(ID_CHUNK) {
                    let mut values = vec![Value::Text(options.owner_id.clone())];
                    values.extend(text_values(chunk));
                    let mut stmt = tx.prepare(&format!(
                        "SELECT m.asset_id FROM duplicate_group_members m
                         JOIN assets a ON a.id = m.asset_id
                         WHERE a.owner_id = ? AND m.group_id IN ({})",
                        placeholders(chunk.len())
                    ))?;
                    for id in stmt.query_map(params_from_iter(values.iter()), |row| row.get(0))? {
                        moving.insert(id?);
                    }
                }
                let moving: Vec<String> = moving.into_iter().collect();

                match &options.target_group_id {
                    None => {
                        for chunk in moving.chunks(ID_CHUNK) {
                            tx.execute(
                                &format!(
                                    "DELETE FROM duplicate_group_members WHERE asset_id IN ({})",
                                    placeholders(chunk.len())
                                ),
                                params_from_iter(text_values(chunk).iter()),
                            )?;
                        }
                    }
                    Some(target) => {
                        let owner: Option<String> = tx
                            .query_row(
                                "SELECT owner_id FROM duplicate_groups WHERE id = ?1",
                                params![target],
                                |row| row.get(0),
                            )
                            .optional()?;
                        match owner {
                            Some(owner) if owner != options.owner_id => {
                                return Ok(Err(ApertureError::not_found(
                                    "duplicate group",
                                    target.clone(),
                                )));
                            }
                            Some(_) => {}
                            None => {
                                tx.execute(
                                    "INSERT INTO duplicate_groups (id, owner_id, created_at)
                                     VALUES (?1, ?2, ?3)",
                                    params![target, options.owner_id, now],
                                )?;
                            }
                        }
                        let mut upsert = tx.prepare(
                            "INSERT INTO duplicate_group_members (asset_id, group_id)
                             VALUES (?1, ?2)
                             ON CONFLICT(asset_id) DO UPDATE SET group_id = excluded.group_id",
                        )?;
                        for asset_id in &moving {
                            upsert.execute(params![asset_id, target])?;
                        }
                    }
                }

                for chunk in moving.chunks(ID_CHUNK) {
                    let mut touch = vec![Value::Text(now.clone())];
                    touch.extend(text_values(chunk));
                    tx.execute(
                        &format!(
                            "UPDATE assets SET updated_at = ? WHERE id IN ({})",
                            placeholders(chunk.len())
                        ),
                        params_from_iter(touch.iter()),
                    )?;
                }
                let pruned = prune_small_groups(&tx, &now)?;
                tx.commit()?;
                Ok(Ok((moving.len(), pruned)))
            },
        )
        .await
        .map_err(map_tr_err)?;

    let (moved, pruned) = outcome?;
    debug!(moved, pruned, "duplicate groups updated");
    Ok(())
}

/// Groups of `owner_id` with at least two live, visible members. Members are
/// ordered by local capture time then id.
pub async fn duplicate_groups(
    db: &Database,
    owner_id: &str,
) -> Result<Vec<DuplicateGroup>, ApertureError> {
    let owner_id = owner_id.to_string();
    let members = db
        .connection()
        .call(move |conn| -> Result<Vec<Asset>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ASSET_COLUMNS} {ASSET_FROM}
                 WHERE a.owner_id = ?1 AND a.deleted_at IS NULL AND a.is_visible = 1
                   AND m.group_id IS NOT NULL
                 ORDER BY m.group_id, a.local_date_time, a.id"
            ))?;
            let rows = stmt.query_map(params![owner_id], asset_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;

    let mut groups: Vec<DuplicateGroup> = Vec::new();
    for asset in members {
        let Some(group_id) = asset.duplicate_id.clone() else {
            continue;
        };
        match groups.last_mut() {
            Some(group) if group.duplicate_id == group_id => group.assets.push(asset),
            _ => groups.push(DuplicateGroup {
                duplicate_id: group_id,
                assets: vec![asset],
            }),
        }
    }
    groups.retain(|group| group.assets.len() >= 2);
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::assets::{
        create_asset, get_asset, remove_asset, restore_assets, soft_delete_assets,
    };
    use crate::queries::time_buckets::time_buckets;
    use aperture_core::{AssetFilter, TimeBucketOptions};
    use crate::queries::test_support::{new_asset, open_temp};
    use chrono::Utc;

    async fn seed(db: &Database, owner: &str, count: usize) -> Vec<String> {
        let mut ids = Vec::new();
        for i in 0..count {
            let asset = create_asset(db, &new_asset(owner, &format!("d{i}"), &format!("c{i}")))
                .await
                .unwrap();
            ids.push(asset.id);
        }
        ids
    }

    fn into(owner: &str, target: &str, ids: &[String], sources: &[&str]) -> RegroupOptions {
        RegroupOptions {
            owner_id: owner.to_string(),
            target_group_id: Some(target.to_string()),
            asset_ids: ids.to_vec(),
            source_group_ids: sources.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn regroup_creates_target_and_lists_members() {
        let (_dir, db) = open_temp().await;
        let ids = seed(&db, "u1", 3).await;
        regroup(&db, &into("u1", "g1", &ids, &[])).await.unwrap();

        let groups = duplicate_groups(&db, "u1").await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].duplicate_id, "g1");
        assert_eq!(groups[0].assets.len(), 3);
        let asset = get_asset(&db, &ids[0]).await.unwrap().unwrap();
        assert_eq!(asset.duplicate_id.as_deref(), Some("g1"));
    }

    #[tokio::test]
    async fn merging_source_group_dissolves_it() {
        let (_dir, db) = open_temp().await;
        let ids = seed(&db, "u1", 4).await;
        regroup(&db, &into("u1", "g1", &ids[..2], &[])).await.unwrap();
        regroup(&db, &into("u1", "g2", &ids[2..], &[])).await.unwrap();

        regroup(&db, &into("u1", "g2", &[], &["g1"])).await.unwrap();
        let groups = duplicate_groups(&db, "u1").await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].duplicate_id, "g2");
        assert_eq!(groups[0].assets.len(), 4);
    }

    #[tokio::test]
    async fn removing_one_of_two_members_deletes_group() {
        let (_dir, db) = open_temp().await;
        let ids = seed(&db, "u1", 2).await;
        regroup(&db, &into("u1", "g1", &ids, &[])).await.unwrap();
        let before = get_asset(&db, &ids[1]).await.unwrap().unwrap();

        let clear = RegroupOptions {
            owner_id: "u1".into(),
            target_group_id: None,
            asset_ids: vec![ids[0].clone()],
            source_group_ids: vec![],
        };
        regroup(&db, &clear).await.unwrap();

        assert!(duplicate_groups(&db, "u1").await.unwrap().is_empty());
        let survivor = get_asset(&db, &ids[1]).await.unwrap().unwrap();
        assert!(survivor.duplicate_id.is_none());
        assert!(survivor.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn single_asset_target_is_pruned() {
        let (_dir, db) = open_temp().await;
        let ids = seed(&db, "u1", 1).await;
        regroup(&db, &into("u1", "g1", &ids, &[])).await.unwrap();
        let asset = get_asset(&db, &ids[0]).await.unwrap().unwrap();
        assert!(asset.duplicate_id.is_none());
    }

    #[tokio::test]
    async fn other_owners_assets_do_not_move() {
        let (_dir, db) = open_temp().await;
        let mine = seed(&db, "u1", 2).await;
        let theirs = create_asset(&db, &new_asset("u2", "x", "x")).await.unwrap();
        let mut ids = mine.clone();
        ids.push(theirs.id.clone());
        regroup(&db, &into("u1", "g1", &ids, &[])).await.unwrap();

        let theirs = get_asset(&db, &theirs.id).await.unwrap().unwrap();
        assert!(theirs.duplicate_id.is_none());
        let err = regroup(&db, &into("u2", "g1", &[theirs.id.clone()], &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApertureError::NotFound { .. }));
    }

    #[tokio::test]
    async fn trashed_members_hide_small_groups() {
        let (_dir, db) = open_temp().await;
        let ids = seed(&db, "u1", 2).await;
        regroup(&db, &into("u1", "g1", &ids, &[])).await.unwrap();
        soft_delete_assets(&db, &ids[..1], Utc::now()).await.unwrap();
        assert!(duplicate_groups(&db, "u1").await.unwrap().is_empty());
    }

    fn duplicates_only() -> TimeBucketOptions {
        TimeBucketOptions {
            filter: AssetFilter {
                is_duplicate: Some(true),
                ..AssetFilter::for_user("u1")
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn survivor_of_trashed_pair_reads_as_unique() {
        let (_dir, db) = open_temp().await;
        let ids = seed(&db, "u1", 2).await;
        regroup(&db, &into("u1", "g1", &ids, &[])).await.unwrap();
        assert_eq!(time_buckets(&db, &duplicates_only()).await.unwrap()[0].count, 2);
        let before = get_asset(&db, &ids[0]).await.unwrap().unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        soft_delete_assets(&db, &ids[1..], Utc::now()).await.unwrap();
        let survivor = get_asset(&db, &ids[0]).await.unwrap().unwrap();
        assert!(survivor.duplicate_id.is_none());
        assert!(survivor.updated_at > before.updated_at);
        assert!(time_buckets(&db, &duplicates_only()).await.unwrap().is_empty());

        restore_assets(&db, &ids[1..]).await.unwrap();
        let survivor = get_asset(&db, &ids[0]).await.unwrap().unwrap();
        assert_eq!(survivor.duplicate_id.as_deref(), Some("g1"));
        assert_eq!(time_buckets(&db, &duplicates_only()).await.unwrap()[0].count, 2);
    }

    #[tokio::test]
    async fn three_member_group_survives_one_trashed() {
        let (_dir, db) = open_temp().await;
        let ids = seed(&db, "u1", 3).await;
        regroup(&db, &into("u1", "g1", &ids, &[])).await.unwrap();
        soft_delete_assets(&db, &ids[..1], Utc::now()).await.unwrap();

        let rest = get_asset(&db, &ids[2]).await.unwrap().unwrap();
        assert_eq!(rest.duplicate_id.as_deref(), Some("g1"));
        let groups = duplicate_groups(&db, "u1").await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].assets.len(), 2);
    }

    #[tokio::test]
    async fn hard_delete_prunes_group() {
        let (_dir, db) = open_temp().await;
        let ids = seed(&db, "u1", 2).await;
        regroup(&db, &into("u1", "g1", &ids, &[])).await.unwrap();
        remove_asset(&db, &ids[0]).await.unwrap();
        let survivor = get_asset(&db, &ids[1]).await.unwrap().unwrap();
        assert!(survivor.duplicate_id.is_none());
    }
}
