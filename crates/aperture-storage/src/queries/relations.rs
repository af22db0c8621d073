// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Album, tag, and face membership used by timeline scopes.

use aperture_core::ApertureError;
use rusqlite::types::Value;

use crate::database::{map_tr_err, Database};
use crate::queries::execute_chunked;

#[derive(Debug, Clone, Copy)]
enum Relation {
    Album,
    Tag,
    Person,
}

impl Relation {
    fn table(self) -> &'static str {
        match self {
            Self::Album => "album_assets",
            Self::Tag => "tag_assets",
            Self::Person => "asset_faces",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Album => "album_id",
            Self::Tag => "tag_id",
            Self::Person => "person_id",
        }
    }
}

/// Idempotent insert; ids that name no asset are skipped.
async fn add_members(
    db: &Database,
    relation: Relation,
    parent_id: &str,
    asset_ids: &[String],
) -> Result<(), ApertureError> {
    if asset_ids.is_empty() {
        return Ok(());
    }
    let leading = [Value::Text(parent_id.to_string())];
    let asset_ids = asset_ids.to_vec();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            execute_chunked(conn, &asset_ids, &leading, |list| {
                format!(
                    "INSERT OR IGNORE INTO {} ({}, asset_id)
                     SELECT ?, id FROM assets WHERE id IN ({list})",
                    relation.table(),
                    relation.key(),
                )
            })?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn add_album_assets(
    db: &Database,
    album_id: &str,
    asset_ids: &[String],
) -> Result<(), ApertureError> {
    add_members(db, Relation::Album, album_id, asset_ids).await
}

pub async fn add_tag_assets(
    db: &Database,
    tag_id: &str,
    asset_ids: &[String],
) -> Result<(), ApertureError> {
    add_members(db, Relation::Tag, tag_id, asset_ids).await
}

pub async fn add_person_assets(
    db: &Database,
    person_id: &str,
    asset_ids: &[String],
) -> Result<(), ApertureError> {
    add_members(db, Relation::Person, person_id, asset_ids).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::assets::create_asset;
    use crate::queries::test_support::{new_asset, open_temp};

    async fn count(db: &Database, sql: &'static str) -> i64 {
        db.connection()
            .call(move |conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(sql, [], |row| row.get(0))
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn adding_twice_is_idempotent_and_skips_unknown_ids() {
        let (_dir, db) = open_temp().await;
        let asset = create_asset(&db, &new_asset("u1", "d1", "a")).await.unwrap();
        let ids = vec![asset.id.clone(), "missing".to_string()];

        add_album_assets(&db, "album-1", &ids).await.unwrap();
        add_album_assets(&db, "album-1", &ids).await.unwrap();
        add_tag_assets(&db, "tag-1", &ids).await.unwrap();
        add_person_assets(&db, "person-1", &ids).await.unwrap();

        assert_eq!(count(&db, "SELECT COUNT(*) FROM album_assets").await, 1);
        assert_eq!(count(&db, "SELECT COUNT(*) FROM tag_assets").await, 1);
        assert_eq!(count(&db, "SELECT COUNT(*) FROM asset_faces").await, 1);
    }
}
