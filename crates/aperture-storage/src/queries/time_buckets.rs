// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-bucket aggregation over `local_date_time`.
//!
//! Counting is a single `GROUP BY` over a truncated text key, so asset rows
//! are never materialized to compute bucket sizes.

use aperture_core::{
    ApertureError, Asset, AssetOrder, TimeBucketCount, TimeBucketKey, TimeBucketOptions,
    TimeBucketSize,
};
use chrono::NaiveDate;
use rusqlite::params_from_iter;
use rusqlite::types::{Type, Value};

use crate::database::{map_tr_err, Database};
use crate::models::{format_local, ASSET_FROM};
use crate::queries::assets::select_assets;
use crate::queries::filter::asset_predicate;

fn bucket_expr(size: TimeBucketSize) -> &'static str {
    match size {
        TimeBucketSize::Day => "substr(a.local_date_time, 1, 10)",
        TimeBucketSize::Month => "substr(a.local_date_time, 1, 7) || '-01'",
    }
}

fn direction(order: AssetOrder) -> &'static str {
    match order {
        AssetOrder::Asc => "ASC",
        AssetOrder::Desc => "DESC",
    }
}

/// Count filtered assets per bucket.
pub async fn time_buckets(
    db: &Database,
    options: &TimeBucketOptions,
) -> Result<Vec<TimeBucketCount>, ApertureError> {
    let predicate = asset_predicate(&options.filter);
    let size = options.size;
    let sql = format!(
        "SELECT {key} AS bucket, COUNT(*) {ASSET_FROM} WHERE {filter}
         GROUP BY bucket ORDER BY bucket {dir}",
        key = bucket_expr(size),
        filter = predicate.sql,
        dir = direction(options.order),
    );

    db.connection()
        .call(move |conn| -> Result<Vec<TimeBucketCount>, rusqlite::Error> {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(predicate.values.iter()), |row| {
                let key: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                let start = NaiveDate::parse_from_str(&key, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
                })?;
                Ok(TimeBucketCount {
                    bucket: TimeBucketKey { size, start },
                    count: u64::try_from(count).unwrap_or_default(),
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Filtered assets whose local time falls in `bucket`, ordered by local
/// time then id in the requested direction.
pub async fn time_bucket_assets(
    db: &Database,
    bucket: &TimeBucketKey,
    options: &TimeBucketOptions,
) -> Result<Vec<Asset>, ApertureError> {
    let start = Value::Text(format_local(bucket.start_time()));
    let end = Value::Text(format_local(bucket.end_time()?));
    let predicate = asset_predicate(&options.filter).and(
        "a.local_date_time >= ? AND a.local_date_time < ?",
        [start, end],
    );
    let dir = direction(options.order);
    let tail = format!(
        "WHERE {} ORDER BY a.local_date_time {dir}, a.id {dir}",
        predicate.sql
    );

    db.connection()
        .call(move |conn| -> Result<Vec<Asset>, rusqlite::Error> {
            select_assets(conn, &tail, &predicate.values)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::assets::{create_asset, soft_delete_assets};
    use crate::queries::test_support::{asset_at, open_temp};
    use aperture_core::AssetFilter;
    use chrono::Utc;

    async fn seed(db: &Database) -> Vec<String> {
        let times = [
            "2024-01-05T10:00:00",
            "2024-01-20T08:00:00",
            "2024-02-29T23:59:59",
            "2024-03-01T00:00:00",
            "2024-03-01T00:00:00",
        ];
        let mut ids = Vec::new();
        for (i, t) in times.iter().enumerate() {
            let asset = create_asset(db, &asset_at("u1", &format!("d{i}"), t))
                .await
                .unwrap();
            ids.push(asset.id);
        }
        ids
    }

    fn options(size: TimeBucketSize, order: AssetOrder) -> TimeBucketOptions {
        TimeBucketOptions {
            size,
            order,
            filter: AssetFilter::for_user("u1"),
        }
    }

    #[tokio::test]
    async fn month_buckets_count_and_order() {
        let (_dir, db) = open_temp().await;
        seed(&db).await;
        let buckets = time_buckets(&db, &options(TimeBucketSize::Month, AssetOrder::Desc))
            .await
            .unwrap();
        let summary: Vec<(String, u64)> = buckets
            .iter()
            .map(|b| (b.bucket.to_string(), b.count))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("2024-03-01".to_string(), 2),
                ("2024-02-01".to_string(), 1),
                ("2024-01-01".to_string(), 2),
            ]
        );
    }

    #[tokio::test]
    async fn day_buckets_ascending() {
        let (_dir, db) = open_temp().await;
        seed(&db).await;
        let buckets = time_buckets(&db, &options(TimeBucketSize::Day, AssetOrder::Asc))
            .await
            .unwrap();
        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets[0].bucket.to_string(), "2024-01-05");
        assert_eq!(buckets[3].bucket.to_string(), "2024-03-01");
    }

    #[tokio::test]
    async fn bucket_listing_is_half_open_and_tie_broken_by_id() {
        let (_dir, db) = open_temp().await;
        let ids = seed(&db).await;
        let march = TimeBucketKey::parse("2024-03-01", TimeBucketSize::Month).unwrap();
        let assets = time_bucket_assets(&db, &march, &options(TimeBucketSize::Month, AssetOrder::Asc))
            .await
            .unwrap();
        let mut expected = vec![ids[3].clone(), ids[4].clone()];
        expected.sort();
        let got: Vec<String> = assets.into_iter().map(|a| a.id).collect();
        assert_eq!(got, expected);

        let feb = TimeBucketKey::parse("2024-02-01", TimeBucketSize::Month).unwrap();
        let desc = time_bucket_assets(&db, &feb, &options(TimeBucketSize::Month, AssetOrder::Desc))
            .await
            .unwrap();
        assert_eq!(desc.len(), 1);
        assert_eq!(desc[0].id, ids[2]);
    }

    #[tokio::test]
    async fn trashed_assets_only_when_requested() {
        let (_dir, db) = open_temp().await;
        let ids = seed(&db).await;
        soft_delete_assets(&db, &ids[..1], Utc::now()).await.unwrap();

        let live = time_buckets(&db, &options(TimeBucketSize::Month, AssetOrder::Asc))
            .await
            .unwrap();
        assert_eq!(live.iter().map(|b| b.count).sum::<u64>(), 4);

        let mut trash = options(TimeBucketSize::Month, AssetOrder::Asc);
        trash.filter.is_trashed = Some(true);
        let trashed = time_buckets(&db, &trash).await.unwrap();
        assert_eq!(trashed.len(), 1);
        assert_eq!(trashed[0].count, 1);
    }
}
