// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row mapping between SQLite and the domain types in `aperture-core`.
//!
//! Server timestamps are stored as `YYYY-MM-DDTHH:MM:SS.sssZ` text and the
//! device-local capture time without the zone suffix. Both sort
//! lexicographically in chronological order.

use std::str::FromStr;

use aperture_core::{
    Asset, AssetType, Checksum, Notification, NotificationLevel, NotificationType,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Columns selected for every asset query, in [`asset_from_row`] order.
///
/// `a` is the assets table, `m` the left-joined duplicate membership (see
/// [`ASSET_FROM`]).
pub(crate) const ASSET_COLUMNS: &str = "a.id, a.owner_id, a.library_id, a.device_id, \
     a.device_asset_id, a.asset_type, a.checksum, a.original_path, a.original_file_name, \
     a.file_created_at, a.file_modified_at, a.local_date_time, a.live_photo_cid, \
     a.live_photo_video_id, m.group_id, a.stack_id, a.is_favorite, a.is_archived, \
     a.is_offline, a.is_visible, a.created_at, a.updated_at, a.deleted_at";

/// `FROM` clause pairing with [`ASSET_COLUMNS`].
///
/// Membership only joins while the group still has two live, visible
/// members, so a group shrunk by trashing reads as no group at all.
pub(crate) const ASSET_FROM: &str = "FROM assets a LEFT JOIN duplicate_group_members m \
     ON m.asset_id = a.id AND (SELECT COUNT(*) FROM duplicate_group_members gm \
     JOIN assets ga ON ga.id = gm.asset_id \
     WHERE gm.group_id = m.group_id AND ga.deleted_at IS NULL AND ga.is_visible = 1) >= 2";

pub(crate) const NOTIFICATION_COLUMNS: &str = "id, user_id, level, notification_type, title, \
     description, data, created_at, updated_at, read_at, deleted_at";

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_local(ts: NaiveDateTime) -> String {
    ts.format(LOCAL_FORMAT).to_string()
}

/// Current time as stored text.
pub(crate) fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| conversion_error(idx, e))
}

fn optional_timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|text| {
        NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|e| conversion_error(idx, e))
    })
    .transpose()
}

fn parsed_at<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse().map_err(|e| conversion_error(idx, e))
}

/// Map a row selected with [`ASSET_COLUMNS`].
pub(crate) fn asset_from_row(row: &Row<'_>) -> rusqlite::Result<Asset> {
    let local: String = row.get(11)?;
    let local_date_time = NaiveDateTime::parse_from_str(&local, LOCAL_FORMAT)
        .map_err(|e| conversion_error(11, e))?;
    let asset_type: AssetType = parsed_at(row, 5)?;

    Ok(Asset {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        library_id: row.get(2)?,
        device_id: row.get(3)?,
        device_asset_id: row.get(4)?,
        asset_type,
        checksum: Checksum(row.get(6)?),
        original_path: row.get(7)?,
        original_file_name: row.get(8)?,
        file_created_at: timestamp_at(row, 9)?,
        file_modified_at: timestamp_at(row, 10)?,
        local_date_time,
        live_photo_cid: row.get(12)?,
        live_photo_video_id: row.get(13)?,
        duplicate_id: row.get(14)?,
        stack_id: row.get(15)?,
        is_favorite: row.get(16)?,
        is_archived: row.get(17)?,
        is_offline: row.get(18)?,
        is_visible: row.get(19)?,
        created_at: timestamp_at(row, 20)?,
        updated_at: timestamp_at(row, 21)?,
        deleted_at: optional_timestamp_at(row, 22)?,
    })
}

/// Map a row selected with [`NOTIFICATION_COLUMNS`].
pub(crate) fn notification_from_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    let level: NotificationLevel = parsed_at(row, 2)?;
    let notification_type: NotificationType = parsed_at(row, 3)?;
    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        level,
        notification_type,
        title: row.get(4)?,
        description: row.get(5)?,
        data: row.get(6)?,
        created_at: timestamp_at(row, 7)?,
        updated_at: timestamp_at(row, 8)?,
        read_at: optional_timestamp_at(row, 9)?,
        deleted_at: optional_timestamp_at(row, 10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_sort_like_instants() {
        let earlier = Utc.with_ymd_and_hms(2024, 9, 30, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap();
        assert!(format_timestamp(earlier) < format_timestamp(later));
        assert_eq!(format_timestamp(later), "2024-10-01T00:00:00.000Z");
    }

    #[test]
    fn local_time_keeps_no_zone() {
        let local = NaiveDateTime::parse_from_str("2024-03-05 07:08:09", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        assert_eq!(format_local(local), "2024-03-05T07:08:09.000");
    }
}
