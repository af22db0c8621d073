// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-bucket keys and the filter set shared by bucket counts and listings.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ApertureError;
use crate::types::{AssetOrder, AssetType, TimeBucketSize};

/// Conjunctive filter over an owner's (or album's) assets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFilter {
    /// Owners whose assets are included.
    pub user_ids: Vec<String>,
    pub album_id: Option<String>,
    pub tag_id: Option<String>,
    pub person_id: Option<String>,
    pub is_favorite: Option<bool>,
    pub is_archived: Option<bool>,
    /// `Some(true)` lists only the trash; anything else hides trashed assets.
    pub is_trashed: Option<bool>,
    pub is_duplicate: Option<bool>,
    pub asset_type: Option<AssetType>,
    /// List every member of a stack instead of only its primary asset.
    pub expand_stacks: bool,
}

impl AssetFilter {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_ids: vec![user_id.into()],
            ..Default::default()
        }
    }

    /// A filter must name at least one owner or an album.
    pub fn has_scope(&self) -> bool {
        !self.user_ids.is_empty() || self.album_id.is_some()
    }
}

/// Options for bucket counts and bucket listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBucketOptions {
    pub size: TimeBucketSize,
    pub order: AssetOrder,
    pub filter: AssetFilter,
}

/// Calendar bucket identified by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeBucketKey {
    pub size: TimeBucketSize,
    pub start: NaiveDate,
}

impl TimeBucketKey {
    /// The bucket containing a local timestamp.
    pub fn containing(local: NaiveDateTime, size: TimeBucketSize) -> Self {
        let date = local.date();
        let start = match size {
            TimeBucketSize::Day => date,
            // Day 1 always exists.
            TimeBucketSize::Month => date.with_day(1).unwrap_or(date),
        };
        Self { size, start }
    }

    /// Parse a bucket key. Accepts `YYYY-MM-DD` or any longer ISO-8601
    /// timestamp; month keys are truncated to the first day.
    pub fn parse(value: &str, size: TimeBucketSize) -> Result<Self, ApertureError> {
        let date_part = value
            .get(..10)
            .ok_or_else(|| ApertureError::InvalidRange(format!("malformed time bucket `{value}`")))?;
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| {
            ApertureError::InvalidRange(format!("malformed time bucket `{value}`: {e}"))
        })?;
        Ok(Self::containing(date.and_time(NaiveTime::MIN), size))
    }

    /// Inclusive lower bound of the bucket.
    pub fn start_time(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Exclusive upper bound of the bucket.
    pub fn end_time(&self) -> Result<NaiveDateTime, ApertureError> {
        let end = match self.size {
            TimeBucketSize::Day => self.start.succ_opt(),
            TimeBucketSize::Month => {
                if self.start.month() == 12 {
                    NaiveDate::from_ymd_opt(self.start.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(self.start.year(), self.start.month() + 1, 1)
                }
            }
        };
        end.map(|d| d.and_time(NaiveTime::MIN))
            .ok_or_else(|| ApertureError::InvalidRange(format!("time bucket {self} out of range")))
    }
}

impl fmt::Display for TimeBucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start.format("%Y-%m-%d"))
    }
}

/// One row of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBucketCount {
    pub bucket: TimeBucketKey,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn month_bucket_truncates_to_first_day() {
        let key = TimeBucketKey::containing(dt("2024-03-17T10:00:00"), TimeBucketSize::Month);
        assert_eq!(key.to_string(), "2024-03-01");
        assert_eq!(key.end_time().unwrap(), dt("2024-04-01T00:00:00"));
    }

    #[test]
    fn december_month_rolls_into_next_year() {
        let key = TimeBucketKey::parse("2023-12-01", TimeBucketSize::Month).unwrap();
        assert_eq!(key.end_time().unwrap(), dt("2024-01-01T00:00:00"));
    }

    #[test]
    fn day_bucket_spans_one_day() {
        let key = TimeBucketKey::parse("2024-02-29T00:00:00.000Z", TimeBucketSize::Day).unwrap();
        assert_eq!(key.start_time(), dt("2024-02-29T00:00:00"));
        assert_eq!(key.end_time().unwrap(), dt("2024-03-01T00:00:00"));
    }

    #[test]
    fn malformed_bucket_is_invalid_range() {
        let err = TimeBucketKey::parse("2024-13", TimeBucketSize::Month).unwrap_err();
        assert!(matches!(err, ApertureError::InvalidRange(_)));
        let err = TimeBucketKey::parse("2024-13-01", TimeBucketSize::Month).unwrap_err();
        assert!(matches!(err, ApertureError::InvalidRange(_)));
    }

    #[test]
    fn bucket_keys_sort_chronologically() {
        let mut keys = vec![
            TimeBucketKey::parse("2024-05-01", TimeBucketSize::Month).unwrap(),
            TimeBucketKey::parse("2023-12-01", TimeBucketSize::Month).unwrap(),
            TimeBucketKey::parse("2024-01-01", TimeBucketSize::Month).unwrap(),
        ];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["2023-12-01", "2024-01-01", "2024-05-01"]);
        assert!(TimeBucketSize::Day < TimeBucketSize::Month);
    }

    #[test]
    fn filter_scope_requires_user_or_album() {
        assert!(!AssetFilter::default().has_scope());
        assert!(AssetFilter::for_user("u1").has_scope());
        let album = AssetFilter {
            album_id: Some("album-1".into()),
            ..Default::default()
        };
        assert!(album.has_scope());
    }
}
