// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tiered, time-based retention rules.
//!
//! A [`RetentionPolicy`] is a list of [`RetentionRule`]s combined with OR: a
//! record is purged as soon as any rule matches. Rules can be evaluated in
//! memory with [`RetentionPolicy::matches`]; storage adapters translate the
//! same rules into a single delete statement via [`RetentionRule::cutoffs`].

use chrono::{DateTime, TimeDelta, Utc};

/// Which records a rule applies to. Also determines the timestamp the rule's
/// age is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordCondition {
    /// Soft-deleted; age measured from `deleted_at`.
    SoftDeleted,
    /// Read; age measured from `read_at`.
    Read,
    /// Never read; age measured from `created_at`.
    Unread,
}

/// The timestamps a rule needs to decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionSubject {
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Absolute cutoffs of a rule at a given instant. A record matches when its
/// anchor timestamp is strictly before `anchor_before` (and, if set, its
/// `created_at` strictly before `created_before`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleCutoffs {
    pub condition: RecordCondition,
    pub anchor_before: DateTime<Utc>,
    pub created_before: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionRule {
    pub condition: RecordCondition,
    pub older_than: TimeDelta,
    pub created_older_than: Option<TimeDelta>,
}

impl RetentionRule {
    pub fn soft_deleted(older_than: TimeDelta) -> Self {
        Self {
            condition: RecordCondition::SoftDeleted,
            older_than,
            created_older_than: None,
        }
    }

    pub fn read(older_than: TimeDelta, created_older_than: TimeDelta) -> Self {
        Self {
            condition: RecordCondition::Read,
            older_than,
            created_older_than: Some(created_older_than),
        }
    }

    pub fn unread(older_than: TimeDelta) -> Self {
        Self {
            condition: RecordCondition::Unread,
            older_than,
            created_older_than: None,
        }
    }

    pub fn cutoffs(&self, now: DateTime<Utc>) -> RuleCutoffs {
        RuleCutoffs {
            condition: self.condition,
            anchor_before: now - self.older_than,
            created_before: self.created_older_than.map(|age| now - age),
        }
    }

    pub fn matches(&self, subject: &RetentionSubject, now: DateTime<Utc>) -> bool {
        let cutoffs = self.cutoffs(now);
        let anchor = match self.condition {
            RecordCondition::SoftDeleted => subject.deleted_at,
            RecordCondition::Read => subject.read_at,
            RecordCondition::Unread => match subject.read_at {
                Some(_) => None,
                None => Some(subject.created_at),
            },
        };
        let Some(anchor) = anchor else {
            return false;
        };
        anchor < cutoffs.anchor_before
            && cutoffs
                .created_before
                .is_none_or(|before| subject.created_at < before)
    }
}

/// Disjunction of retention rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    rules: Vec<RetentionRule>,
}

impl RetentionPolicy {
    pub fn new(rules: Vec<RetentionRule>) -> Self {
        Self { rules }
    }

    /// Notification expiry:
    /// soft-deleted more than `deleted_days` ago, or
    /// read more than `read_days` ago and created more than `read_min_age_days` ago, or
    /// unread and created more than `unread_days` ago.
    pub fn notifications(
        deleted_days: i64,
        read_days: i64,
        read_min_age_days: i64,
        unread_days: i64,
    ) -> Self {
        Self::new(vec![
            RetentionRule::soft_deleted(TimeDelta::days(deleted_days)),
            RetentionRule::read(TimeDelta::days(read_days), TimeDelta::days(read_min_age_days)),
            RetentionRule::unread(TimeDelta::days(unread_days)),
        ])
    }

    pub fn rules(&self) -> &[RetentionRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn matches(&self, subject: &RetentionSubject, now: DateTime<Utc>) -> bool {
        self.rules.iter().any(|rule| rule.matches(subject, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn default_policy() -> RetentionPolicy {
        RetentionPolicy::notifications(3, 2, 15, 30)
    }

    fn days_ago(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
        now - TimeDelta::days(days)
    }

    #[test]
    fn unread_older_than_thirty_days_is_purged() {
        let now = Utc::now();
        let subject = RetentionSubject {
            created_at: days_ago(now, 31),
            read_at: None,
            deleted_at: None,
        };
        assert!(default_policy().matches(&subject, now));
    }

    #[test]
    fn recently_read_old_notification_is_kept() {
        let now = Utc::now();
        let subject = RetentionSubject {
            created_at: days_ago(now, 20),
            read_at: Some(days_ago(now, 1)),
            deleted_at: None,
        };
        assert!(!default_policy().matches(&subject, now));
    }

    #[test]
    fn read_long_ago_and_old_is_purged() {
        let now = Utc::now();
        let subject = RetentionSubject {
            created_at: days_ago(now, 20),
            read_at: Some(days_ago(now, 3)),
            deleted_at: None,
        };
        assert!(default_policy().matches(&subject, now));
    }

    #[test]
    fn read_long_ago_but_young_is_kept() {
        let now = Utc::now();
        let subject = RetentionSubject {
            created_at: days_ago(now, 10),
            read_at: Some(days_ago(now, 5)),
            deleted_at: None,
        };
        assert!(!default_policy().matches(&subject, now));
    }

    #[test]
    fn soft_deleted_four_days_ago_is_purged() {
        let now = Utc::now();
        let subject = RetentionSubject {
            created_at: days_ago(now, 5),
            read_at: None,
            deleted_at: Some(days_ago(now, 4)),
        };
        assert!(default_policy().matches(&subject, now));
    }

    #[test]
    fn soft_deleted_yesterday_is_kept() {
        let now = Utc::now();
        let subject = RetentionSubject {
            created_at: days_ago(now, 5),
            read_at: None,
            deleted_at: Some(days_ago(now, 1)),
        };
        assert!(!default_policy().matches(&subject, now));
    }

    #[test]
    fn empty_policy_never_matches() {
        let now = Utc::now();
        let subject = RetentionSubject {
            created_at: days_ago(now, 400),
            read_at: None,
            deleted_at: Some(days_ago(now, 400)),
        };
        assert!(!RetentionPolicy::default().matches(&subject, now));
    }

    #[test]
    fn cutoffs_are_relative_to_now() {
        let now = Utc::now();
        let cutoffs = RetentionRule::read(TimeDelta::days(2), TimeDelta::days(15)).cutoffs(now);
        assert_eq!(cutoffs.anchor_before, days_ago(now, 2));
        assert_eq!(cutoffs.created_before, Some(days_ago(now, 15)));
    }

    fn subject_strategy() -> impl Strategy<Value = (i64, Option<i64>, Option<i64>)> {
        (0i64..60, proptest::option::of(0i64..60), proptest::option::of(0i64..60))
    }

    proptest! {
        #[test]
        fn policy_is_the_disjunction_of_its_rules((created, read, deleted) in subject_strategy()) {
            let now = Utc::now();
            let subject = RetentionSubject {
                created_at: days_ago(now, created),
                read_at: read.map(|d| days_ago(now, d)),
                deleted_at: deleted.map(|d| days_ago(now, d)),
            };
            let policy = default_policy();
            let any = policy.rules().iter().any(|r| r.matches(&subject, now));
            prop_assert_eq!(policy.matches(&subject, now), any);
        }

        #[test]
        fn records_without_deletion_or_read_only_expire_by_age(created in 0i64..60) {
            let now = Utc::now();
            let subject = RetentionSubject {
                created_at: days_ago(now, created),
                read_at: None,
                deleted_at: None,
            };
            prop_assert_eq!(default_policy().matches(&subject, now), created > 30);
        }
    }
}
