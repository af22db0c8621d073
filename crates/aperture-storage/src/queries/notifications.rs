// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification CRUD, soft delete, and retention purge.

use aperture_core::{
    ApertureError, NewNotification, Notification, NotificationSearch, NotificationUpdate,
    RecordCondition, RetentionPolicy, RuleCutoffs,
};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::database::{map_tr_err, Database};
use crate::models::{format_timestamp, notification_from_row, now_timestamp, NOTIFICATION_COLUMNS};
use crate::queries::filter::Predicate;
use crate::queries::execute_chunked;

fn select_live(conn: &Connection, id: &str) -> rusqlite::Result<Option<Notification>> {
    conn.query_row(
        &format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?1 AND deleted_at IS NULL"
        ),
        params![id],
        notification_from_row,
    )
    .optional()
}

/// Live notifications of `user_id` matching `search`, newest first.
pub async fn search_notifications(
    db: &Database,
    user_id: &str,
    search: &NotificationSearch,
) -> Result<Vec<Notification>, ApertureError> {
    let mut predicate = Predicate::default();
    predicate.push_bound("user_id = ?", Value::Text(user_id.to_string()));
    predicate.push("deleted_at IS NULL");
    if let Some(id) = &search.id {
        predicate.push_bound("id = ?", Value::Text(id.clone()));
    }
    if let Some(level) = search.level {
        predicate.push_bound("level = ?", Value::Text(level.to_string()));
    }
    if let Some(kind) = search.notification_type {
        predicate.push_bound("notification_type = ?", Value::Text(kind.to_string()));
    }
    if search.unread {
        predicate.push("read_at IS NULL");
    }

    let sql = format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE {}
         ORDER BY created_at DESC, id DESC",
        predicate.sql
    );
    let values = predicate.values;
    db.connection()
        .call(move |conn| -> Result<Vec<Notification>, rusqlite::Error> {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), notification_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn create_notification(
    db: &Database,
    notification: &NewNotification,
) -> Result<Notification, ApertureError> {
    let n = notification.clone();
    let id = Uuid::new_v4().to_string();
    let created = db
        .connection()
        .call(move |conn| -> Result<Option<Notification>, rusqlite::Error> {
            let created_at = format_timestamp(n.created_at);
            conn.execute(
                "INSERT INTO notifications
                 (id, user_id, level, notification_type, title, description, data,
                  created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                params![
                    id,
                    n.user_id,
                    n.level.to_string(),
                    n.notification_type.to_string(),
                    n.title,
                    n.description,
                    n.data,
                    created_at,
                ],
            )?;
            select_live(conn, &id)
        })
        .await
        .map_err(map_tr_err)?;
    created.ok_or_else(|| ApertureError::Internal("inserted notification vanished".into()))
}

/// Fetch a live notification.
pub async fn get_notification(
    db: &Database,
    id: &str,
) -> Result<Option<Notification>, ApertureError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Notification>, rusqlite::Error> {
            select_live(conn, &id)
        })
        .await
        .map_err(map_tr_err)
}

fn assignments(update: &NotificationUpdate) -> (String, Vec<Value>) {
    let mut columns = Vec::new();
    let mut values = Vec::new();
    if let Some(read_at) = update.read_at {
        columns.push("read_at = ?");
        values.push(read_at.map_or(Value::Null, |ts| Value::Text(format_timestamp(ts))));
    }
    columns.push("updated_at = ?");
    values.push(Value::Text(now_timestamp()));
    (columns.join(", "), values)
}

/// Update a live notification and return it.
pub async fn update_notification(
    db: &Database,
    id: &str,
    update: &NotificationUpdate,
) -> Result<Notification, ApertureError> {
    let target = id.to_string();
    let (set, mut values) = assignments(update);
    values.push(Value::Text(target.clone()));
    let updated = db
        .connection()
        .call(move |conn| -> Result<Option<Notification>, rusqlite::Error> {
            let changed = conn.execute(
                &format!("UPDATE notifications SET {set} WHERE id = ? AND deleted_at IS NULL"),
                params_from_iter(values.iter()),
            )?;
            if changed == 0 {
                return Ok(None);
            }
            select_live(conn, &target)
        })
        .await
        .map_err(map_tr_err)?;
    updated.ok_or_else(|| ApertureError::not_found("notification", id))
}

pub async fn update_notifications(
    db: &Database,
    ids: &[String],
    update: &NotificationUpdate,
) -> Result<usize, ApertureError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let (set, leading) = assignments(update);
    let ids = ids.to_vec();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            execute_chunked(conn, &ids, &leading, |list| {
                format!("UPDATE notifications SET {set} WHERE id IN ({list}) AND deleted_at IS NULL")
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Soft delete one live notification.
pub async fn delete_notification(
    db: &Database,
    id: &str,
    now: DateTime<Utc>,
) -> Result<(), ApertureError> {
    let deleted = delete_notifications(db, &[id.to_string()], now).await?;
    if deleted == 0 {
        return Err(ApertureError::not_found("notification", id));
    }
    Ok(())
}

pub async fn delete_notifications(
    db: &Database,
    ids: &[String],
    now: DateTime<Utc>,
) -> Result<usize, ApertureError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let leading = [
        Value::Text(format_timestamp(now)),
        Value::Text(now_timestamp()),
    ];
    let ids = ids.to_vec();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            execute_chunked(conn, &ids, &leading, |list| {
                format!(
                    "UPDATE notifications SET deleted_at = ?, updated_at = ?
                     WHERE id IN ({list}) AND deleted_at IS NULL"
                )
            })
        })
        .await
        .map_err(map_tr_err)
}

/// SQL for one rule: the anchor column must be set and older than the cutoff.
fn rule_clause(cutoffs: &RuleCutoffs) -> Predicate {
    let mut clause = Predicate::default();
    let anchor_before = Value::Text(format_timestamp(cutoffs.anchor_before));
    match cutoffs.condition {
        RecordCondition::SoftDeleted => {
            clause.push_bound("deleted_at IS NOT NULL AND deleted_at < ?", anchor_before);
        }
        RecordCondition::Read => {
            clause.push_bound("read_at IS NOT NULL AND read_at < ?", anchor_before);
        }
        RecordCondition::Unread => {
            clause.push_bound("read_at IS NULL AND created_at < ?", anchor_before);
        }
    }
    if let Some(created_before) = cutoffs.created_before {
        clause.push_bound(
            "created_at < ?",
            Value::Text(format_timestamp(created_before)),
        );
    }
    clause
}

/// Hard delete every notification any rule of `policy` matches at `now`.
pub async fn purge_notifications(
    db: &Database,
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> Result<usize, ApertureError> {
    if policy.is_empty() {
        return Ok(0);
    }
    let mut clauses = Vec::new();
    let mut values = Vec::new();
    for rule in policy.rules() {
        let clause = rule_clause(&rule.cutoffs(now));
        clauses.push(format!("({})", clause.sql));
        values.extend(clause.values);
    }
    let sql = format!("DELETE FROM notifications WHERE {}", clauses.join(" OR "));
    let purged = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(&sql, params_from_iter(values.iter()))
        })
        .await
        .map_err(map_tr_err)?;
    debug!(purged, "notifications purged");
    Ok(purged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::open_temp;
    use aperture_core::{NotificationLevel, NotificationType, RetentionSubject};
    use chrono::TimeDelta;

    fn note(user: &str, title: &str) -> NewNotification {
        NewNotification::new(user, NotificationLevel::Info, NotificationType::Custom, title)
    }

    #[tokio::test]
    async fn create_get_and_search() {
        let (_dir, db) = open_temp().await;
        let mut older = note("u1", "first");
        older.created_at = Utc::now() - TimeDelta::minutes(5);
        let first = create_notification(&db, &older).await.unwrap();
        let second = create_notification(
            &db,
            &NewNotification {
                level: NotificationLevel::Error,
                ..note("u1", "second")
            },
        )
        .await
        .unwrap();
        create_notification(&db, &note("u2", "other")).await.unwrap();

        let fetched = get_notification(&db, &first.id).await.unwrap().unwrap();
        assert_eq!(fetched, first);

        let all = search_notifications(&db, "u1", &NotificationSearch::default())
            .await
            .unwrap();
        let ids: Vec<_> = all.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, [second.id.as_str(), first.id.as_str()]);

        let errors = search_notifications(
            &db,
            "u1",
            &NotificationSearch {
                level: Some(NotificationLevel::Error),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].title, "second");
    }

    #[tokio::test]
    async fn read_and_unread_round_trip() {
        let (_dir, db) = open_temp().await;
        let n = create_notification(&db, &note("u1", "hello")).await.unwrap();
        let read = update_notification(&db, &n.id, &NotificationUpdate::mark_read(Utc::now()))
            .await
            .unwrap();
        assert!(read.read_at.is_some());

        let unread_only = NotificationSearch {
            unread: true,
            ..Default::default()
        };
        assert!(search_notifications(&db, "u1", &unread_only).await.unwrap().is_empty());

        let unread = update_notification(&db, &n.id, &NotificationUpdate::mark_unread())
            .await
            .unwrap();
        assert!(unread.read_at.is_none());
        assert_eq!(search_notifications(&db, "u1", &unread_only).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleted_notifications_disappear() {
        let (_dir, db) = open_temp().await;
        let n = create_notification(&db, &note("u1", "bye")).await.unwrap();
        delete_notification(&db, &n.id, Utc::now()).await.unwrap();

        assert!(get_notification(&db, &n.id).await.unwrap().is_none());
        let err = delete_notification(&db, &n.id, Utc::now()).await.unwrap_err();
        assert!(matches!(err, ApertureError::NotFound { .. }));
        let err = update_notification(&db, &n.id, &NotificationUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApertureError::NotFound { .. }));
    }

    #[tokio::test]
    async fn bulk_updates_skip_deleted() {
        let (_dir, db) = open_temp().await;
        let a = create_notification(&db, &note("u1", "a")).await.unwrap();
        let b = create_notification(&db, &note("u1", "b")).await.unwrap();
        delete_notifications(&db, &[b.id.clone()], Utc::now()).await.unwrap();
        let ids = vec![a.id.clone(), b.id.clone()];
        let touched = update_notifications(&db, &ids, &NotificationUpdate::mark_read(Utc::now()))
            .await
            .unwrap();
        assert_eq!(touched, 1);
    }

    #[tokio::test]
    async fn purge_agrees_with_in_memory_policy() {
        let (_dir, db) = open_temp().await;
        let now = Utc::now();
        let policy = RetentionPolicy::notifications(3, 2, 15, 30);
        let days = |d: i64| now - TimeDelta::days(d);

        // (created, read, deleted) in days ago.
        let cases: [(i64, Option<i64>, Option<i64>); 7] = [
            (31, None, None),
            (29, None, None),
            (20, Some(3), None),
            (20, Some(1), None),
            (10, Some(5), None),
            (5, None, Some(4)),
            (5, None, Some(1)),
        ];
        let mut kept = Vec::new();
        for (i, (created, read, deleted)) in cases.into_iter().enumerate() {
            let mut new = note("u1", &format!("n{i}"));
            new.created_at = days(created);
            let n = create_notification(&db, &new).await.unwrap();
            if let Some(read) = read {
                update_notification(&db, &n.id, &NotificationUpdate::mark_read(days(read)))
                    .await
                    .unwrap();
            }
            if let Some(deleted) = deleted {
                delete_notification(&db, &n.id, days(deleted)).await.unwrap();
            }
            let subject = RetentionSubject {
                created_at: days(created),
                read_at: read.map(days),
                deleted_at: deleted.map(days),
            };
            if !policy.matches(&subject, now) {
                kept.push(n.id);
            }
        }

        let purged = purge_notifications(&db, &policy, now).await.unwrap();
        assert_eq!(purged, cases.len() - kept.len());
        assert_eq!(purged, 3);

        let remaining = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare("SELECT id FROM notifications")?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap();
        let mut remaining = remaining;
        remaining.sort();
        kept.sort();
        assert_eq!(remaining, kept);
    }

    #[tokio::test]
    async fn empty_policy_purges_nothing() {
        let (_dir, db) = open_temp().await;
        let mut old = note("u1", "ancient");
        old.created_at = Utc::now() - TimeDelta::days(400);
        create_notification(&db, &old).await.unwrap();
        let purged = purge_notifications(&db, &RetentionPolicy::default(), Utc::now())
            .await
            .unwrap();
        assert_eq!(purged, 0);
    }
}
