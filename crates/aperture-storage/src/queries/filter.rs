// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Translates an [`AssetFilter`] into a SQL predicate over `assets a`
//! left-joined with `duplicate_group_members m`.

use aperture_core::AssetFilter;
use rusqlite::types::Value;

use crate::queries::{placeholders, text_values};

/// A `WHERE` body and the values bound to its placeholders, in order.
#[derive(Debug, Default)]
pub(crate) struct Predicate {
    pub sql: String,
    pub values: Vec<Value>,
}

impl Predicate {
    pub(crate) fn push(&mut self, clause: &str) {
        if !self.sql.is_empty() {
            self.sql.push_str(" AND ");
        }
        self.sql.push_str(clause);
    }

    pub(crate) fn push_bound(&mut self, clause: &str, value: Value) {
        self.push(clause);
        self.values.push(value);
    }

    /// Append another condition with its own values.
    pub(crate) fn and(mut self, clause: &str, values: impl IntoIterator<Item = Value>) -> Self {
        self.push(clause);
        self.values.extend(values);
        self
    }
}

pub(crate) fn asset_predicate(filter: &AssetFilter) -> Predicate {
    let mut p = Predicate::default();
    p.push("a.is_visible = 1");

    if !filter.user_ids.is_empty() {
        p.push(&format!(
            "a.owner_id IN ({})",
            placeholders(filter.user_ids.len())
        ));
        p.values.extend(text_values(&filter.user_ids));
    }
    if let Some(album_id) = &filter.album_id {
        p.push_bound(
            "EXISTS (SELECT 1 FROM album_assets aa WHERE aa.asset_id = a.id AND aa.album_id = ?)",
            Value::Text(album_id.clone()),
        );
    }
    if let Some(tag_id) = &filter.tag_id {
        p.push_bound(
            "EXISTS (SELECT 1 FROM tag_assets ta WHERE ta.asset_id = a.id AND ta.tag_id = ?)",
            Value::Text(tag_id.clone()),
        );
    }
    if let Some(person_id) = &filter.person_id {
        p.push_bound(
            "EXISTS (SELECT 1 FROM asset_faces af WHERE af.asset_id = a.id AND af.person_id = ?)",
            Value::Text(person_id.clone()),
        );
    }
    if let Some(v) = filter.is_favorite {
        p.push_bound("a.is_favorite = ?", Value::Integer(i64::from(v)));
    }
    if let Some(v) = filter.is_archived {
        p.push_bound("a.is_archived = ?", Value::Integer(i64::from(v)));
    }
    if filter.is_trashed == Some(true) {
        p.push("a.deleted_at IS NOT NULL");
    } else {
        p.push("a.deleted_at IS NULL");
    }
    match filter.is_duplicate {
        Some(true) => p.push("m.group_id IS NOT NULL"),
        Some(false) => p.push("m.group_id IS NULL"),
        None => {}
    }
    if let Some(asset_type) = filter.asset_type {
        p.push_bound("a.asset_type = ?", Value::Text(asset_type.to_string()));
    }
    if !filter.expand_stacks {
        p.push(
            "(a.stack_id IS NULL OR EXISTS (SELECT 1 FROM stacks s \
             WHERE s.id = a.stack_id AND s.primary_asset_id = a.id))",
        );
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use aperture_core::AssetType;

    #[test]
    fn default_filter_hides_trash_and_stack_members() {
        let p = asset_predicate(&AssetFilter::for_user("u1"));
        assert!(p.sql.starts_with("a.is_visible = 1 AND a.owner_id IN (?)"));
        assert!(p.sql.contains("a.deleted_at IS NULL"));
        assert!(p.sql.contains("a.stack_id IS NULL"));
        assert_eq!(p.values.len(), 1);
    }

    #[test]
    fn values_follow_clause_order() {
        let filter = AssetFilter {
            user_ids: vec!["u1".into(), "u2".into()],
            album_id: Some("album".into()),
            is_favorite: Some(true),
            asset_type: Some(AssetType::Video),
            expand_stacks: true,
            ..Default::default()
        };
        let p = asset_predicate(&filter);
        assert_eq!(
            p.values,
            vec![
                Value::Text("u1".into()),
                Value::Text("u2".into()),
                Value::Text("album".into()),
                Value::Integer(1),
                Value::Text("VIDEO".into()),
            ]
        );
        assert!(!p.sql.contains("stacks"));
    }
}
