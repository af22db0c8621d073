// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Aperture configuration system.

use aperture_config::diagnostic::ConfigError;
use aperture_config::model::ApertureConfig;
use aperture_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};
use aperture_core::AssetOrder;

/// Every section and key parses from TOML.
#[test]
fn full_toml_deserializes_into_aperture_config() {
    let toml = r#"
[log]
level = "debug"

[storage]
database_path = "/tmp/catalog.db"
wal_mode = false

[sync]
max_page_size = 250

[timeline]
default_order = "asc"

[retention]
enabled = false
sweep_interval_secs = 60
notification_deleted_days = 5
notification_read_days = 4
notification_read_min_age_days = 20
notification_unread_days = 45
asset_trash_days = 7
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/catalog.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.sync.max_page_size, 250);
    assert_eq!(config.timeline.default_order, AssetOrder::Asc);
    assert!(!config.retention.enabled);
    assert_eq!(config.retention.sweep_interval_secs, 60);
    assert_eq!(config.retention.notification_deleted_days, 5);
    assert_eq!(config.retention.notification_read_days, 4);
    assert_eq!(config.retention.notification_read_min_age_days, 20);
    assert_eq!(config.retention.notification_unread_days, 45);
    assert_eq!(config.retention.asset_trash_days, 7);
}

/// Missing optional sections use defaults without error.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.log.level, "info");
    assert_eq!(config.sync.max_page_size, 1000);
    assert_eq!(config.timeline.default_order, AssetOrder::Desc);
    assert_eq!(config.retention.notification_unread_days, 30);
}

#[test]
fn unknown_field_in_retention_produces_error() {
    let toml = r#"
[retention]
asset_trash_dys = 3
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("asset_trash_dys"),
        "error should mention the bad key, got: {err_str}"
    );
}

#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[logging]
level = "debug"
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// Unknown keys become diagnostics with a typo suggestion.
#[test]
fn unknown_key_diagnostic_suggests_fix() {
    let toml = r#"
[sync]
max_page_sze = 10
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "max_page_sze");
            assert_eq!(suggestion.as_deref(), Some("max_page_size"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn wrong_type_becomes_invalid_type() {
    let toml = r#"
[sync]
max_page_size = "lots"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail");
    assert!(matches!(errors[0], ConfigError::InvalidType { .. }));
}

#[test]
fn semantic_errors_surface_after_parse() {
    let toml = r#"
[sync]
max_page_size = 0

[retention]
sweep_interval_secs = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2);
    assert!(
        errors
            .iter()
            .all(|e| matches!(e, ConfigError::Validation { .. }))
    );
}

/// Dotted keys (what the env provider produces) override file values.
#[test]
fn dotted_override_wins_over_toml() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: ApertureConfig = Figment::new()
        .merge(Serialized::defaults(ApertureConfig::default()))
        .merge(Toml::string("[retention]\nasset_trash_days = 10\n"))
        .merge(("retention.asset_trash_days", 2))
        .extract()
        .expect("should merge override");

    assert_eq!(config.retention.asset_trash_days, 2);
}

#[test]
fn explicit_path_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aperture.toml");
    std::fs::write(&path, "[storage]\ndatabase_path = \"/var/lib/aperture/a.db\"\n").unwrap();

    let config = load_and_validate_path(&path).expect("file should load");
    assert_eq!(config.storage.database_path, "/var/lib/aperture/a.db");
}
