// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and positive intervals.

use crate::diagnostic::ConfigError;
use crate::model::ApertureConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ApertureConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.log.level.trim().to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` must be one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.sync.max_page_size == 0 {
        errors.push(ConfigError::Validation {
            message: "sync.max_page_size must be greater than 0".to_string(),
        });
    }

    let retention = &config.retention;
    if retention.sweep_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "retention.sweep_interval_secs must be greater than 0".to_string(),
        });
    }

    let day_counts = [
        ("notification_deleted_days", retention.notification_deleted_days),
        ("notification_read_days", retention.notification_read_days),
        (
            "notification_read_min_age_days",
            retention.notification_read_min_age_days,
        ),
        ("notification_unread_days", retention.notification_unread_days),
        ("asset_trash_days", retention.asset_trash_days),
    ];
    for (key, days) in day_counts {
        if days == 0 {
            errors.push(ConfigError::Validation {
                message: format!("retention.{key} must be at least 1 day"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(errors: &[ConfigError]) -> Vec<String> {
        errors.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn default_config_validates() {
        let config = ApertureConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = ApertureConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))
        ));
    }

    #[test]
    fn zero_page_size_fails_validation() {
        let mut config = ApertureConfig::default();
        config.sync.max_page_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors)[0].contains("max_page_size"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = ApertureConfig::default();
        config.log.level = "loud".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = ApertureConfig::default();
        config.retention.sweep_interval_secs = 0;
        config.retention.asset_trash_days = 0;
        config.retention.notification_unread_days = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
