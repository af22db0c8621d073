// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Aperture catalog.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use aperture_core::{AssetOrder, RetentionPolicy};
use serde::{Deserialize, Serialize};

/// Top-level Aperture configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApertureConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Client synchronization limits.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Timeline defaults.
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Background retention sweeps.
    #[serde(default)]
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// SQLite storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("aperture").join("catalog.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("catalog.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Largest page a client may request from full or delta sync.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_max_page_size() -> usize {
    1000
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TimelineConfig {
    /// Order applied when a request does not pick one.
    #[serde(default)]
    pub default_order: AssetOrder,
}

/// Retention sweep configuration. Ages are whole days; a record must be
/// strictly older than the threshold to be purged.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionConfig {
    /// Run the sweep on a schedule under `aperture serve`.
    #[serde(default = "default_retention_enabled")]
    pub enabled: bool,

    /// Seconds between scheduled sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    #[serde(default = "default_notification_deleted_days")]
    pub notification_deleted_days: u32,

    #[serde(default = "default_notification_read_days")]
    pub notification_read_days: u32,

    /// Read notifications are kept until they are at least this old.
    #[serde(default = "default_notification_read_min_age_days")]
    pub notification_read_min_age_days: u32,

    #[serde(default = "default_notification_unread_days")]
    pub notification_unread_days: u32,

    /// Trashed assets are hard-deleted after this many days.
    #[serde(default = "default_asset_trash_days")]
    pub asset_trash_days: u32,
}

impl RetentionConfig {
    /// The notification expiry policy described by this section.
    pub fn notification_policy(&self) -> RetentionPolicy {
        RetentionPolicy::notifications(
            i64::from(self.notification_deleted_days),
            i64::from(self.notification_read_days),
            i64::from(self.notification_read_min_age_days),
            i64::from(self.notification_unread_days),
        )
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: default_retention_enabled(),
            sweep_interval_secs: default_sweep_interval_secs(),
            notification_deleted_days: default_notification_deleted_days(),
            notification_read_days: default_notification_read_days(),
            notification_read_min_age_days: default_notification_read_min_age_days(),
            notification_unread_days: default_notification_unread_days(),
            asset_trash_days: default_asset_trash_days(),
        }
    }
}

fn default_retention_enabled() -> bool {
    true
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

fn default_notification_deleted_days() -> u32 {
    3
}

fn default_notification_read_days() -> u32 {
    2
}

fn default_notification_read_min_age_days() -> u32 {
    15
}

fn default_notification_unread_days() -> u32 {
    30
}

fn default_asset_trash_days() -> u32 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ApertureConfig::default();
        assert_eq!(config.log.level, "info");
        assert!(config.storage.wal_mode);
        assert!(config.storage.database_path.ends_with("catalog.db"));
        assert_eq!(config.sync.max_page_size, 1000);
        assert_eq!(config.timeline.default_order, AssetOrder::Desc);
        assert!(config.retention.enabled);
        assert_eq!(config.retention.sweep_interval_secs, 3600);
        assert_eq!(config.retention.asset_trash_days, 30);
    }

    #[test]
    fn notification_policy_has_three_rules() {
        let policy = RetentionConfig::default().notification_policy();
        assert_eq!(policy.rules().len(), 3);
        assert_eq!(policy, RetentionPolicy::notifications(3, 2, 15, 30));
    }
}
