// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./aperture.toml` > `~/.config/aperture/aperture.toml` >
//! `/etc/aperture/aperture.toml` with environment variable overrides via `APERTURE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ApertureConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/aperture/aperture.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "aperture.toml";

/// Config sections addressable from `APERTURE_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &["log", "storage", "sync", "timeline", "retention"];

/// Path of the per-user config file, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("aperture").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/aperture/aperture.toml` (system-wide)
/// 3. `~/.config/aperture/aperture.toml` (user XDG config)
/// 4. `./aperture.toml` (local directory)
/// 5. `APERTURE_*` environment variables
pub fn load_config() -> Result<ApertureConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ApertureConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ApertureConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ApertureConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ApertureConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ApertureConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config key.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `retention_asset_trash_days` maps to `retention.asset_trash_days`.
pub fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

/// Environment provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores themselves.
fn env_provider() -> Env {
    Env::prefixed("APERTURE_").map(|key| map_env_key(key.as_str()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_at_section_only() {
        assert_eq!(map_env_key("storage_database_path"), "storage.database_path");
        assert_eq!(
            map_env_key("retention_notification_read_min_age_days"),
            "retention.notification_read_min_age_days"
        );
        assert_eq!(map_env_key("sync_max_page_size"), "sync.max_page_size");
        assert_eq!(map_env_key("log_level"), "log.level");
    }

    #[test]
    fn unknown_env_section_is_left_alone() {
        assert_eq!(map_env_key("unrelated"), "unrelated");
        assert_eq!(map_env_key("storagefoo"), "storagefoo");
    }
}
