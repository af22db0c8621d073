// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `aperture check`: confirm the configured database is usable.
//!
//! Configuration has already been loaded and validated by the time this
//! runs; a config failure exits before reaching here.

use std::path::Path;
use std::time::{Duration, Instant};

use aperture_config::ApertureConfig;
use aperture_core::{ApertureError, HealthStatus, PluginAdapter, StorageAdapter};

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

pub async fn run_check(config: &ApertureConfig) -> Result<(), ApertureError> {
    let results = vec![
        CheckResult {
            name: "Configuration".to_string(),
            status: CheckStatus::Pass,
            message: "valid".to_string(),
            duration: Duration::ZERO,
        },
        check_database(config).await,
    ];

    println!();
    println!("  aperture check");
    println!("  {}", "-".repeat(50));
    let mut failed = 0;
    for result in &results {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => {
                failed += 1;
                "[FAIL]"
            }
        };
        println!(
            "    {tag} {:<20} {} ({}ms)",
            result.name,
            result.message,
            result.duration.as_millis()
        );
    }
    println!();

    if failed > 0 {
        return Err(ApertureError::Internal(format!("{failed} check(s) failed")));
    }
    println!("  All checks passed.");
    Ok(())
}

/// Open the database (creating and migrating it if needed) and ping it.
async fn check_database(config: &ApertureConfig) -> CheckResult {
    let start = Instant::now();
    let existed = Path::new(&config.storage.database_path).exists();
    let outcome = async {
        let storage = crate::open_storage(config).await?;
        let health = storage.health_check().await?;
        storage.close().await?;
        Ok::<_, ApertureError>(health)
    }
    .await;

    let (status, message) = match outcome {
        Ok(HealthStatus::Healthy) if existed => (CheckStatus::Pass, "connected".to_string()),
        Ok(HealthStatus::Healthy) => (
            CheckStatus::Warn,
            format!("created new database at {}", config.storage.database_path),
        ),
        Ok(HealthStatus::Degraded(reason)) => (CheckStatus::Warn, reason),
        Ok(HealthStatus::Unhealthy(reason)) => (CheckStatus::Fail, reason),
        Err(e) => (CheckStatus::Fail, e.to_string()),
    };
    CheckResult {
        name: "Database".to_string(),
        status,
        message,
        duration: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aperture_config::model::StorageConfig;

    fn config_at(path: &Path) -> ApertureConfig {
        let mut config = ApertureConfig::default();
        config.storage = StorageConfig {
            database_path: path.to_str().unwrap().to_string(),
            wal_mode: true,
        };
        config
    }

    #[tokio::test]
    async fn fresh_database_warns_then_passes() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(&dir.path().join("check.db"));

        let first = check_database(&config).await;
        assert_eq!(first.status, CheckStatus::Warn);
        let second = check_database(&config).await;
        assert_eq!(second.status, CheckStatus::Pass);
        run_check(&config).await.unwrap();
    }

    #[tokio::test]
    async fn unusable_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();
        let config = config_at(&blocker.join("catalog.db"));

        let result = check_database(&config).await;
        assert_eq!(result.status, CheckStatus::Fail);
        assert!(run_check(&config).await.is_err());
    }
}
