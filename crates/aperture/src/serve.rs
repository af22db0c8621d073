// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `aperture serve`: scheduled retention sweeps until a shutdown signal.

use std::time::Duration;

use aperture_catalog::Catalog;
use aperture_config::ApertureConfig;
use aperture_core::{ApertureError, PluginAdapter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::shutdown::install_signal_handler;

pub async fn run_serve(config: ApertureConfig) -> Result<(), ApertureError> {
    info!("starting aperture serve");
    let cancel = install_signal_handler();
    serve_until(config, cancel).await
}

/// Serve until `cancel` fires, then flush storage.
pub(crate) async fn serve_until(
    config: ApertureConfig,
    cancel: CancellationToken,
) -> Result<(), ApertureError> {
    let storage = crate::open_storage(&config).await?;
    info!(path = %config.storage.database_path, "catalog storage ready");
    let catalog = Catalog::new(storage.clone(), &config);

    let sweeper = if config.retention.enabled {
        let interval = Duration::from_secs(config.retention.sweep_interval_secs);
        info!(
            interval_secs = config.retention.sweep_interval_secs,
            asset_trash_days = config.retention.asset_trash_days,
            "retention sweeps scheduled"
        );
        Some(catalog.retention().clone().spawn(interval, cancel.clone()))
    } else {
        warn!("retention disabled; serve will idle until shutdown");
        None
    };

    cancel.cancelled().await;

    if let Some(handle) = sweeper {
        if let Err(e) = handle.await {
            warn!(error = %e, "retention task ended abnormally");
        }
    }
    storage.shutdown().await?;
    log_heap_usage();
    info!("aperture serve stopped");
    Ok(())
}

/// Jemalloc heap figures at shutdown; stats need an epoch advance to refresh.
#[cfg(not(target_env = "msvc"))]
fn log_heap_usage() {
    let _ = tikv_jemalloc_ctl::epoch::advance();
    let allocated = tikv_jemalloc_ctl::stats::allocated::read().unwrap_or(0);
    let resident = tikv_jemalloc_ctl::stats::resident::read().unwrap_or(0);
    debug!(allocated, resident, "heap usage at shutdown");
}

#[cfg(target_env = "msvc")]
fn log_heap_usage() {}

#[cfg(test)]
mod tests {
    use super::*;
    use aperture_config::model::StorageConfig;

    #[tokio::test]
    async fn serve_stops_when_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ApertureConfig::default();
        config.storage = StorageConfig {
            database_path: dir.path().join("serve.db").to_str().unwrap().to_string(),
            wal_mode: true,
        };
        config.retention.sweep_interval_secs = 1;

        let cancel = CancellationToken::new();
        let task = tokio::spawn(serve_until(config, cancel.clone()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        task.await.unwrap().unwrap();
        assert!(dir.path().join("serve.db").exists());
    }
}
