// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `aperture sweep`: one retention pass.

use aperture_catalog::{Catalog, SweepReport};
use aperture_config::ApertureConfig;
use aperture_core::{ApertureError, StorageAdapter};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SweepOutput {
    notifications_purged: usize,
    assets_purged: usize,
}

impl From<SweepReport> for SweepOutput {
    fn from(report: SweepReport) -> Self {
        Self {
            notifications_purged: report.notifications_purged,
            assets_purged: report.assets_purged,
        }
    }
}

pub async fn run_sweep(config: &ApertureConfig, json: bool) -> Result<(), ApertureError> {
    let storage = crate::open_storage(config).await?;
    let catalog = Catalog::new(storage.clone(), config);
    let report = catalog.retention().sweep(Utc::now()).await?;
    storage.close().await?;

    println!("{}", render(report, json)?);
    Ok(())
}

fn render(report: SweepReport, json: bool) -> Result<String, ApertureError> {
    if json {
        serde_json::to_string_pretty(&SweepOutput::from(report))
            .map_err(|e| ApertureError::Internal(format!("failed to encode report: {e}")))
    } else {
        Ok(format!(
            "purged {} notification(s) and {} trashed asset(s)",
            report.notifications_purged, report.assets_purged
        ))
    }
}
