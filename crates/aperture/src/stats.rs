// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `aperture stats`: per-type asset counts for one owner.

use aperture_catalog::Catalog;
use aperture_config::ApertureConfig;
use aperture_core::{ApertureError, AssetStats, AssetStatsOptions, StorageAdapter};

/// Which flag filters to apply. Unset flags do not filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsFlags {
    pub favorites: bool,
    pub archived: bool,
    pub trashed: bool,
}

impl From<StatsFlags> for AssetStatsOptions {
    fn from(flags: StatsFlags) -> Self {
        Self {
            is_favorite: flags.favorites.then_some(true),
            is_archived: flags.archived.then_some(true),
            is_trashed: flags.trashed.then_some(true),
        }
    }
}

pub async fn run_stats(
    config: &ApertureConfig,
    owner_id: &str,
    flags: StatsFlags,
    json: bool,
) -> Result<(), ApertureError> {
    let storage = crate::open_storage(config).await?;
    let catalog = Catalog::new(storage.clone(), config);
    let stats = catalog.statistics(owner_id, &flags.into()).await?;
    storage.close().await?;

    if json {
        let out = serde_json::to_string_pretty(&stats)
            .map_err(|e| ApertureError::Internal(format!("failed to encode stats: {e}")))?;
        println!("{out}");
    } else {
        println!("{}", render(owner_id, &stats));
    }
    Ok(())
}

fn render(owner_id: &str, stats: &AssetStats) -> String {
    format!(
        "{owner_id}: {} image(s), {} video(s), {} total",
        stats.images,
        stats.videos,
        stats.total()
    )
}
