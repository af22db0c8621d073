// SPDX-FileCopyrightText: 2026 Aperture Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aperture - asset catalog maintenance daemon.
//!
//! This is the binary entry point: scheduled retention sweeps, one-off
//! sweeps, per-owner statistics, and an environment check.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod serve;
mod shutdown;
mod stats;
mod sweep;

use std::path::PathBuf;
use std::sync::Arc;

use aperture_config::{ApertureConfig, ConfigError};
use aperture_core::{ApertureError, StorageAdapter};
use aperture_storage::SqliteStorage;
use clap::{Parser, Subcommand};

/// Aperture - asset catalog maintenance daemon.
#[derive(Parser, Debug)]
#[command(name = "aperture", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run retention sweeps on a schedule until interrupted.
    Serve,
    /// Run one retention sweep and exit.
    Sweep {
        /// Emit the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print per-type asset counts for an owner.
    Stats {
        owner_id: String,
        /// Count favorites only.
        #[arg(long)]
        favorites: bool,
        /// Count archived assets only.
        #[arg(long)]
        archived: bool,
        /// Count the trash instead of live assets.
        #[arg(long)]
        trashed: bool,
        #[arg(long)]
        json: bool,
    },
    /// Validate configuration and database access.
    Check,
}

fn load_config(path: Option<&PathBuf>) -> Result<ApertureConfig, Vec<ConfigError>> {
    match path {
        Some(path) => aperture_config::load_and_validate_path(path),
        None => aperture_config::load_and_validate(),
    }
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the config.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aperture={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Open the configured database, running pending migrations.
pub(crate) async fn open_storage(config: &ApertureConfig) -> Result<Arc<SqliteStorage>, ApertureError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(Arc::new(storage))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            aperture_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.log.level);

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Sweep { json } => sweep::run_sweep(&config, json).await,
        Commands::Stats {
            owner_id,
            favorites,
            archived,
            trashed,
            json,
        } => {
            let flags = stats::StatsFlags {
                favorites,
                archived,
                trashed,
            };
            stats::run_stats(&config, &owner_id, flags, json).await
        }
        Commands::Check => check::run_check(&config).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
