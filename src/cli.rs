//! CLI glue: command parsing, wiring configuration into the pipelines, and
//! the async entrypoint shared by `main()` and integration tests. All
//! business logic lives in the pipeline modules.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::importers;
use crate::ingest::IngestClient;
use crate::load_config::load_config;
use crate::site::SiteClient;
use crate::site_history::{self, RebuildOptions};
use crate::stats::StatsClient;

/// CLI for stats-backfill: one-off archive importers and site history
/// reconstruction.
#[derive(Parser)]
#[clap(
    name = "stats-backfill",
    version,
    about = "Fetch game-stats records into the archive and rebuild the site's git history"
)]
pub struct Cli {
    /// Path to a YAML config file; built-in defaults are used when omitted
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import the current tribute player records into the archive
    ImportPlayers,
    /// Import historical game records season by season
    ImportGames,
    /// Rebuild the chronological git history of the site's static assets
    SiteHistory {
        /// Target repository path (initialized if absent)
        repo: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::ImportPlayers => {
            info!(command = "import-players", "Starting player import");
            let stats = StatsClient::new(&config.stats.base_url);
            let ingestor = IngestClient::new(
                &config.ingest.base_url,
                &config.ingest.player_source,
                &config.ingest.game_source,
            );
            let report = importers::import_players(&stats, &ingestor)
                .await
                .map_err(anyhow::Error::msg)?;
            info!(
                records = report.records,
                batches = report.batches,
                "Player import complete"
            );
        }
        Commands::ImportGames => {
            info!(command = "import-games", "Starting game import");
            let stats = StatsClient::new(&config.stats.base_url);
            let ingestor = IngestClient::new(
                &config.ingest.base_url,
                &config.ingest.player_source,
                &config.ingest.game_source,
            );
            let report = importers::import_games(&stats, &ingestor, &config.games.seasons)
                .await
                .map_err(anyhow::Error::msg)?;
            info!(
                records = report.records,
                batches = report.batches,
                "Game import complete"
            );
        }
        Commands::SiteHistory { repo } => {
            info!(command = "site-history", repo = %repo.display(), "Starting site history rebuild");
            let site = SiteClient::new(&config.site.base_url);
            let options = RebuildOptions {
                branch: config.site.branch.clone(),
                formatter: config.site.formatter_command().map(str::to_string),
                fetch_limit: config.site.fetch_limit,
            };
            let report = site_history::rebuild(&site, &repo, &options)
                .await
                .map_err(anyhow::Error::msg)?;
            info!(
                commits = report.commits,
                files = report.files_written,
                "Site history rebuild complete"
            );
        }
    }

    Ok(())
}
