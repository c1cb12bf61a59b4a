//! Loads the optional YAML configuration into typed sections.
//!
//! Every field has a default matching the live deployment, so all
//! subcommands run with no config file at all; a file only needs the keys it
//! overrides. This is the only place untrusted YAML is parsed.

use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;
use tracing::{error, info};

use crate::importers::SeasonDays;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub stats: StatsSection,
    pub ingest: IngestSection,
    pub games: GamesSection,
    pub site: SiteSection,
}

/// Public game-statistics API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatsSection {
    pub base_url: String,
}

impl Default for StatsSection {
    fn default() -> Self {
        Self {
            base_url: "https://www.blaseball.com".to_string(),
        }
    }
}

/// Internal ingestion endpoint and the fixed source identifiers the two data
/// kinds are tagged with.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestSection {
    pub base_url: String,
    pub player_source: String,
    pub game_source: String,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4011".to_string(),
            player_source: "c57920eb-dcca-438b-bdc6-b0ca3deb0368".to_string(),
            game_source: "a4715d03-d092-4ef4-a3cc-4a19776a6fd5".to_string(),
        }
    }
}

/// Season table for the historical game import.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GamesSection {
    pub seasons: Vec<SeasonDays>,
}

impl Default for GamesSection {
    fn default() -> Self {
        Self {
            seasons: vec![
                SeasonDays {
                    season: 0,
                    days: 115,
                },
                SeasonDays { season: 1, days: 99 },
            ],
        }
    }
}

/// Site-snapshot API and rebuild settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub base_url: String,
    pub branch: String,
    /// Formatter shell line; `{file}` receives the filename. Set to `none`
    /// to commit files unformatted.
    pub formatter: String,
    pub fetch_limit: usize,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            base_url: "https://api.sibr.dev/chronicler/v1".to_string(),
            branch: "main".to_string(),
            formatter: "npx prettier --stdin-filepath {file}".to_string(),
            fetch_limit: 8,
        }
    }
}

impl SiteSection {
    pub fn formatter_command(&self) -> Option<&str> {
        match self.formatter.trim() {
            "" | "none" => None,
            command => Some(command),
        }
    }
}

/// Loads the config file when one is given, built-in defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        info!("No config file given, using built-in defaults");
        return Ok(Config::default());
    };

    info!(config_path = ?path, "Loading configuration from file");
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(anyhow::anyhow!("Failed to read config file {path:?}: {e}"));
        }
    };

    match serde_yaml::from_str(&content) {
        Ok(config) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(config)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}
