//! Client for the public game-statistics API: the tribute list, the batch
//! player lookup, and the per-day game lookup.

use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

pub type StatsError = Box<dyn std::error::Error + Send + Sync>;

/// A tribute entry; only the player id is consumed downstream, other fields
/// on the wire are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tribute {
    pub player_id: String,
}

pub struct StatsClient {
    base_url: String,
    client: reqwest::Client,
}

impl StatsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Fetches the current tribute list.
    pub async fn tributes(&self) -> Result<Vec<Tribute>, StatsError> {
        let url = format!("{}/api/getTribute", self.base_url);
        info!(url = %url, "Fetching tribute list");
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            error!(%status, url = %url, "Tribute request failed");
            return Err(format!("tribute request returned {status}").into());
        }
        Ok(resp.json().await?)
    }

    /// Fetches full player records for the given ids in one batch request.
    pub async fn players(&self, ids: &[String]) -> Result<Vec<Value>, StatsError> {
        let url = format!("{}/database/players", self.base_url);
        info!(url = %url, count = ids.len(), "Fetching player records");
        let resp = self
            .client
            .get(&url)
            .query(&[("ids", ids.join(","))])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            error!(%status, url = %url, "Player request failed");
            return Err(format!("player request returned {status}").into());
        }
        Ok(resp.json().await?)
    }

    /// Fetches the game records for one day of one season.
    pub async fn games(&self, season: u32, day: u32) -> Result<Vec<Value>, StatsError> {
        let url = format!("{}/database/games", self.base_url);
        info!(url = %url, season, day, "Fetching games");
        let resp = self
            .client
            .get(&url)
            .query(&[("season", season.to_string()), ("day", day.to_string())])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            error!(%status, url = %url, season, day, "Game request failed");
            return Err(format!("game request returned {status}").into());
        }
        Ok(resp.json().await?)
    }
}
