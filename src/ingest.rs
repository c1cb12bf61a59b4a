//! Envelopes and the ingestion endpoint client.
//!
//! Raw records from the stats API are forwarded unchanged, wrapped in an
//! envelope carrying an integer type tag and the capture timestamp. The
//! [`Ingestor`] trait is the seam between the import pipelines and the
//! network; it is mockable for tests, the concrete [`IngestClient`] POSTs
//! JSON arrays to the internal ingestion service.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use mockall::automock;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

pub type IngestError = Box<dyn std::error::Error + Send + Sync>;

/// Integer tag identifying the kind of record inside an envelope. The values
/// mirror the ingestion service's update-type taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateType {
    Player = 1,
    Game = 4,
}

impl Serialize for UpdateType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Wrapper attached to every raw record before it is forwarded.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: UpdateType,
    pub timestamp: String,
    pub data: Value,
}

impl Envelope {
    /// Wraps a raw record with the given tag and capture time, rendered as
    /// an ISO-8601 UTC string.
    pub fn new(kind: UpdateType, captured_at: DateTime<Utc>, data: Value) -> Self {
        Self {
            kind,
            timestamp: captured_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            data,
        }
    }
}

/// Trait for submitting envelope batches to the ingestion service.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Ingestor: Send + Sync {
    /// Submit a batch of entity updates (player records and the like).
    async fn submit_updates(&self, updates: Vec<Envelope>) -> Result<(), IngestError>;

    /// Submit a batch of game updates.
    async fn submit_game_updates(&self, updates: Vec<Envelope>) -> Result<(), IngestError>;
}

/// Concrete client for the internal ingestion endpoint. Each data kind is
/// tagged with its fixed source identifier via the `source` query parameter.
pub struct IngestClient {
    base_url: String,
    player_source: String,
    game_source: String,
    client: reqwest::Client,
}

impl IngestClient {
    pub fn new(
        base_url: impl Into<String>,
        player_source: impl Into<String>,
        game_source: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            player_source: player_source.into(),
            game_source: game_source.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, path: &str, source: &str, updates: &[Envelope]) -> Result<(), IngestError> {
        let url = format!("{}{}", self.base_url, path);
        info!(url = %url, source, count = updates.len(), "Submitting update batch");
        let resp = self
            .client
            .post(&url)
            .query(&[("source", source)])
            .json(updates)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to decode response body>"));
            error!(%status, url = %url, "Ingestion endpoint rejected batch: {body}");
            return Err(format!("ingestion endpoint returned {status}: {body}").into());
        }
        info!(%status, source, "Batch accepted");
        Ok(())
    }
}

#[async_trait]
impl Ingestor for IngestClient {
    async fn submit_updates(&self, updates: Vec<Envelope>) -> Result<(), IngestError> {
        self.post("/internal/updates", &self.player_source, &updates)
            .await
    }

    async fn submit_game_updates(&self, updates: Vec<Envelope>) -> Result<(), IngestError> {
        self.post("/internal/gameupdates", &self.game_source, &updates)
            .await
    }
}
