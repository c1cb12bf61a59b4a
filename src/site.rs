//! Client for the site-snapshot API: the ordered file update feed and the
//! per-file download endpoint.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{error, info};

pub type SiteError = Box<dyn std::error::Error + Send + Sync>;

/// One file update event from the snapshot feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteUpdate {
    pub timestamp: DateTime<Utc>,
    pub path: String,
    pub hash: String,
    pub download_url: String,
}

#[derive(Debug, Deserialize)]
struct SiteUpdatesResponse {
    data: Vec<SiteUpdate>,
}

pub struct SiteClient {
    base_url: String,
    client: reqwest::Client,
}

impl SiteClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Fetches the full file-update event list.
    pub async fn updates(&self) -> Result<Vec<SiteUpdate>, SiteError> {
        let url = format!("{}/site/updates", self.base_url);
        info!(url = %url, "Fetching site update feed");
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            error!(%status, url = %url, "Site update feed request failed");
            return Err(format!("site update feed returned {status}").into());
        }
        let body: SiteUpdatesResponse = resp.json().await?;
        Ok(body.data)
    }

    /// Downloads one file by the relative URL carried in its update event.
    pub async fn download(&self, download_url: &str) -> Result<Vec<u8>, SiteError> {
        let url = format!("{}{}", self.base_url, download_url);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            error!(%status, url = %url, "File download failed");
            return Err(format!("file download returned {status}").into());
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
