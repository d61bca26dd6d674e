//! Remote feed service adapter

use crate::{normalize, FeedClient, IngestError, IngestResult, RawReading};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use telem_core::TimePoint;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://io.adafruit.com/api/v2";
const KEY_HEADER: &str = "X-AIO-Key";

/// Feed service credentials, loaded from a TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub key: String,
}

impl Credentials {
    /// Load credentials from `path`, defaulting to `~/.auth/telemetry.toml`.
    pub fn load(path: Option<&Path>) -> IngestResult<Self> {
        let path: PathBuf = match path {
            Some(p) => p.to_path_buf(),
            None => dirs::home_dir()
                .ok_or_else(|| IngestError::Credentials("no home directory".into()))?
                .join(".auth")
                .join("telemetry.toml"),
        };
        let text = std::fs::read_to_string(&path)?;
        toml::from_str(&text).map_err(|e| IngestError::Credentials(e.to_string()))
    }
}

/// HTTP client for the hosted feed service
pub struct HttpFeedClient {
    base_url: String,
    credentials: Credentials,
    http: reqwest::Client,
}

impl HttpFeedClient {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch(&self, feed: &str, max_points: Option<u32>) -> IngestResult<Vec<RawReading>> {
        let url = format!(
            "{}/{}/feeds/{}/data",
            self.base_url, self.credentials.username, feed
        );

        let mut request = self.http.get(&url).header(KEY_HEADER, &self.credentials.key);
        if let Some(limit) = max_points {
            request = request.query(&[("limit", limit)]);
        }

        let mut readings: Vec<RawReading> = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // The service returns newest data first.
        readings.reverse();

        debug!(feed, count = readings.len(), "fetched feed data");
        Ok(readings)
    }
}

/// Fetch a feed and normalize it in one step.
pub async fn fetch_points(
    client: &dyn FeedClient,
    feed: &str,
    max_points: Option<u32>,
    timezone: &str,
) -> IngestResult<Vec<TimePoint>> {
    let readings = client.fetch(feed, max_points).await?;
    normalize(&readings, timezone)
}
