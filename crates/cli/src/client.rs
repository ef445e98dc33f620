//! HTTP client for the air-quality feed API

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Transport-level failures talking to the feed provider
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request URL (and with it the token) is stripped before wrapping
    #[error("failed to reach air-quality provider: {0}")]
    Transport(reqwest::Error),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("provider response is not valid JSON: {0}")]
    Decode(String),

    #[error("cannot build feed URL for `{0}`")]
    InvalidCity(String),
}

/// Client for the city feed endpoint
pub struct FeedClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl FetchError {
    fn transport(error: reqwest::Error) -> Self {
        FetchError::Transport(error.without_url())
    }
}

impl FeedClient {
    /// Create a new feed client
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self {
            client,
            base_url,
            token: token.to_string(),
        })
    }

    /// URL of the feed for `city`, without the token
    fn feed_url(&self, city: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidCity(city.to_string()))?
            .pop_if_empty()
            .push("feed")
            .push(city)
            .push("");
        Ok(url)
    }

    /// Fetch the raw feed payload for a city
    pub async fn fetch_feed(&self, city: &str) -> Result<Value, FetchError> {
        let url = self.feed_url(city)?;
        debug!(url = %url, "Requesting city feed");

        let response = self
            .client
            .get(url)
            .query(&[("token", self.token.as_str())])
            .send()
            .await
            .map_err(FetchError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let text = response.text().await.map_err(FetchError::transport)?;
        serde_json::from_str(&text).map_err(|e| FetchError::Decode(e.to_string()))
    }
}
