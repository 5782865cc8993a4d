// Graph API client: token-in-query GETs over reqwest.
//
// The Graph API takes the access token as a query parameter, so there is no
// session state here: just a base URL and a configured HTTP client.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

/// HTTP client for the Facebook Graph API.
pub struct GraphClient {
    client: reqwest::Client,
    base_url: String,
}

impl GraphClient {
    /// Create a new Graph API client pointing at the given versioned base URL.
    ///
    /// Pass a different URL for testing or to pin another API version.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("trustcheck/0.1 (misinformation-screening)")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a GET for `{base}/{path}` with the given query pairs.
    ///
    /// Returns the raw response so callers can inspect status and body
    /// themselves; only transport failures become errors here. Errors drop
    /// the request URL, which carries the access token.
    pub async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        debug!(path = path, "Graph API GET request");

        self.client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("Graph API request failed: {path}"))
    }
}
