use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Default Graph API base (versioned).
pub const DEFAULT_GRAPH_API_URL: &str = "https://graph.facebook.com/v20.0";

/// Posts requested per run when POST_LIMIT is unset.
pub const DEFAULT_POST_LIMIT: usize = 10;

/// Per-call timeout for remote requests when REQUEST_TIMEOUT_SECS is unset.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy. Missing values are
/// tolerated here: they surface later as an empty fetch or a failed
/// model-client initialization, never as a startup error.
#[derive(Debug, Clone)]
pub struct Config {
    /// Graph API access token (pre-obtained, passed through as-is)
    pub fb_access_token: String,
    /// Graph API user id whose posts are screened
    pub fb_user_id: String,
    /// Graph API base URL, including the version segment
    pub graph_api_url: String,
    /// How many posts to request per run
    pub post_limit: usize,
    /// Vertex AI express-mode API key (used when no bearer token is set)
    pub google_api_key: String,
    /// OAuth bearer token for Vertex AI (e.g. from `gcloud auth print-access-token`)
    pub google_access_token: String,
    pub project_id: String,
    pub location: String,
    /// Model name, tuned-endpoint id, or full `projects/...` resource path
    pub model_endpoint: String,
    /// Directory that receives the `inference_results_*.jsonl` files
    pub output_dir: PathBuf,
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `load` uses the process
    /// environment; tests pass a map so nothing global is touched.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();

        let post_limit = match lookup("POST_LIMIT") {
            Some(raw) if !raw.trim().is_empty() => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => anyhow::bail!("POST_LIMIT must be a positive integer, got {raw:?}"),
            },
            _ => DEFAULT_POST_LIMIT,
        };

        let request_timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<u64>().with_context(|| {
                format!("REQUEST_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}")
            })?,
            _ => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            fb_access_token: get("FB_ACCESS_TOKEN"),
            fb_user_id: get("FB_USER_ID"),
            graph_api_url: lookup("GRAPH_API_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_GRAPH_API_URL.to_string()),
            post_limit,
            google_api_key: get("GOOGLE_API_KEY"),
            google_access_token: get("GOOGLE_ACCESS_TOKEN"),
            project_id: get("PROJECT_ID"),
            location: get("LOCATION"),
            model_endpoint: get("MODEL_ENDPOINT"),
            output_dir: lookup("OUTPUT_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            request_timeout_secs,
        })
    }

    /// Check that the Vertex AI project, location and a credential are configured.
    /// Called when a model client is initialized; failure is fatal to that request only.
    pub fn require_vertex(&self) -> Result<()> {
        if self.project_id.is_empty() {
            anyhow::bail!("PROJECT_ID not set. Add it to your .env file.");
        }
        if self.location.is_empty() {
            anyhow::bail!("LOCATION not set. Add it to your .env file.");
        }
        if self.google_access_token.is_empty() && self.google_api_key.is_empty() {
            anyhow::bail!(
                "No Vertex AI credential found. Set GOOGLE_ACCESS_TOKEN or GOOGLE_API_KEY."
            );
        }
        Ok(())
    }

    /// Whether the Graph API user id and token are both present.
    pub fn has_graph_credentials(&self) -> bool {
        !self.fb_user_id.is_empty() && !self.fb_access_token.is_empty()
    }
}
