// Post fetching: one bounded page of a user's recent posts.
//
// Fetch failures are absorbed here: a broken token, a network error or an
// odd response body all collapse to "no posts", which the pipeline answers
// with its sample fallback. Nothing in this module returns an error to the
// pipeline.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::client::GraphClient;
use crate::output::truncate_chars;

/// Fields requested from the posts edge. Only `message` is kept.
const POST_FIELDS: &str = "message,created_time";

/// One page of the `{user_id}/posts` edge.
#[derive(Debug, Deserialize)]
pub struct PostsPage {
    pub data: Option<Vec<GraphPost>>,
}

/// A single post entry. Photo-only posts have no `message`.
#[derive(Debug, Deserialize)]
pub struct GraphPost {
    pub message: Option<String>,
    pub created_time: Option<String>,
}

/// Anything that can hand the pipeline a list of post texts.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch up to `limit` recent post texts, newest first. Never fails:
    /// an unreachable source yields an empty list.
    async fn fetch_posts(&self, limit: usize) -> Vec<String>;
}

/// `PostSource` backed by the Graph API for one user.
pub struct GraphPostSource {
    client: GraphClient,
    user_id: String,
    access_token: String,
}

impl GraphPostSource {
    pub fn new(client: GraphClient, user_id: String, access_token: String) -> Self {
        Self {
            client,
            user_id,
            access_token,
        }
    }
}

#[async_trait]
impl PostSource for GraphPostSource {
    async fn fetch_posts(&self, limit: usize) -> Vec<String> {
        fetch_posts(&self.client, &self.user_id, &self.access_token, limit).await
    }
}

/// Fetch recent post messages for `user_id`.
///
/// Returns the `message` of every entry that has one, in the order the Graph
/// API returned them. Any failure is logged and turned into an empty list.
pub async fn fetch_posts(
    client: &GraphClient,
    user_id: &str,
    access_token: &str,
    limit: usize,
) -> Vec<String> {
    match try_fetch_posts(client, user_id, access_token, limit).await {
        Ok(posts) => posts,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Error fetching Facebook posts");
            Vec::new()
        }
    }
}

async fn try_fetch_posts(
    client: &GraphClient,
    user_id: &str,
    access_token: &str,
    limit: usize,
) -> Result<Vec<String>> {
    let limit = limit.to_string();
    let path = format!("{user_id}/posts");

    let response = client
        .get(
            &path,
            &[
                ("access_token", access_token),
                ("fields", POST_FIELDS),
                ("limit", &limit),
            ],
        )
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(status = status.as_u16(), body = %body, "Graph API returned an error status");
        anyhow::bail!("Graph API returned {status}");
    }

    let body = response
        .text()
        .await
        .context("Failed to read Graph API response body")?;
    debug!(body = %body, "Graph API response");

    let page: PostsPage =
        serde_json::from_str(&body).context("Failed to parse Graph API response")?;

    let posts = extract_messages(page);

    info!(count = posts.len(), "Fetched posts from Facebook");
    for (i, post) in posts.iter().enumerate() {
        debug!("Post {}: {}", i + 1, truncate_chars(post, 100));
    }

    Ok(posts)
}

/// Pull message texts out of a posts page, skipping entries without one.
///
/// A page with no `data` key counts as "no posts found", not as an error.
pub fn extract_messages(page: PostsPage) -> Vec<String> {
    let Some(data) = page.data else {
        warn!("No posts found in response");
        return Vec::new();
    };

    data.into_iter().filter_map(|post| post.message).collect()
}
