// Vertex AI implementation of ContentGenerator.
//
// Calls `streamGenerateContent` with `alt=sse` and turns the event stream
// into text fragments. The model may be a publisher model ("gemini-2.5-flash"),
// a tuned-model endpoint id ("1234567890") or a full resource path.
//
// API docs: https://cloud.google.com/vertex-ai/generative-ai/docs/model-reference/inference

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sse::SseDecoder;
use super::traits::{
    ClassificationRequest, ContentGenerator, FragmentStream, GeneratorFactory, SAFETY_CATEGORIES,
};
use crate::config::Config;

enum Credential {
    Bearer(String),
    ApiKey(String),
}

/// Streaming Gemini client bound to one project and location.
pub struct VertexClient {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    location: String,
    model_endpoint: String,
    credential: Credential,
}

impl VertexClient {
    /// Initialize a client from config.
    ///
    /// Fails when the project, location or credential is missing. The model
    /// endpoint is checked per call instead, so a bad endpoint shows up as a
    /// per-post error rather than a failed run.
    pub fn new(config: &Config) -> Result<Self> {
        config.require_vertex()?;

        let client = reqwest::Client::builder()
            .user_agent("trustcheck/0.1 (misinformation-screening)")
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let credential = if config.google_access_token.is_empty() {
            Credential::ApiKey(config.google_api_key.clone())
        } else {
            Credential::Bearer(config.google_access_token.clone())
        };

        Ok(Self {
            client,
            base_url: default_base_url(&config.location),
            project_id: config.project_id.clone(),
            location: config.location.clone(),
            model_endpoint: config.model_endpoint.clone(),
            credential,
        })
    }

    /// Point the client at a different API host (regional proxy, test server).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Full resource name of the model this client talks to.
    pub fn resource_path(&self) -> Result<String> {
        resource_path(&self.project_id, &self.location, &self.model_endpoint)
    }

    fn stream_url(&self) -> Result<String> {
        Ok(format!(
            "{}/{}:streamGenerateContent",
            self.base_url,
            self.resource_path()?
        ))
    }
}

/// Regional API host for a location; `global` has no regional prefix.
pub fn default_base_url(location: &str) -> String {
    if location.is_empty() || location == "global" {
        "https://aiplatform.googleapis.com/v1".to_string()
    } else {
        format!("https://{location}-aiplatform.googleapis.com/v1")
    }
}

/// Resolve MODEL_ENDPOINT to a Vertex resource path.
pub fn resource_path(project_id: &str, location: &str, model_endpoint: &str) -> Result<String> {
    let model = model_endpoint.trim().trim_matches('/');
    if model.is_empty() {
        anyhow::bail!("MODEL_ENDPOINT not set. Add it to your .env file.");
    }

    if model.starts_with("projects/") {
        return Ok(model.to_string());
    }
    if model.chars().all(|c| c.is_ascii_digit()) {
        return Ok(format!(
            "projects/{project_id}/locations/{location}/endpoints/{model}"
        ));
    }
    let name = model.strip_prefix("models/").unwrap_or(model);
    Ok(format!(
        "projects/{project_id}/locations/{location}/publishers/google/models/{name}"
    ))
}

#[async_trait]
impl ContentGenerator for VertexClient {
    async fn stream_generate(&self, request: &ClassificationRequest) -> Result<FragmentStream> {
        let url = self.stream_url()?;
        let body = GenerateContentRequest::from_request(request);

        debug!(url = %url, "Vertex AI streamGenerateContent request");

        let mut builder = self.client.post(&url).query(&[("alt", "sse")]);
        builder = match &self.credential {
            Credential::Bearer(token) => builder.bearer_auth(token),
            Credential::ApiKey(key) => builder.header("x-goog-api-key", key),
        };

        let response = builder
            .json(&body)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to call Vertex AI")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Vertex AI returned {}: {}", status, body);
        }

        Ok(fragment_stream(response))
    }
}

struct StreamState {
    response: reqwest::Response,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    done: bool,
}

fn fragment_stream(response: reqwest::Response) -> FragmentStream {
    let state = StreamState {
        response,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        done: false,
    };

    stream::try_unfold(state, next_fragment).boxed()
}

async fn next_fragment(mut state: StreamState) -> Result<Option<(String, StreamState)>> {
    loop {
        if let Some(payload) = state.pending.pop_front() {
            let text = chunk_text(&payload)?;
            return Ok(Some((text, state)));
        }
        if state.done {
            return Ok(None);
        }
        match state
            .response
            .chunk()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to read Vertex AI stream")?
        {
            Some(bytes) => {
                let payloads = state.decoder.push(&bytes);
                state.pending.extend(payloads);
            }
            None => {
                let payloads = state.decoder.finish();
                state.pending.extend(payloads);
                state.done = true;
            }
        }
    }
}

/// Text carried by one streamed GenerateContentResponse.
///
/// Concatenates the first candidate's non-thought parts. A chunk with no
/// text (e.g. the final usage-metadata chunk) yields an empty string.
pub fn chunk_text(payload: &str) -> Result<String> {
    let chunk: StreamChunk =
        serde_json::from_str(payload).context("Failed to parse Vertex AI stream chunk")?;

    if let Some(error) = chunk.error {
        anyhow::bail!(
            "Vertex AI stream error {}: {}",
            error.status.unwrap_or_default(),
            error.message
        );
    }

    if let Some(reason) = chunk.prompt_feedback.and_then(|f| f.block_reason) {
        anyhow::bail!("Prompt blocked by Vertex AI: {reason}");
    }

    let text = chunk
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    Ok(text)
}

/// `GeneratorFactory` that builds a fresh `VertexClient` from config on each run.
pub struct VertexFactory {
    config: Arc<Config>,
}

impl VertexFactory {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

impl GeneratorFactory for VertexFactory {
    fn connect(&self) -> Result<Arc<dyn ContentGenerator>> {
        let client = VertexClient::new(&self.config)?;
        Ok(Arc::new(client))
    }
}

// --- Vertex AI request/response types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: SystemInstruction<'a>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting<'a>>,
}

impl<'a> GenerateContentRequest<'a> {
    pub fn from_request(request: &'a ClassificationRequest) -> Self {
        let settings = &request.settings;
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: &request.text,
                }],
            }],
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: request.system_instruction,
                }],
            },
            generation_config: GenerationConfig {
                temperature: settings.temperature,
                top_p: settings.top_p,
                seed: settings.seed,
                max_output_tokens: settings.max_output_tokens,
                thinking_config: ThinkingConfig {
                    thinking_budget: settings.thinking_budget,
                },
            },
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: settings.safety_threshold,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    seed: i32,
    max_output_tokens: u32,
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Serialize)]
struct SafetySetting<'a> {
    category: &'a str,
    threshold: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
    status: Option<String>,
}
