// Per-post classification: one streamed model call turned into a result record.
//
// A failed call never escapes this module: it becomes a Prediction::Error
// with the elapsed time up to the failure, so the batch keeps going.

use std::fmt;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use futures::StreamExt;
use serde::{Serialize, Serializer};
use tracing::{error, info};

use super::traits::{ClassificationRequest, ContentGenerator};
use crate::output::truncate_chars;

/// The model's verdict on a post, or the reason there isn't one.
///
/// Labels are free text: whatever the model says, trimmed, is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prediction {
    Label(String),
    Error(String),
}

impl Prediction {
    pub fn is_error(&self) -> bool {
        matches!(self, Prediction::Error(_))
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Label(label) => f.write_str(label),
            Prediction::Error(message) => write!(f, "Error: {message}"),
        }
    }
}

/// Serialized as a bare string: the label, or `"Error: <message>"`.
impl Serialize for Prediction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One classified post, as written to the JSONL file and the HTTP response.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceResult {
    pub post: String,
    pub prediction: Prediction,
    /// ISO-8601 creation instant (local time with offset).
    pub timestamp: String,
    /// Wall-clock milliseconds spent on the model call, 2 decimal places.
    #[serde(rename = "detectionTime")]
    pub detection_time: f64,
}

impl InferenceResult {
    pub fn new(post: &str, prediction: Prediction, elapsed: Duration) -> Self {
        Self::with_detection_time(post, prediction, elapsed_ms(elapsed))
    }

    pub fn with_detection_time(post: &str, prediction: Prediction, detection_time: f64) -> Self {
        Self {
            post: post.to_string(),
            prediction,
            timestamp: Local::now().to_rfc3339(),
            detection_time,
        }
    }
}

/// Milliseconds rounded to 2 decimal places.
pub fn elapsed_ms(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}

/// Classify one post. Always returns a result; failures land in `prediction`.
pub async fn classify(generator: &dyn ContentGenerator, post: &str) -> InferenceResult {
    let start = Instant::now();
    let outcome = collect_label(generator, post).await;
    let elapsed = start.elapsed();

    let prediction = match outcome {
        Ok(label) => {
            info!(
                post = %truncate_chars(post, 50),
                prediction = %label,
                time_ms = elapsed_ms(elapsed),
                "Processed post"
            );
            Prediction::Label(label)
        }
        Err(e) => {
            let message = format!("{e:#}");
            error!(error = %message, "Error running inference on post");
            Prediction::Error(message)
        }
    };

    InferenceResult::new(post, prediction, elapsed)
}

/// Stream the reply and join every fragment; the trimmed whole is the label.
async fn collect_label(generator: &dyn ContentGenerator, post: &str) -> Result<String> {
    let request = ClassificationRequest::for_post(post);
    let mut fragments = generator.stream_generate(&request).await?;

    let mut response = String::new();
    while let Some(fragment) = fragments.next().await {
        response.push_str(&fragment?);
    }

    let label = response.trim();
    if label.is_empty() {
        anyhow::bail!("Model returned an empty response");
    }
    Ok(label.to_string())
}
