// Analysis pipeline: connect model -> fetch posts -> classify -> batch.
//
// One run per trigger (HTTP request or CLI invocation):
// 1. Build a fresh model client. Failure here ends the run with an error.
// 2. Fetch recent posts. Zero posts -> the fixed sample batch.
// 3. Classify posts one at a time, in fetch order.
// 4. Return the batch; the caller decides where it goes.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::facebook::posts::PostSource;
use crate::inference::classifier::{self, InferenceResult, Prediction};
use crate::inference::traits::GeneratorFactory;
use crate::output::truncate_chars;

/// Post text of the sample result served when no posts are available.
pub const SAMPLE_POST: &str = "Uchaguzi mwezi wa kumi.";
pub const SAMPLE_PREDICTION: &str = "Trustworthy";
pub const SAMPLE_DETECTION_TIME: f64 = 150.5;

/// Where a batch's results came from. Not part of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOrigin {
    /// Classified from fetched posts.
    Live,
    /// The fixed sample set used when nothing was fetched.
    Sample,
}

/// The ordered results of one pipeline run.
#[derive(Debug, Clone)]
pub struct ResultBatch {
    pub results: Vec<InferenceResult>,
    pub origin: BatchOrigin,
}

impl ResultBatch {
    pub fn is_sample(&self) -> bool {
        self.origin == BatchOrigin::Sample
    }
}

/// The batch returned when the post source comes back empty.
pub fn sample_batch() -> ResultBatch {
    ResultBatch {
        results: vec![InferenceResult::with_detection_time(
            SAMPLE_POST,
            Prediction::Label(SAMPLE_PREDICTION.to_string()),
            SAMPLE_DETECTION_TIME,
        )],
        origin: BatchOrigin::Sample,
    }
}

/// Run the pipeline once.
///
/// Only model-client initialization can fail the run; fetch failures fall
/// back to the sample batch and per-post failures are recorded in the
/// affected result.
pub async fn run(
    factory: &dyn GeneratorFactory,
    source: &dyn PostSource,
    limit: usize,
) -> Result<ResultBatch> {
    info!("Starting analysis run");

    let generator = factory
        .connect()
        .context("Failed to initialize AI client")?;
    info!("Model client initialized");

    let posts = source.fetch_posts(limit).await;
    info!(count = posts.len(), "Posts fetched");

    if posts.is_empty() {
        warn!("No posts retrieved. Using sample data.");
        return Ok(sample_batch());
    }

    let total = posts.len();
    let mut results = Vec::with_capacity(total);
    for (i, post) in posts.iter().enumerate() {
        info!("Processing post {}/{}", i + 1, total);
        results.push(classifier::classify(generator.as_ref(), post).await);
    }

    info!("Analysis complete. Results summary:");
    for (i, result) in results.iter().enumerate() {
        info!(
            "Result {}: {} -> {}",
            i + 1,
            truncate_chars(&result.post, 50),
            result.prediction
        );
    }

    Ok(ResultBatch {
        results,
        origin: BatchOrigin::Live,
    })
}
