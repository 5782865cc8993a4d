// Model client traits: the swap-ready abstraction over the hosted classifier.
//
// The pipeline only needs one capability from a model provider: stream the
// reply to a classification request as text fragments. VertexClient
// implements it against Vertex AI; tests implement it with canned fragments.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Fixed instruction sent alongside every post.
pub const SYSTEM_INSTRUCTION: &str = "Classify text as Trustworthy or Misinformation";

/// Harm categories whose provider-side filtering is switched off.
pub const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_HARASSMENT",
];

/// Text fragments of a streamed model reply, in arrival order.
pub type FragmentStream = BoxStream<'static, Result<String>>;

/// Generation parameters. Fixed for classification; not tunable per call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_p: f32,
    pub seed: i32,
    pub max_output_tokens: u32,
    /// 0 disables extended reasoning.
    pub thinking_budget: u32,
    /// Threshold applied to every entry of `SAFETY_CATEGORIES`.
    pub safety_threshold: &'static str,
}

impl GenerationSettings {
    pub const CLASSIFICATION: Self = Self {
        temperature: 0.5,
        top_p: 1.0,
        seed: 0,
        max_output_tokens: 65535,
        thinking_budget: 0,
        safety_threshold: "OFF",
    };
}

/// A single-turn classification request: one user message plus the fixed
/// system instruction and generation settings.
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    pub text: String,
    pub system_instruction: &'static str,
    pub settings: GenerationSettings,
}

impl ClassificationRequest {
    pub fn for_post(text: &str) -> Self {
        Self {
            text: text.to_string(),
            system_instruction: SYSTEM_INSTRUCTION,
            settings: GenerationSettings::CLASSIFICATION,
        }
    }
}

/// A model provider that can stream a reply to a classification request.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Start a streamed generation. Errors before the first fragment come
    /// back here; errors mid-stream come back as stream items.
    async fn stream_generate(&self, request: &ClassificationRequest) -> Result<FragmentStream>;
}

/// Builds a fresh model client for each pipeline run.
///
/// Initialization failure is fatal to the run that asked for the client.
pub trait GeneratorFactory: Send + Sync {
    fn connect(&self) -> Result<Arc<dyn ContentGenerator>>;
}

impl<F> GeneratorFactory for F
where
    F: Fn() -> Result<Arc<dyn ContentGenerator>> + Send + Sync,
{
    fn connect(&self) -> Result<Arc<dyn ContentGenerator>> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_settings_are_fixed() {
        let request = ClassificationRequest::for_post("hello");
        assert_eq!(request.text, "hello");
        assert_eq!(request.system_instruction, SYSTEM_INSTRUCTION);
        assert_eq!(request.settings.temperature, 0.5);
        assert_eq!(request.settings.top_p, 1.0);
        assert_eq!(request.settings.seed, 0);
        assert_eq!(request.settings.max_output_tokens, 65535);
        assert_eq!(request.settings.thinking_budget, 0);
        assert_eq!(request.settings.safety_threshold, "OFF");
    }

    #[test]
    fn closures_act_as_factories() {
        let factory = || -> Result<Arc<dyn ContentGenerator>> { anyhow::bail!("no credentials") };
        let err = factory.connect().err().unwrap();
        assert_eq!(err.to_string(), "no credentials");
    }
}
