// Shared stubs for the integration tests: a fixed post source and a
// keyword-driven model that never touches the network.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use trustcheck::config::Config;
use trustcheck::facebook::posts::PostSource;
use trustcheck::inference::traits::{
    ClassificationRequest, ContentGenerator, FragmentStream, GeneratorFactory,
};

/// Returns the same posts on every fetch.
pub struct FixedPosts(pub Vec<String>);

impl FixedPosts {
    pub fn new(posts: &[&str]) -> Self {
        Self(posts.iter().map(|p| p.to_string()).collect())
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }
}

#[async_trait]
impl PostSource for FixedPosts {
    async fn fetch_posts(&self, limit: usize) -> Vec<String> {
        self.0.iter().take(limit).cloned().collect()
    }
}

/// Labels posts mentioning "cheese" as Misinformation, everything else as
/// Trustworthy, and fails on posts containing "FAIL". Replies arrive in
/// two fragments with surrounding whitespace, like a real stream.
#[derive(Default)]
pub struct KeywordModel {
    pub calls: AtomicUsize,
}

impl KeywordModel {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for KeywordModel {
    async fn stream_generate(&self, request: &ClassificationRequest) -> Result<FragmentStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if request.text.contains("FAIL") {
            anyhow::bail!("upstream returned 503");
        }

        let fragments: Vec<Result<String>> = if request.text.contains("cheese") {
            vec![Ok(" Misinfor".to_string()), Ok("mation\n".to_string())]
        } else {
            vec![Ok("Trust".to_string()), Ok("worthy ".to_string())]
        };
        Ok(stream::iter(fragments).boxed())
    }
}

/// Factory handing out the given model on every connect.
pub fn factory_for(model: Arc<KeywordModel>) -> Arc<dyn GeneratorFactory> {
    Arc::new(move || -> Result<Arc<dyn ContentGenerator>> {
        Ok(model.clone() as Arc<dyn ContentGenerator>)
    })
}

/// Factory whose client construction always fails.
pub fn failing_factory(message: &'static str) -> Arc<dyn GeneratorFactory> {
    Arc::new(move || -> Result<Arc<dyn ContentGenerator>> { anyhow::bail!(message) })
}

/// A fresh, empty scratch directory unique to this test.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("trustcheck-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Config that writes results into `output_dir` and needs nothing else.
pub fn config_with_output(output_dir: &PathBuf) -> Config {
    let dir = output_dir.display().to_string();
    Config::from_lookup(|key| match key {
        "OUTPUT_DIR" => Some(dir.clone()),
        _ => None,
    })
    .unwrap()
}

/// Paths of every `inference_results_*.jsonl` file in `dir`.
pub fn result_files(dir: &PathBuf) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("inference_results_") && n.ends_with(".jsonl"))
        })
        .collect()
}
