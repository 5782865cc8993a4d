// Router tests for GET /analyze and GET /health.
//
// Requests go through the full Axum router via tower's `oneshot`, with
// stubbed post sources and models. Result files land in a per-test
// scratch directory.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use common::{
    config_with_output, factory_for, failing_factory, result_files, scratch_dir, FixedPosts,
    KeywordModel,
};
use trustcheck::facebook::posts::PostSource;
use trustcheck::inference::traits::GeneratorFactory;
use trustcheck::web::{build_router, AppState};

fn state(
    dir: &std::path::PathBuf,
    factory: Arc<dyn GeneratorFactory>,
    source: impl PostSource + 'static,
) -> AppState {
    AppState {
        config: Arc::new(config_with_output(dir)),
        factory,
        source: Arc::new(source),
    }
}

async fn get(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = build_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn analyze_returns_results_and_writes_one_jsonl_file() {
    let dir = scratch_dir("web-three-posts");
    let model = Arc::new(KeywordModel::default());
    let source = FixedPosts::new(&["first post", "cheese is the moon", "third post"]);

    let (status, body) = get(state(&dir, factory_for(model), source), "/analyze").await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[1]["prediction"], "Misinformation");

    let files = result_files(&dir);
    assert_eq!(files.len(), 1);
    let contents = std::fs::read_to_string(&files[0]).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    for (line, expected_post) in lines.iter().zip(["first post", "cheese is the moon", "third post"]) {
        let record: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(record["post"], expected_post);
        assert!(record["prediction"].is_string());
        assert!(record["timestamp"].is_string());
        assert!(record["detectionTime"].is_number());
    }

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn analyze_serves_sample_when_no_posts() {
    let dir = scratch_dir("web-sample");
    let model = Arc::new(KeywordModel::default());

    let (status, body) = get(state(&dir, factory_for(model), FixedPosts::empty()), "/analyze").await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["post"], "Uchaguzi mwezi wa kumi.");
    assert_eq!(results[0]["prediction"], "Trustworthy");
    assert_eq!(results[0]["detectionTime"], 150.5);
    assert!(result_files(&dir).is_empty());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn analyze_reports_init_failure_as_500_without_file() {
    let dir = scratch_dir("web-init-failure");
    let source = FixedPosts::new(&["a post"]);

    let (status, body) = get(
        state(&dir, failing_factory("credentials rejected"), source),
        "/analyze",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("credentials rejected"));
    assert!(body.get("results").is_none());
    assert!(result_files(&dir).is_empty());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn write_failure_does_not_affect_response() {
    let dir = std::env::temp_dir().join("trustcheck-missing-output-dir/nested");
    let model = Arc::new(KeywordModel::default());

    let (status, body) = get(
        state(&dir, factory_for(model), FixedPosts::new(&["post"])),
        "/analyze",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn health_is_ok() {
    let dir = scratch_dir("web-health");
    let model = Arc::new(KeywordModel::default());

    let (status, body) = get(state(&dir, factory_for(model), FixedPosts::empty()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let dir = scratch_dir("web-cors");
    let model = Arc::new(KeywordModel::default());
    let router = build_router(state(&dir, factory_for(model), FixedPosts::empty()));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/analyze")
                .header(header::ORIGIN, "https://dashboard.example.org")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );

    std::fs::remove_dir_all(&dir).unwrap();
}
