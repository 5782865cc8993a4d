// Web server: Axum backend exposing the screening pipeline.
//
// GET /analyze runs the pipeline on demand; GET /health is a liveness probe.
// CORS is open to every origin so a browser dashboard on another host can
// call the API directly.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::facebook::client::GraphClient;
use crate::facebook::posts::{GraphPostSource, PostSource};
use crate::inference::traits::GeneratorFactory;
use crate::inference::vertex::VertexFactory;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
///
/// Everything here is read-only; requests share no mutable state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub factory: Arc<dyn GeneratorFactory>,
    pub source: Arc<dyn PostSource>,
}

impl AppState {
    /// Wire the Graph API post source and Vertex AI factory from config.
    pub fn from_config(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let graph = GraphClient::new(&config.graph_api_url, timeout)?;
        let source = GraphPostSource::new(
            graph,
            config.fb_user_id.clone(),
            config.fb_access_token.clone(),
        );

        Ok(Self {
            factory: Arc::new(VertexFactory::new(config.clone())),
            source: Arc::new(source),
            config,
        })
    }
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(config: Config, port: u16, bind: &str) -> Result<()> {
    let state = AppState::from_config(config)?;
    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("trustcheck listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", get(handlers::analyze::analyze_posts))
        .route("/health", get(health))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe: always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}
