// GET /analyze: run the screening pipeline and return its results.
//
// Returns 200 {"results": [...]} for live and sample batches alike.
// Returns 500 {"error": "..."} if the model client cannot be initialized.
//
// The run happens inside the request: posts are classified one after another
// and the response is sent once the whole batch is done.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::inference::classifier::InferenceResult;
use crate::output::jsonl;
use crate::pipeline::analyze;
use crate::web::{api_error, AppState};

#[derive(Serialize)]
struct AnalyzeResponse<'a> {
    results: &'a [InferenceResult],
}

pub async fn analyze_posts(State(state): State<AppState>) -> Response {
    let batch = match analyze::run(
        state.factory.as_ref(),
        state.source.as_ref(),
        state.config.post_limit,
    )
    .await
    {
        Ok(batch) => batch,
        Err(e) => {
            let message = format!("{e:#}");
            error!(error = %message, "Analysis run failed");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, &message);
        }
    };

    // Sample batches are served but not persisted.
    if !batch.is_sample() {
        jsonl::save_batch(&state.config.output_dir, &batch.results);
    }

    (
        StatusCode::OK,
        Json(AnalyzeResponse {
            results: &batch.results,
        }),
    )
        .into_response()
}
