use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

pub fn analysis_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze))
}

/// Forward the text to the inference service and relay its status and body.
#[instrument(skip(state, payload))]
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "analyze: malformed body");
        ApiError::bad_request("Invalid request body")
    })?;

    let upstream = state.analyzer.analyze(&payload.text).await.map_err(|e| {
        error!(error = %e, endpoint = %state.analyzer.endpoint(), "analysis call failed");
        ApiError::internal("Failed to call analysis service")
    })?;

    info!(status = %upstream.status, chars = payload.text.chars().count(), "analysis relayed");
    let content_type = upstream
        .content_type
        .unwrap_or_else(|| HeaderValue::from_static("text/plain; charset=utf-8"));
    Ok((
        upstream.status,
        [(header::CONTENT_TYPE, content_type)],
        upstream.body,
    )
        .into_response())
}
