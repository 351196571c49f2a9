use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures of the user store and service layers.
#[derive(Debug, Error)]
pub enum UserError {
    /// Required input missing or empty.
    #[error("{0}")]
    Validation(String),

    #[error("user not found")]
    NotFound,

    /// A unique column (login, email) already holds this value.
    #[error("{0}")]
    Conflict(String),

    /// Storage fault. The source is logged, never shown to callers.
    #[error("storage unavailable")]
    Persistence(#[source] sqlx::Error),
}

/// Failures talking to the inference service.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis service unreachable")]
    UpstreamUnavailable(#[source] reqwest::Error),

    #[error("failed to read analysis service response")]
    UpstreamBody(#[source] reqwest::Error),
}

/// Error returned by handlers, rendered as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: &self.message,
            }),
        )
            .into_response()
    }
}
