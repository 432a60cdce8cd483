use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

pub const NO_QUERY_TEXT: &str = "No query text provided";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("service unavailable")]
    ServiceUnavailable,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service unavailable".to_string(),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

/// Failure of one stage of the query pipeline.
///
/// The variants carry the collaborator's message only; stack traces and
/// library error types never cross this boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{}", NO_QUERY_TEXT)]
    EmptyQuery,

    #[error("retrieval failed: {0}")]
    Retrieval(String),

    #[error("retrieval timed out after {secs}s")]
    RetrievalTimeout { secs: u64 },

    #[error("{kind} generation failed: {message}")]
    Generation { kind: &'static str, message: String },

    #[error("{kind} generation timed out after {secs}s")]
    GenerationTimeout { kind: &'static str, secs: u64 },
}

impl PipelineError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::EmptyQuery)
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::EmptyQuery => ApiError::BadRequest(NO_QUERY_TEXT.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Strips the variant prefix so a collaborator error can be re-wrapped by a
/// pipeline stage without reading "internal error: internal error: ...".
pub fn summarize(err: &ApiError) -> String {
    match err {
        ApiError::ServiceUnavailable => "service unavailable".to_string(),
        ApiError::BadRequest(msg) | ApiError::Internal(msg) => msg.clone(),
    }
}
