use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::core::errors::ApiError;
use crate::query::{QueryRequest, QueryResponse};
use crate::state::AppState;

/// `POST /query`: answers the question twice, with and without retrieved
/// context, using the server retrieval profile.
pub async fn query(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Rejected query body: {}", rejection.body_text());
            return Err(ApiError::BadRequest(format!(
                "Invalid request body: {}",
                rejection.body_text()
            )));
        }
    };

    let profile = state.config.retrieval.server;
    match state.pipeline.run(request.query_text.as_deref(), profile).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => {
            if err.is_client_error() {
                tracing::debug!("Query rejected: {}", err);
            } else {
                tracing::error!("Query failed: {}", err);
            }
            Err(err.into())
        }
    }
}
