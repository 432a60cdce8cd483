use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let indexed_chunks = state.pipeline.index().count().await.map_err(|e| {
        tracing::warn!("Health check could not reach the vector index: {}", e);
        ApiError::ServiceUnavailable
    })?;

    Ok(Json(json!({
        "status": "ok",
        "indexed_chunks": indexed_chunks,
        "model": state.pipeline.model(),
    })))
}
