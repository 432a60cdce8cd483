use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

use crate::core::config::ServerConfig;
use crate::server::handlers::{health, query};
use crate::state::AppState;

/// Creates the application router.
///
/// This function sets up:
/// - `POST /query` and `GET /health`
/// - `GET /` serving `index.html` from the configured static directory
/// - CORS and request tracing middleware
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state.config.server);
    let index_page = state
        .paths
        .resolve(&state.config.server.static_dir)
        .join("index.html");

    Router::new()
        .route("/query", post(query::query))
        .route("/health", get(health::health))
        .route_service("/", ServeFile::new(index_page))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins = resolve_allowed_origins(&server.cors_allowed_origins);

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            origins
                .into_iter()
                .filter_map(|origin| match HeaderValue::from_str(&origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                        None
                    }
                })
                .collect::<Vec<_>>(),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

/// Empty result means any origin. A `*` entry anywhere in the list also
/// opens the service to every origin.
fn resolve_allowed_origins(configured: &[String]) -> Vec<String> {
    let origins = configured
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_string())
        .collect::<Vec<_>>();

    if origins.iter().any(|origin| origin == "*") {
        return Vec::new();
    }
    origins
}
