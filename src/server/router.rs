use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{health, survey};
use crate::state::AppState;

/// Creates the application router: the three `/api` endpoints plus CORS and
/// request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state.settings.server.cors_origins);
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/test", get(health::test))
        .route("/api/generate", post(survey::generate))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(configured: &[String]) -> CorsLayer {
    let mut origins = parse_origins(configured.iter().map(String::as_str));
    if origins.is_empty() {
        tracing::warn!("No valid CORS origins configured; using local defaults");
        origins = parse_origins(default_local_origins().into_iter());
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

fn parse_origins<'a>(origins: impl Iterator<Item = &'a str>) -> Vec<HeaderValue> {
    origins
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect()
}

fn default_local_origins() -> Vec<&'static str> {
    vec!["http://localhost:5173", "http://localhost:3000"]
}
