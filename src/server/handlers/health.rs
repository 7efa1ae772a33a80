use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

pub const SERVICE_NAME: &str = "survey-designer API";

/// Liveness only; answers even when the generation pipeline is down.
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME
    }))
}

pub async fn test() -> impl IntoResponse {
    Json(json!({
        "status": "success",
        "message": "API service is running",
        "endpoints": {
            "health": "/api/health",
            "generate": "/api/generate (POST)",
            "test": "/api/test"
        }
    }))
}
