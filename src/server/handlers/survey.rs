use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::core::errors::ApiError;
use crate::state::AppState;

pub const MISSING_REQUIREMENT: &str = "missing required parameter: requirement";
pub const EMPTY_REQUIREMENT: &str = "requirement must not be empty";

pub async fn generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let requirement = parse_requirement(payload)?;

    let service = state.survey().map_err(|reason| ApiError::Pipeline {
        code: "service_unavailable",
        message: reason.to_string(),
    })?;

    let data = service
        .generate(&requirement)
        .await
        .map_err(|err| ApiError::Pipeline {
            code: err.code(),
            message: err.to_string(),
        })?;

    Ok(Json(json!({
        "status": "success",
        "data": data
    })))
}

/// Input checks run before anything touches the pipeline.
fn parse_requirement(payload: Result<Json<Value>, JsonRejection>) -> Result<String, ApiError> {
    let Ok(Json(body)) = payload else {
        return Err(ApiError::BadRequest(MISSING_REQUIREMENT.to_string()));
    };

    let requirement = body
        .get("requirement")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::BadRequest(MISSING_REQUIREMENT.to_string()))?
        .trim();

    if requirement.is_empty() {
        return Err(ApiError::BadRequest(EMPTY_REQUIREMENT.to_string()));
    }
    Ok(requirement.to_string())
}
