//! Public metadata extraction endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /api/extract-metadata` with `{"url": "..."}`.
///
/// Always answers 200 with the flat extraction JSON once a non-blank URL
/// string is given; the fallback chain absorbs fetch failures.
pub async fn extract_metadata(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let url = body
        .get("url")
        .and_then(Value::as_str)
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("URL is required".to_string()))?;

    let result = state.extractor.extract(url).await;
    Ok(Json(result.to_json()))
}

/// Bare `OPTIONS` without CORS preflight headers.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
