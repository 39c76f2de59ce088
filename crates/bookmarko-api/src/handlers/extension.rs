//! Request/response bridge for the browser extension.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

use bookmarko_core::{ExtensionMessage, ExtensionResponse};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// `POST /api/extension/message`. Message-level failures are reported in
/// the envelope, not through the status code.
pub async fn handle_message(
    State(state): State<AppState>,
    _auth: AuthUser,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ExtensionResponse>, ApiError> {
    let Json(raw) = body?;
    let message = match ExtensionMessage::parse(raw) {
        Ok(message) => message,
        Err(response) => return Ok(Json(response)),
    };

    let response = match message {
        ExtensionMessage::Ping => ExtensionResponse::pong(),
        ExtensionMessage::ExtractMetadata { url } | ExtensionMessage::GetPageInfo { url } => {
            if url.trim().is_empty() {
                ExtensionResponse::failure("URL is required")
            } else {
                let result = state.extractor.extract(&url).await;
                ExtensionResponse::with_metadata(result.to_json())
            }
        }
    };
    Ok(Json(response))
}
