//! Bearer-token authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use bookmarko_core::User;

use crate::error::ApiError;
use crate::state::AppState;

/// The user behind a valid `Authorization: Bearer <token>` header.
///
/// Handlers that take this extractor reject missing, unknown and expired
/// tokens with 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        let user = state.auth.authenticate(token).await?;
        Ok(AuthUser {
            user,
            token: token.to_string(),
        })
    }
}
