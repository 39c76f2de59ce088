//! Tag vocabulary and per-bookmark tag sets.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use bookmarko_core::defaults;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

const MAX_RECENT_TAGS: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct TagsBody {
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecentTagsParams {
    pub limit: Option<i64>,
}

fn tag_write_failed() -> ApiError {
    ApiError::Internal("Failed to update bookmark tags".to_string())
}

pub async fn get_bookmark_tags(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.bookmarks.fetch(auth.user.id, id).await?;
    Ok(Json(state.tags.get_tags_for_bookmark(id).await))
}

/// Replace the tag set.
pub async fn set_bookmark_tags(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    body: Result<Json<TagsBody>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = body?;
    state.bookmarks.fetch(auth.user.id, id).await?;
    if !state
        .tags
        .update_bookmark_tags(auth.user.id, id, &body.tags)
        .await
    {
        return Err(tag_write_failed());
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_bookmark_tags(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    body: Result<Json<TagsBody>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = body?;
    state.bookmarks.fetch(auth.user.id, id).await?;
    if !state
        .tags
        .add_tags_to_bookmark(auth.user.id, id, &body.tags)
        .await
    {
        return Err(tag_write_failed());
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_bookmark_tags(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    body: Result<Json<TagsBody>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = body?;
    state.bookmarks.fetch(auth.user.id, id).await?;
    if !state
        .tags
        .remove_tags_from_bookmark(auth.user.id, id, &body.tags)
        .await
    {
        return Err(tag_write_failed());
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_tags(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.tags.list_tags(auth.user.id).await?))
}

pub async fn recent_tags(
    State(state): State<AppState>,
    auth: AuthUser,
    params: Result<Query<RecentTagsParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;
    let limit = params
        .limit
        .unwrap_or(defaults::RECENT_TAGS_LIMIT)
        .clamp(1, MAX_RECENT_TAGS);
    Ok(Json(state.tags.recent_tags(auth.user.id, limit).await?))
}
