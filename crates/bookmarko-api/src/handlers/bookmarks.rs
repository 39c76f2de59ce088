//! Bookmark CRUD.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use bookmarko_core::{BookmarkQuery, CreateBookmarkRequest, UpdateBookmarkRequest};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::bookmarks as service;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListBookmarksParams {
    /// Comma-separated tag names; a bookmark must carry all of them.
    pub tag: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

pub async fn list_bookmarks(
    State(state): State<AppState>,
    auth: AuthUser,
    params: Result<Query<ListBookmarksParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;
    let query = BookmarkQuery::from_params(
        params.tag.as_deref(),
        params.q.as_deref(),
        params.sort.as_deref(),
        params.order.as_deref(),
    )
    .map_err(ApiError::BadRequest)?;

    let bookmarks = service::list_with_tags(&state, auth.user.id).await?;
    Ok(Json(query.apply(bookmarks)))
}

pub async fn get_bookmark(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let bookmark = state.bookmarks.fetch(auth.user.id, id).await?;
    Ok(Json(service::with_tags(&state, bookmark).await))
}

pub async fn create_bookmark(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<CreateBookmarkRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let created = service::create_with_tags(&state, auth.user.id, &req).await?;

    info!(
        subsystem = "api",
        op = "create_bookmark",
        user_id = %auth.user.id,
        bookmark_id = %created.bookmark.id,
        tag_count = created.tags.len(),
        "Bookmark created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_bookmark(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateBookmarkRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let updated = service::update_with_tags(&state, auth.user.id, id, &req).await?;
    Ok(Json(updated))
}

pub async fn delete_bookmark(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.bookmarks.delete(auth.user.id, id).await?;
    info!(
        subsystem = "api",
        op = "delete_bookmark",
        user_id = %auth.user.id,
        bookmark_id = %id,
        "Bookmark deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
