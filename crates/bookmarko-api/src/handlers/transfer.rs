//! JSON export and import.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use bookmarko_core::ExportedBookmark;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::bookmarks as service;
use crate::services::transfer::plan_import;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// `GET /api/export`: every bookmark of the user as a downloadable file.
pub async fn export_bookmarks(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let exported: Vec<ExportedBookmark> = service::list_with_tags(&state, auth.user.id)
        .await?
        .into_iter()
        .map(ExportedBookmark::from)
        .collect();

    let disposition = format!(
        "attachment; filename=\"bookmarks-export-{}.json\"",
        Utc::now().format("%Y-%m-%d")
    );
    info!(
        subsystem = "api",
        op = "export",
        user_id = %auth.user.id,
        result_count = exported.len(),
        "Bookmarks exported"
    );
    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(exported)))
}

/// `POST /api/import`: replay each valid entry through bookmark creation.
pub async fn import_bookmarks(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(document) = body?;
    let plan = plan_import(&document).map_err(|msg| ApiError::BadRequest(msg.to_string()))?;

    let mut summary = ImportSummary {
        imported: 0,
        skipped: plan.skipped,
    };
    for req in &plan.requests {
        match service::create_with_tags(&state, auth.user.id, req).await {
            Ok(_) => summary.imported += 1,
            Err(e) => {
                warn!(
                    subsystem = "api",
                    op = "import",
                    user_id = %auth.user.id,
                    url = %req.url,
                    error = %e,
                    "Skipping bookmark that failed to import"
                );
                summary.skipped += 1;
            }
        }
    }

    info!(
        subsystem = "api",
        op = "import",
        user_id = %auth.user.id,
        imported = summary.imported,
        skipped = summary.skipped,
        "Bookmarks imported"
    );
    Ok(Json(summary))
}
