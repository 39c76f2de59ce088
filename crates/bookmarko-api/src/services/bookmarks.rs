//! Bookmark writes that span the record and its tags.

use tracing::warn;
use uuid::Uuid;

use bookmarko_core::{
    Bookmark, BookmarkWithTags, CreateBookmarkRequest, Error, Result, UpdateBookmarkRequest,
};

use crate::state::AppState;

/// Insert a bookmark, then reconcile its tags. A tag failure is logged and
/// the bookmark is still returned.
pub async fn create_with_tags(
    state: &AppState,
    user_id: Uuid,
    req: &CreateBookmarkRequest,
) -> Result<BookmarkWithTags> {
    req.validate().map_err(Error::InvalidInput)?;
    let bookmark = state.bookmarks.insert(user_id, req).await?;

    if let Some(tags) = req.tags.as_deref().filter(|t| !t.is_empty()) {
        if !state.tags.add_tags_to_bookmark(user_id, bookmark.id, tags).await {
            warn!(
                subsystem = "api",
                op = "create_bookmark",
                %user_id,
                bookmark_id = %bookmark.id,
                "Bookmark saved without its tags"
            );
        }
    }
    Ok(with_tags(state, bookmark).await)
}

/// Apply a partial update. `tags`, when present, replaces the tag set.
pub async fn update_with_tags(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    req: &UpdateBookmarkRequest,
) -> Result<BookmarkWithTags> {
    req.validate().map_err(Error::InvalidInput)?;
    let bookmark = if req.touches_record() {
        state.bookmarks.update(user_id, id, req).await?
    } else {
        state.bookmarks.fetch(user_id, id).await?
    };

    if let Some(tags) = &req.tags {
        if !state.tags.update_bookmark_tags(user_id, id, tags).await {
            warn!(
                subsystem = "api",
                op = "update_bookmark",
                %user_id,
                bookmark_id = %id,
                "Bookmark updated without its tags"
            );
        }
    }
    Ok(with_tags(state, bookmark).await)
}

pub async fn with_tags(state: &AppState, bookmark: Bookmark) -> BookmarkWithTags {
    let tags = state.tags.get_tags_for_bookmark(bookmark.id).await;
    BookmarkWithTags { bookmark, tags }
}

/// Every bookmark of the user with tags resolved in one batch.
pub async fn list_with_tags(state: &AppState, user_id: Uuid) -> Result<Vec<BookmarkWithTags>> {
    let bookmarks = state.bookmarks.list(user_id).await?;
    let ids: Vec<Uuid> = bookmarks.iter().map(|b| b.id).collect();
    let mut tags = state.tags.get_tags_for_bookmarks(&ids).await;

    Ok(bookmarks
        .into_iter()
        .map(|bookmark| BookmarkWithTags {
            tags: tags.remove(&bookmark.id).unwrap_or_default(),
            bookmark,
        })
        .collect())
}
