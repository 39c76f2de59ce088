//! Repository traits for bookmarko storage backends.
//!
//! Implemented by the PostgreSQL repositories and the in-memory backend in
//! `bookmarko-db`; the API holds them as `Arc<dyn Trait>`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// BOOKMARK REPOSITORY
// =============================================================================

/// Repository for bookmark records. Every call is scoped to an owning user.
#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// Insert a new bookmark. Tags on the request are ignored here.
    async fn insert(&self, user_id: Uuid, req: &CreateBookmarkRequest) -> Result<Bookmark>;

    /// Fetch a bookmark. Missing and foreign bookmarks both yield
    /// [`crate::Error::BookmarkNotFound`].
    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<Bookmark>;

    /// All bookmarks of a user, newest first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Bookmark>>;

    /// Apply the record fields of a partial update.
    async fn update(&self, user_id: Uuid, id: Uuid, req: &UpdateBookmarkRequest)
        -> Result<Bookmark>;

    /// Hard delete; links are removed with the record.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()>;
}

// =============================================================================
// TAG STORE
// =============================================================================

/// Persistence primitives the tag reconciler is built on.
///
/// Implementations must enforce uniqueness of `(user_id, name)` for tags and
/// `(bookmark_id, tag_id)` for links.
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Every tag owned by the user.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Tag>>;

    /// Tags owned by the user whose names are in `names`.
    async fn find_by_names(&self, user_id: Uuid, names: &[String]) -> Result<Vec<Tag>>;

    /// Insert tags in one all-or-nothing write. A name that already exists
    /// for the user fails the whole write with a uniqueness violation.
    async fn insert_many(&self, user_id: Uuid, names: &[String]) -> Result<Vec<Tag>>;

    /// Link tags to a bookmark, silently skipping links that already exist.
    async fn link(&self, user_id: Uuid, bookmark_id: Uuid, tag_ids: &[Uuid]) -> Result<()>;

    /// Remove every link of a bookmark. Returns the number of links removed.
    async fn unlink_all(&self, user_id: Uuid, bookmark_id: Uuid) -> Result<u64>;

    /// Remove specific links of a bookmark. Returns the number removed.
    async fn unlink(&self, user_id: Uuid, bookmark_id: Uuid, tag_ids: &[Uuid]) -> Result<u64>;

    /// Names linked to a bookmark, in link insertion order.
    async fn names_for_bookmark(&self, bookmark_id: Uuid) -> Result<Vec<String>>;

    /// Names for several bookmarks at once, keyed by bookmark id.
    async fn names_for_bookmarks(&self, bookmark_ids: &[Uuid])
        -> Result<HashMap<Uuid, Vec<String>>>;

    /// The user's vocabulary with per-tag bookmark counts, ordered by name.
    async fn list_with_counts(&self, user_id: Uuid) -> Result<Vec<TagWithCount>>;

    /// Most recently created tags, newest first.
    async fn recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<Tag>>;
}

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Users and their login sessions.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user. A taken username yields [`crate::Error::Conflict`].
    async fn create(&self, username: &str, password_hash: &str) -> Result<User>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>>;

    async fn get(&self, id: Uuid) -> Result<Option<User>>;

    async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session>;

    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>>;

    /// Returns whether a session was removed.
    async fn revoke_session(&self, token_hash: &str) -> Result<bool>;

    /// Delete sessions whose expiry has passed. Returns the number removed.
    async fn purge_expired_sessions(&self) -> Result<u64>;
}
