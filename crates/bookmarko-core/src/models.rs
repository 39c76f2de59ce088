//! Domain models for bookmarks, tags, and users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// USERS
// =============================================================================

/// A registered user, as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A user together with the stored password hash.
///
/// Never serialized; only the auth service reads it.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    /// Argon2 PHC-format hash string.
    pub password_hash: String,
}

/// A login session. Only the SHA-256 hash of the bearer token is stored.
#[derive(Debug, Clone)]
pub struct Session {
    pub token_hash: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

// =============================================================================
// BOOKMARKS
// =============================================================================

/// A saved bookmark record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub favicon: Option<String>,
    /// Free-form document; usually the extraction result the bookmark was saved from.
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// A bookmark with its tag names resolved through the join table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkWithTags {
    #[serde(flatten)]
    pub bookmark: Bookmark,
    pub tags: Vec<String>,
}

/// Request to create a bookmark.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBookmarkRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    /// Tag names; reconciled after the record is written.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl CreateBookmarkRequest {
    /// Reject requests missing a URL or title.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.url.trim().is_empty() {
            return Err("URL is required".to_string());
        }
        if self.title.trim().is_empty() {
            return Err("Title is required".to_string());
        }
        Ok(())
    }
}

/// Partial update of a bookmark. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBookmarkRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    /// When present, replaces the bookmark's whole tag set.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl UpdateBookmarkRequest {
    /// Reject an explicitly blank title.
    pub fn validate(&self) -> std::result::Result<(), String> {
        match &self.title {
            Some(t) if t.trim().is_empty() => Err("Title cannot be empty".to_string()),
            _ => Ok(()),
        }
    }

    /// True when any column of the bookmark record itself changes.
    pub fn touches_record(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.favicon.is_some()
            || self.metadata.is_some()
    }
}

/// Portable bookmark shape used by JSON export and import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedBookmark {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub favicon: Option<String>,
    pub tags: Vec<String>,
    pub metadata: Option<serde_json::Value>,
}

impl From<BookmarkWithTags> for ExportedBookmark {
    fn from(b: BookmarkWithTags) -> Self {
        Self {
            url: b.bookmark.url,
            title: b.bookmark.title,
            description: b.bookmark.description,
            favicon: b.bookmark.favicon,
            tags: b.tags,
            metadata: b.bookmark.metadata,
        }
    }
}

// =============================================================================
// TAGS
// =============================================================================

/// A tag in a user's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Lowercase, trimmed name.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A tag with the number of bookmarks linked to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagWithCount {
    pub id: Uuid,
    pub name: String,
    pub bookmark_count: i64,
}

/// Join row between a bookmark and a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkTag {
    pub id: Uuid,
    pub bookmark_id: Uuid,
    pub tag_id: Uuid,
    /// Redundant owner column used for authorization filtering.
    pub user_id: Uuid,
}
