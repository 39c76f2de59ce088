//! Shared application state.

use std::sync::Arc;

use bookmarko_core::{BookmarkRepository, TagStore, UserRepository};
use bookmarko_db::{Database, MemoryStore, TagReconciler};
use bookmarko_extract::MetadataExtractor;

use crate::services::AuthService;

/// Clients constructed once at startup and shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub bookmarks: Arc<dyn BookmarkRepository>,
    pub tags: TagReconciler,
    pub auth: AuthService,
    pub extractor: Arc<MetadataExtractor>,
}

impl AppState {
    pub fn new(
        bookmarks: Arc<dyn BookmarkRepository>,
        tags: Arc<dyn TagStore>,
        users: Arc<dyn UserRepository>,
        extractor: Arc<MetadataExtractor>,
        session_ttl: chrono::Duration,
    ) -> Self {
        Self {
            bookmarks,
            tags: TagReconciler::new(tags),
            auth: AuthService::new(users, session_ttl),
            extractor,
        }
    }

    /// State backed by PostgreSQL.
    pub fn from_database(
        db: &Database,
        extractor: Arc<MetadataExtractor>,
        session_ttl: chrono::Duration,
    ) -> Self {
        Self::new(
            Arc::new(db.bookmarks.clone()),
            Arc::new(db.tags.clone()),
            Arc::new(db.users.clone()),
            extractor,
            session_ttl,
        )
    }

    /// State backed by one process-local store.
    pub fn in_memory(
        store: Arc<MemoryStore>,
        extractor: Arc<MetadataExtractor>,
        session_ttl: chrono::Duration,
    ) -> Self {
        Self::new(
            store.clone(),
            store.clone(),
            store,
            extractor,
            session_ttl,
        )
    }
}
