//! In-memory storage backend.
//!
//! Implements every repository trait over maps guarded by a tokio `RwLock`.
//! The same uniqueness and foreign-key rules as the SQL schema are enforced,
//! so races between concurrent writers behave the way they do in PostgreSQL:
//! a duplicate `(user_id, name)` tag fails the whole batch with
//! [`Error::Conflict`].

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use bookmarko_core::{
    new_v7, Bookmark, BookmarkRepository, BookmarkTag, CreateBookmarkRequest, Error, Result,
    Session, Tag, TagStore, TagWithCount, UpdateBookmarkRequest, User, UserCredentials,
    UserRepository,
};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, UserCredentials>,
    sessions: HashMap<String, Session>,
    bookmarks: HashMap<Uuid, Bookmark>,
    tags: HashMap<Uuid, Tag>,
    /// Kept in insertion order.
    links: Vec<BookmarkTag>,
}

impl Inner {
    fn tag_exists(&self, user_id: Uuid, name: &str) -> bool {
        self.tags
            .values()
            .any(|t| t.user_id == user_id && t.name == name)
    }
}

/// Non-persistent backend for tests and `STORAGE_BACKEND=memory`.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of tag rows across all users.
    pub async fn tag_row_count(&self) -> usize {
        self.inner.read().await.tags.len()
    }
}

#[async_trait]
impl BookmarkRepository for MemoryStore {
    async fn insert(&self, user_id: Uuid, req: &CreateBookmarkRequest) -> Result<Bookmark> {
        req.validate().map_err(Error::InvalidInput)?;

        let bookmark = Bookmark {
            id: new_v7(),
            user_id,
            url: req.url.trim().to_string(),
            title: req.title.trim().to_string(),
            description: req.description.clone(),
            favicon: req.favicon.clone(),
            metadata: req.metadata.clone(),
            created_at: Utc::now(),
        };
        self.inner
            .write()
            .await
            .bookmarks
            .insert(bookmark.id, bookmark.clone());
        Ok(bookmark)
    }

    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<Bookmark> {
        self.inner
            .read()
            .await
            .bookmarks
            .get(&id)
            .filter(|b| b.user_id == user_id)
            .cloned()
            .ok_or(Error::BookmarkNotFound(id))
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Bookmark>> {
        let inner = self.inner.read().await;
        let mut out: Vec<Bookmark> = inner
            .bookmarks
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        req: &UpdateBookmarkRequest,
    ) -> Result<Bookmark> {
        req.validate().map_err(Error::InvalidInput)?;

        let mut inner = self.inner.write().await;
        let bookmark = inner
            .bookmarks
            .get_mut(&id)
            .filter(|b| b.user_id == user_id)
            .ok_or(Error::BookmarkNotFound(id))?;

        if let Some(title) = &req.title {
            bookmark.title = title.trim().to_string();
        }
        if let Some(description) = &req.description {
            bookmark.description = Some(description.clone());
        }
        if let Some(favicon) = &req.favicon {
            bookmark.favicon = Some(favicon.clone());
        }
        if let Some(metadata) = &req.metadata {
            bookmark.metadata = Some(metadata.clone());
        }
        Ok(bookmark.clone())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        match inner.bookmarks.get(&id) {
            Some(b) if b.user_id == user_id => {}
            _ => return Err(Error::BookmarkNotFound(id)),
        }
        inner.bookmarks.remove(&id);
        inner.links.retain(|l| l.bookmark_id != id);
        Ok(())
    }
}

#[async_trait]
impl TagStore for MemoryStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Tag>> {
        let inner = self.inner.read().await;
        let mut tags: Vec<Tag> = inner
            .tags
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_by_names(&self, user_id: Uuid, names: &[String]) -> Result<Vec<Tag>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tags
            .values()
            .filter(|t| t.user_id == user_id && names.contains(&t.name))
            .cloned()
            .collect())
    }

    async fn insert_many(&self, user_id: Uuid, names: &[String]) -> Result<Vec<Tag>> {
        let mut inner = self.inner.write().await;

        let mut batch = HashSet::new();
        for name in names {
            if inner.tag_exists(user_id, name) || !batch.insert(name.as_str()) {
                return Err(Error::Conflict(format!(
                    "tag '{}' already exists for user {}",
                    name, user_id
                )));
            }
        }

        let now = Utc::now();
        let created: Vec<Tag> = names
            .iter()
            .map(|name| Tag {
                id: new_v7(),
                user_id,
                name: name.clone(),
                created_at: now,
            })
            .collect();
        for tag in &created {
            inner.tags.insert(tag.id, tag.clone());
        }
        Ok(created)
    }

    async fn link(&self, user_id: Uuid, bookmark_id: Uuid, tag_ids: &[Uuid]) -> Result<()> {
        let mut inner = self.inner.write().await;

        if !inner.bookmarks.contains_key(&bookmark_id) {
            return Err(Error::BookmarkNotFound(bookmark_id));
        }
        if let Some(missing) = tag_ids.iter().find(|id| !inner.tags.contains_key(*id)) {
            return Err(Error::NotFound(format!("tag {}", missing)));
        }

        for tag_id in tag_ids {
            let exists = inner
                .links
                .iter()
                .any(|l| l.bookmark_id == bookmark_id && l.tag_id == *tag_id);
            if !exists {
                inner.links.push(BookmarkTag {
                    id: new_v7(),
                    bookmark_id,
                    tag_id: *tag_id,
                    user_id,
                });
            }
        }
        Ok(())
    }

    async fn unlink_all(&self, user_id: Uuid, bookmark_id: Uuid) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.links.len();
        inner
            .links
            .retain(|l| !(l.bookmark_id == bookmark_id && l.user_id == user_id));
        Ok((before - inner.links.len()) as u64)
    }

    async fn unlink(&self, user_id: Uuid, bookmark_id: Uuid, tag_ids: &[Uuid]) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.links.len();
        inner.links.retain(|l| {
            !(l.bookmark_id == bookmark_id && l.user_id == user_id && tag_ids.contains(&l.tag_id))
        });
        Ok((before - inner.links.len()) as u64)
    }

    async fn names_for_bookmark(&self, bookmark_id: Uuid) -> Result<Vec<String>> {
        let inner = self.inner.read().await;
        Ok(inner
            .links
            .iter()
            .filter(|l| l.bookmark_id == bookmark_id)
            .filter_map(|l| inner.tags.get(&l.tag_id).map(|t| t.name.clone()))
            .collect())
    }

    async fn names_for_bookmarks(
        &self,
        bookmark_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<String>>> {
        let inner = self.inner.read().await;
        let mut map: HashMap<Uuid, Vec<String>> = HashMap::new();
        for link in inner
            .links
            .iter()
            .filter(|l| bookmark_ids.contains(&l.bookmark_id))
        {
            if let Some(tag) = inner.tags.get(&link.tag_id) {
                map.entry(link.bookmark_id)
                    .or_default()
                    .push(tag.name.clone());
            }
        }
        Ok(map)
    }

    async fn list_with_counts(&self, user_id: Uuid) -> Result<Vec<TagWithCount>> {
        let inner = self.inner.read().await;
        let mut out: Vec<TagWithCount> = inner
            .tags
            .values()
            .filter(|t| t.user_id == user_id)
            .map(|t| TagWithCount {
                id: t.id,
                name: t.name.clone(),
                bookmark_count: inner.links.iter().filter(|l| l.tag_id == t.id).count() as i64,
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<Tag>> {
        let mut tags = self.list_for_user(user_id).await?;
        tags.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        tags.truncate(limit.max(0) as usize);
        Ok(tags)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|c| c.user.username == username) {
            return Err(Error::Conflict(format!("Username '{}' is taken", username)));
        }
        let user = User {
            id: new_v7(),
            username: username.to_string(),
            created_at: Utc::now(),
        };
        inner.users.insert(
            user.id,
            UserCredentials {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|c| c.user.username == username)
            .cloned())
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .get(&id)
            .map(|c| c.user.clone()))
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&user_id) {
            return Err(Error::NotFound(format!("user {}", user_id)));
        }
        if inner.sessions.contains_key(token_hash) {
            return Err(Error::Conflict("session token already exists".to_string()));
        }
        let session = Session {
            token_hash: token_hash.to_string(),
            user_id,
            created_at: Utc::now(),
            expires_at,
        };
        inner
            .sessions
            .insert(session.token_hash.clone(), session.clone());
        Ok(session)
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>> {
        Ok(self.inner.read().await.sessions.get(token_hash).cloned())
    }

    async fn revoke_session(&self, token_hash: &str) -> Result<bool> {
        Ok(self
            .inner
            .write()
            .await
            .sessions
            .remove(token_hash)
            .is_some())
    }

    async fn purge_expired_sessions(&self) -> Result<u64> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        let before = inner.sessions.len();
        inner.sessions.retain(|_, session| !session.is_expired(now));
        Ok((before - inner.sessions.len()) as u64)
    }
}
