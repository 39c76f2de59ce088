//! Tag reconciler properties against the in-memory backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use bookmarko_core::{
    BookmarkRepository, CreateBookmarkRequest, Error, Result, Tag, TagStore, TagWithCount,
};
use bookmarko_db::{MemoryStore, TagReconciler};

async fn new_bookmark(store: &MemoryStore, user: Uuid, url: &str) -> Uuid {
    store
        .insert(
            user,
            &CreateBookmarkRequest {
                url: url.to_string(),
                title: url.to_string(),
                ..Default::default()
            },
        )
        .await
        .expect("insert bookmark")
        .id
}

fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}

#[tokio::test]
async fn test_add_then_get_returns_normalized_set() {
    let store = Arc::new(MemoryStore::new());
    let reconciler = TagReconciler::new(store.clone());
    let user = Uuid::new_v4();
    let other = new_bookmark(&store, user, "https://other.com").await;
    let bookmark = new_bookmark(&store, user, "https://a.com").await;

    // Pre-existing overlapping vocabulary.
    assert!(reconciler.add_tags_to_bookmark(user, other, &["rust"]).await);

    assert!(
        reconciler
            .add_tags_to_bookmark(user, bookmark, &[" Rust", "web", "WEB", ""])
            .await
    );
    assert_eq!(
        sorted(reconciler.get_tags_for_bookmark(bookmark).await),
        vec!["rust", "web"]
    );
    // "rust" was reused, not duplicated.
    assert_eq!(store.tag_row_count().await, 2);
}

#[tokio::test]
async fn test_update_with_empty_set_clears_tags() {
    let store = Arc::new(MemoryStore::new());
    let reconciler = TagReconciler::new(store.clone());
    let user = Uuid::new_v4();
    let bookmark = new_bookmark(&store, user, "https://a.com").await;

    reconciler
        .add_tags_to_bookmark(user, bookmark, &["a", "b"])
        .await;
    let empty: [&str; 0] = [];
    assert!(reconciler.update_bookmark_tags(user, bookmark, &empty).await);
    assert!(reconciler.get_tags_for_bookmark(bookmark).await.is_empty());
}

#[tokio::test]
async fn test_update_replaces_tag_set() {
    let store = Arc::new(MemoryStore::new());
    let reconciler = TagReconciler::new(store.clone());
    let user = Uuid::new_v4();
    let bookmark = new_bookmark(&store, user, "https://a.com").await;

    reconciler
        .add_tags_to_bookmark(user, bookmark, &["a", "b"])
        .await;
    assert!(
        reconciler
            .update_bookmark_tags(user, bookmark, &["b", "c"])
            .await
    );
    assert_eq!(
        sorted(reconciler.get_tags_for_bookmark(bookmark).await),
        vec!["b", "c"]
    );
}

#[tokio::test]
async fn test_add_twice_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let reconciler = TagReconciler::new(store.clone());
    let user = Uuid::new_v4();
    let bookmark = new_bookmark(&store, user, "https://a.com").await;

    assert!(reconciler.add_tags_to_bookmark(user, bookmark, &["x", "y"]).await);
    let first = reconciler.get_tags_for_bookmark(bookmark).await;
    assert!(reconciler.add_tags_to_bookmark(user, bookmark, &["x", "y"]).await);

    assert_eq!(reconciler.get_tags_for_bookmark(bookmark).await, first);
    assert_eq!(store.tag_row_count().await, 2);
}

#[tokio::test]
async fn test_get_tags_for_unknown_bookmark_is_empty() {
    let reconciler = TagReconciler::new(Arc::new(MemoryStore::new()));
    assert!(reconciler
        .get_tags_for_bookmark(Uuid::new_v4())
        .await
        .is_empty());
}

#[tokio::test]
async fn test_remove_tags() {
    let store = Arc::new(MemoryStore::new());
    let reconciler = TagReconciler::new(store.clone());
    let user = Uuid::new_v4();
    let bookmark = new_bookmark(&store, user, "https://a.com").await;

    reconciler
        .add_tags_to_bookmark(user, bookmark, &["a", "b", "c"])
        .await;
    assert!(
        reconciler
            .remove_tags_from_bookmark(user, bookmark, &["B", "nope"])
            .await
    );
    assert_eq!(reconciler.get_tags_for_bookmark(bookmark).await, vec!["a", "c"]);

    // Nothing resolves: still success.
    assert!(
        reconciler
            .remove_tags_from_bookmark(user, bookmark, &["missing"])
            .await
    );
}

#[tokio::test]
async fn test_tags_are_isolated_between_users() {
    let store = Arc::new(MemoryStore::new());
    let reconciler = TagReconciler::new(store.clone());
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let a = new_bookmark(&store, alice, "https://a.com").await;
    let b = new_bookmark(&store, bob, "https://b.com").await;

    reconciler.add_tags_to_bookmark(alice, a, &["shared"]).await;
    reconciler.add_tags_to_bookmark(bob, b, &["shared"]).await;

    assert_eq!(store.tag_row_count().await, 2);
    let alice_tags = reconciler.list_tags(alice).await.unwrap();
    assert_eq!(alice_tags.len(), 1);
    assert_eq!(alice_tags[0].bookmark_count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_create_no_duplicate_tags() {
    let store = Arc::new(MemoryStore::new());
    let reconciler = TagReconciler::new(store.clone());
    let user = Uuid::new_v4();

    let mut bookmarks = Vec::new();
    for i in 0..16 {
        bookmarks.push(new_bookmark(&store, user, &format!("https://site{}.com", i)).await);
    }

    let handles: Vec<_> = bookmarks
        .iter()
        .enumerate()
        .map(|(i, &bookmark)| {
            let reconciler = reconciler.clone();
            // Overlapping new names: every task shares "common", pairs share "pair-N".
            let names = vec![
                "common".to_string(),
                format!("pair-{}", i / 2),
                format!("own-{}", i),
            ];
            tokio::spawn(async move {
                reconciler
                    .add_tags_to_bookmark(user, bookmark, &names)
                    .await
            })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        assert!(result.expect("task panicked"));
    }

    // 1 common + 8 pairs + 16 own
    assert_eq!(store.tag_row_count().await, 25);
    for (i, bookmark) in bookmarks.iter().enumerate() {
        let tags = sorted(reconciler.get_tags_for_bookmark(*bookmark).await);
        assert_eq!(
            tags,
            sorted(vec![
                "common".to_string(),
                format!("own-{}", i),
                format!("pair-{}", i / 2),
            ])
        );
    }
}

/// Wraps a store and reports a conflict on the first `insert_many`, as if
/// another writer won the race.
///
/// The rival writer creates the first `rival_creates` names (all of them
/// when `None`). With `fail_reads_after_conflict`, every lookup after the
/// conflict errors.
struct ConflictOnce {
    inner: Arc<MemoryStore>,
    tripped: AtomicBool,
    rival_creates: Option<usize>,
    fail_reads_after_conflict: bool,
}

impl ConflictOnce {
    fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            tripped: AtomicBool::new(false),
            rival_creates: None,
            fail_reads_after_conflict: false,
        }
    }
}

#[async_trait]
impl TagStore for ConflictOnce {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Tag>> {
        self.inner.list_for_user(user_id).await
    }
    async fn find_by_names(&self, user_id: Uuid, names: &[String]) -> Result<Vec<Tag>> {
        if self.fail_reads_after_conflict && self.tripped.load(Ordering::SeqCst) {
            return Err(Error::Internal("lookup unavailable".into()));
        }
        self.inner.find_by_names(user_id, names).await
    }
    async fn insert_many(&self, user_id: Uuid, names: &[String]) -> Result<Vec<Tag>> {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            let created = self.rival_creates.unwrap_or(names.len()).min(names.len());
            self.inner.insert_many(user_id, &names[..created]).await?;
            return Err(Error::Conflict("simulated concurrent insert".into()));
        }
        self.inner.insert_many(user_id, names).await
    }
    async fn link(&self, user_id: Uuid, bookmark_id: Uuid, tag_ids: &[Uuid]) -> Result<()> {
        self.inner.link(user_id, bookmark_id, tag_ids).await
    }
    async fn unlink_all(&self, user_id: Uuid, bookmark_id: Uuid) -> Result<u64> {
        self.inner.unlink_all(user_id, bookmark_id).await
    }
    async fn unlink(&self, user_id: Uuid, bookmark_id: Uuid, tag_ids: &[Uuid]) -> Result<u64> {
        self.inner.unlink(user_id, bookmark_id, tag_ids).await
    }
    async fn names_for_bookmark(&self, bookmark_id: Uuid) -> Result<Vec<String>> {
        self.inner.names_for_bookmark(bookmark_id).await
    }
    async fn names_for_bookmarks(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<String>>> {
        self.inner.names_for_bookmarks(ids).await
    }
    async fn list_with_counts(&self, user_id: Uuid) -> Result<Vec<TagWithCount>> {
        self.inner.list_with_counts(user_id).await
    }
    async fn recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<Tag>> {
        self.inner.recent(user_id, limit).await
    }
}

#[tokio::test]
async fn test_conflict_is_recovered_by_rereading() {
    let store = Arc::new(MemoryStore::new());
    let user = Uuid::new_v4();
    let bookmark = new_bookmark(&store, user, "https://a.com").await;
    let reconciler = TagReconciler::new(Arc::new(ConflictOnce::new(store.clone())));

    assert!(
        reconciler
            .add_tags_to_bookmark(user, bookmark, &["a", "b"])
            .await
    );
    assert_eq!(
        sorted(reconciler.get_tags_for_bookmark(bookmark).await),
        vec!["a", "b"]
    );
    assert_eq!(store.tag_row_count().await, 2);
}

#[tokio::test]
async fn test_conflict_with_partial_rival_creates_remaining_names() {
    let store = Arc::new(MemoryStore::new());
    let user = Uuid::new_v4();
    let bookmark = new_bookmark(&store, user, "https://a.com").await;
    let reconciler = TagReconciler::new(Arc::new(ConflictOnce {
        rival_creates: Some(1),
        ..ConflictOnce::new(store.clone())
    }));

    assert!(
        reconciler
            .add_tags_to_bookmark(user, bookmark, &["a", "b", "c"])
            .await
    );
    assert_eq!(
        sorted(reconciler.get_tags_for_bookmark(bookmark).await),
        vec!["a", "b", "c"]
    );
    assert_eq!(store.tag_row_count().await, 3);
}

#[tokio::test]
async fn test_failed_recovery_read_reports_false() {
    let store = Arc::new(MemoryStore::new());
    let user = Uuid::new_v4();
    let bookmark = new_bookmark(&store, user, "https://a.com").await;
    let reconciler = TagReconciler::new(Arc::new(ConflictOnce {
        fail_reads_after_conflict: true,
        ..ConflictOnce::new(store.clone())
    }));

    assert!(
        !reconciler
            .add_tags_to_bookmark(user, bookmark, &["a", "b"])
            .await
    );
    assert!(store.names_for_bookmark(bookmark).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_link_failure_reports_false() {
    let store = Arc::new(MemoryStore::new());
    let reconciler = TagReconciler::new(store.clone());

    // The bookmark does not exist, so linking violates the foreign key.
    assert!(
        !reconciler
            .add_tags_to_bookmark(Uuid::new_v4(), Uuid::new_v4(), &["a"])
            .await
    );
}
