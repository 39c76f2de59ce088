//! Tag reconciliation.
//!
//! Keeps a bookmark's tags consistent with the owning user's vocabulary:
//! missing tags are created, links are added if absent. Reconciliation never
//! fails its caller; persistence errors are logged and reported as `false`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use bookmarko_core::{
    normalize_tag_names, write_or_recover, Error, Result, Tag, TagStore, TagWithCount,
};

/// Reconciles bookmark tag sets against a [`TagStore`].
#[derive(Clone)]
pub struct TagReconciler {
    store: Arc<dyn TagStore>,
}

impl TagReconciler {
    pub fn new(store: Arc<dyn TagStore>) -> Self {
        Self { store }
    }

    /// Ensure every named tag exists for the user and is linked to the
    /// bookmark. Existing links are kept.
    pub async fn add_tags_to_bookmark<S: AsRef<str>>(
        &self,
        user_id: Uuid,
        bookmark_id: Uuid,
        tag_names: &[S],
    ) -> bool {
        let names = normalize_tag_names(tag_names);
        if names.is_empty() {
            return true;
        }

        let start = Instant::now();
        match self.link_names(user_id, bookmark_id, &names).await {
            Ok(()) => {
                info!(
                    subsystem = "tags",
                    component = "reconciler",
                    op = "add_tags",
                    %user_id,
                    %bookmark_id,
                    tag_count = names.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Tags linked"
                );
                true
            }
            Err(e) => {
                error!(
                    subsystem = "tags",
                    component = "reconciler",
                    op = "add_tags",
                    %user_id,
                    %bookmark_id,
                    tag_count = names.len(),
                    error = %e,
                    "Failed to add tags to bookmark"
                );
                false
            }
        }
    }

    /// Replace the bookmark's whole tag set. An empty set clears the tags.
    pub async fn update_bookmark_tags<S: AsRef<str>>(
        &self,
        user_id: Uuid,
        bookmark_id: Uuid,
        tag_names: &[S],
    ) -> bool {
        match self.store.unlink_all(user_id, bookmark_id).await {
            Ok(removed) => debug!(
                subsystem = "tags",
                component = "reconciler",
                op = "update_tags",
                %bookmark_id,
                result_count = removed,
                "Cleared existing links"
            ),
            Err(e) => {
                error!(
                    subsystem = "tags",
                    component = "reconciler",
                    op = "update_tags",
                    %user_id,
                    %bookmark_id,
                    error = %e,
                    "Failed to clear bookmark tags"
                );
                return false;
            }
        }
        self.add_tags_to_bookmark(user_id, bookmark_id, tag_names)
            .await
    }

    /// Tag names linked to the bookmark, in link order. Empty on any error.
    pub async fn get_tags_for_bookmark(&self, bookmark_id: Uuid) -> Vec<String> {
        match self.store.names_for_bookmark(bookmark_id).await {
            Ok(names) => names,
            Err(e) => {
                warn!(
                    subsystem = "tags",
                    component = "reconciler",
                    op = "get_tags",
                    %bookmark_id,
                    error = %e,
                    "Failed to load bookmark tags"
                );
                Vec::new()
            }
        }
    }

    /// Tag names for several bookmarks in one read. Bookmarks without tags
    /// are absent from the map; on error the map is empty.
    pub async fn get_tags_for_bookmarks(&self, bookmark_ids: &[Uuid]) -> HashMap<Uuid, Vec<String>> {
        match self.store.names_for_bookmarks(bookmark_ids).await {
            Ok(map) => map,
            Err(e) => {
                warn!(
                    subsystem = "tags",
                    component = "reconciler",
                    op = "get_tags",
                    result_count = bookmark_ids.len(),
                    error = %e,
                    "Failed to load tags for bookmarks"
                );
                HashMap::new()
            }
        }
    }

    /// Unlink the named tags from the bookmark. Names the user does not
    /// have are ignored.
    pub async fn remove_tags_from_bookmark<S: AsRef<str>>(
        &self,
        user_id: Uuid,
        bookmark_id: Uuid,
        tag_names: &[S],
    ) -> bool {
        let names = normalize_tag_names(tag_names);
        if names.is_empty() {
            return true;
        }

        let result = async {
            let tags = self.store.find_by_names(user_id, &names).await?;
            if tags.is_empty() {
                return Ok::<u64, Error>(0);
            }
            let ids: Vec<Uuid> = tags.iter().map(|t| t.id).collect();
            self.store.unlink(user_id, bookmark_id, &ids).await
        }
        .await;

        match result {
            Ok(removed) => {
                debug!(
                    subsystem = "tags",
                    component = "reconciler",
                    op = "remove_tags",
                    %bookmark_id,
                    result_count = removed,
                    "Tags unlinked"
                );
                true
            }
            Err(e) => {
                error!(
                    subsystem = "tags",
                    component = "reconciler",
                    op = "remove_tags",
                    %user_id,
                    %bookmark_id,
                    error = %e,
                    "Failed to remove tags from bookmark"
                );
                false
            }
        }
    }

    /// The user's vocabulary with bookmark counts, ordered by name.
    pub async fn list_tags(&self, user_id: Uuid) -> Result<Vec<TagWithCount>> {
        self.store.list_with_counts(user_id).await
    }

    /// Names of the most recently created tags, newest first.
    pub async fn recent_tags(&self, user_id: Uuid, limit: i64) -> Result<Vec<String>> {
        let tags = self.store.recent(user_id, limit).await?;
        Ok(tags.into_iter().map(|t| t.name).collect())
    }

    async fn link_names(&self, user_id: Uuid, bookmark_id: Uuid, names: &[String]) -> Result<()> {
        // One read of the whole vocabulary rather than a lookup per name.
        let mut resolved: HashMap<String, Uuid> = self
            .store
            .list_for_user(user_id)
            .await?
            .into_iter()
            .map(|t| (t.name, t.id))
            .collect();

        let missing: Vec<String> = names
            .iter()
            .filter(|n| !resolved.contains_key(n.as_str()))
            .cloned()
            .collect();

        if !missing.is_empty() {
            debug!(
                subsystem = "tags",
                component = "reconciler",
                op = "create_tags",
                %user_id,
                tag_count = missing.len(),
                "Creating missing tags"
            );
            let outcome = write_or_recover(
                || self.store.insert_many(user_id, &missing),
                || self.recover_missing(user_id, &missing),
            )
            .await?;
            if outcome.was_recovered() {
                info!(
                    subsystem = "tags",
                    component = "reconciler",
                    op = "create_tags",
                    %user_id,
                    tag_count = missing.len(),
                    "Recovered tags created by a concurrent writer"
                );
            }
            resolved.extend(outcome.into_inner().into_iter().map(|t| (t.name, t.id)));
        }

        let ids = names
            .iter()
            .map(|n| {
                resolved
                    .get(n)
                    .copied()
                    .ok_or_else(|| Error::Internal(format!("tag '{}' was not resolved", n)))
            })
            .collect::<Result<Vec<Uuid>>>()?;

        self.store.link(user_id, bookmark_id, &ids).await
    }

    /// Re-read the missing names after a conflict.
    ///
    /// A batch insert is all-or-nothing, so names the concurrent writer did
    /// not create are still absent. Those are created one at a time, each
    /// with its own single re-read on conflict.
    async fn recover_missing(&self, user_id: Uuid, missing: &[String]) -> Result<Vec<Tag>> {
        let mut found = self.store.find_by_names(user_id, missing).await?;
        let still_missing: Vec<String> = missing
            .iter()
            .filter(|n| !found.iter().any(|t| &t.name == *n))
            .cloned()
            .collect();

        for name in still_missing {
            let single = std::slice::from_ref(&name);
            let tags = write_or_recover(
                || self.store.insert_many(user_id, single),
                || self.store.find_by_names(user_id, single),
            )
            .await?
            .into_inner();
            found.extend(tags);
        }
        Ok(found)
    }
}
