//! Bookmark list filtering and sorting.
//!
//! Applied in memory to a user's resolved bookmark list.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Deserialize;

use crate::models::BookmarkWithTags;
use crate::tags::normalize_tag_names;

/// Field bookmarks are sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    Title,
    Url,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" | "createdAt" => Ok(SortField::CreatedAt),
            "title" => Ok(SortField::Title),
            "url" => Ok(SortField::Url),
            other => Err(format!("Invalid sort field: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("Invalid sort order: {}", other)),
        }
    }
}

/// Filter and sort options for listing bookmarks.
#[derive(Debug, Clone, Default)]
pub struct BookmarkQuery {
    /// Every tag must be present on a bookmark for it to match.
    pub tags: Vec<String>,
    /// Case-insensitive substring over title, url, description and tags.
    pub search: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
}

impl BookmarkQuery {
    /// Build a query from raw parameters (`tag=a,b`, `q`, `sort`, `order`).
    pub fn from_params(
        tag: Option<&str>,
        q: Option<&str>,
        sort: Option<&str>,
        order: Option<&str>,
    ) -> Result<Self, String> {
        let tags = tag
            .map(|t| normalize_tag_names(&t.split(',').collect::<Vec<_>>()))
            .unwrap_or_default();
        let search = q
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        Ok(Self {
            tags,
            search,
            sort: sort.map(SortField::from_str).transpose()?.unwrap_or_default(),
            order: order.map(SortOrder::from_str).transpose()?.unwrap_or_default(),
        })
    }

    pub fn matches(&self, b: &BookmarkWithTags) -> bool {
        if !self.tags.iter().all(|t| b.tags.contains(t)) {
            return false;
        }
        let Some(needle) = &self.search else {
            return true;
        };
        let bm = &b.bookmark;
        bm.title.to_lowercase().contains(needle)
            || bm.url.to_lowercase().contains(needle)
            || bm
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
            || b.tags.iter().any(|t| t.contains(needle.as_str()))
    }

    fn compare(&self, a: &BookmarkWithTags, b: &BookmarkWithTags) -> Ordering {
        let (a, b) = (&a.bookmark, &b.bookmark);
        let ord = match self.sort {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Url => a.url.cmp(&b.url),
        };
        match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }

    /// Filter then sort.
    pub fn apply(&self, bookmarks: Vec<BookmarkWithTags>) -> Vec<BookmarkWithTags> {
        let mut out: Vec<_> = bookmarks.into_iter().filter(|b| self.matches(b)).collect();
        out.sort_by(|a, b| self.compare(a, b));
        out
    }
}
