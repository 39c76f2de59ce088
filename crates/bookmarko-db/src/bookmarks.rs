//! Bookmark repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use bookmarko_core::{
    new_v7, Bookmark, BookmarkRepository, CreateBookmarkRequest, Error, Result,
    UpdateBookmarkRequest,
};

const BOOKMARK_COLUMNS: &str =
    "id, user_id, url, title, description, favicon, metadata, created_at";

/// PostgreSQL implementation of BookmarkRepository.
#[derive(Clone)]
pub struct PgBookmarkRepository {
    pool: Pool<Postgres>,
}

impl PgBookmarkRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_bookmark(row: &PgRow) -> Bookmark {
    Bookmark {
        id: row.get("id"),
        user_id: row.get("user_id"),
        url: row.get("url"),
        title: row.get("title"),
        description: row.get("description"),
        favicon: row.get("favicon"),
        metadata: row.get("metadata"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl BookmarkRepository for PgBookmarkRepository {
    async fn insert(&self, user_id: Uuid, req: &CreateBookmarkRequest) -> Result<Bookmark> {
        req.validate().map_err(Error::InvalidInput)?;

        let row = sqlx::query(&format!(
            "INSERT INTO bookmarks (id, user_id, url, title, description, favicon, metadata, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {BOOKMARK_COLUMNS}"
        ))
        .bind(new_v7())
        .bind(user_id)
        .bind(req.url.trim())
        .bind(req.title.trim())
        .bind(&req.description)
        .bind(&req.favicon)
        .bind(&req.metadata)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row_to_bookmark(&row))
    }

    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<Bookmark> {
        let row = sqlx::query(&format!(
            "SELECT {BOOKMARK_COLUMNS} FROM bookmarks WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref()
            .map(row_to_bookmark)
            .ok_or(Error::BookmarkNotFound(id))
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Bookmark>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKMARK_COLUMNS} FROM bookmarks
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_bookmark).collect())
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        req: &UpdateBookmarkRequest,
    ) -> Result<Bookmark> {
        req.validate().map_err(Error::InvalidInput)?;

        let row = sqlx::query(&format!(
            "UPDATE bookmarks SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                favicon = COALESCE($5, favicon),
                metadata = COALESCE($6, metadata)
             WHERE id = $1 AND user_id = $2
             RETURNING {BOOKMARK_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(req.title.as_deref().map(str::trim))
        .bind(&req.description)
        .bind(&req.favicon)
        .bind(&req.metadata)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref()
            .map(row_to_bookmark)
            .ok_or(Error::BookmarkNotFound(id))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::BookmarkNotFound(id));
        }
        Ok(())
    }
}
