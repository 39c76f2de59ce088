//! Tag store implementation over the `tags` and `bookmark_tags` tables.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use bookmarko_core::{new_v7, Error, Result, Tag, TagStore, TagWithCount};

/// PostgreSQL implementation of TagStore.
#[derive(Clone)]
pub struct PgTagStore {
    pool: Pool<Postgres>,
}

impl PgTagStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_tag(row: &PgRow) -> Tag {
    Tag {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl TagStore for PgTagStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT id, user_id, name, created_at FROM tags WHERE user_id = $1 ORDER BY name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_tag).collect())
    }

    async fn find_by_names(&self, user_id: Uuid, names: &[String]) -> Result<Vec<Tag>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(
            "SELECT id, user_id, name, created_at FROM tags
             WHERE user_id = $1 AND name = ANY($2)",
        )
        .bind(user_id)
        .bind(names)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_tag).collect())
    }

    async fn insert_many(&self, user_id: Uuid, names: &[String]) -> Result<Vec<Tag>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = names.iter().map(|_| new_v7()).collect();

        // Single statement: a duplicate name aborts the whole insert.
        let rows = sqlx::query(
            "INSERT INTO tags (id, user_id, name, created_at)
             SELECT t.id, $2, t.name, $4
             FROM UNNEST($1::uuid[], $3::text[]) AS t(id, name)
             RETURNING id, user_id, name, created_at",
        )
        .bind(&ids)
        .bind(user_id)
        .bind(names)
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_tag).collect())
    }

    async fn link(&self, user_id: Uuid, bookmark_id: Uuid, tag_ids: &[Uuid]) -> Result<()> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        let link_ids: Vec<Uuid> = tag_ids.iter().map(|_| new_v7()).collect();

        sqlx::query(
            "INSERT INTO bookmark_tags (id, bookmark_id, tag_id, user_id, created_at)
             SELECT l.id, $2, l.tag_id, $4, $5
             FROM UNNEST($1::uuid[], $3::uuid[]) WITH ORDINALITY AS l(id, tag_id, ord)
             ORDER BY l.ord
             ON CONFLICT (bookmark_id, tag_id) DO NOTHING",
        )
        .bind(&link_ids)
        .bind(bookmark_id)
        .bind(tag_ids)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn unlink_all(&self, user_id: Uuid, bookmark_id: Uuid) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM bookmark_tags WHERE bookmark_id = $1 AND user_id = $2")
                .bind(bookmark_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }

    async fn unlink(&self, user_id: Uuid, bookmark_id: Uuid, tag_ids: &[Uuid]) -> Result<u64> {
        if tag_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "DELETE FROM bookmark_tags
             WHERE bookmark_id = $1 AND user_id = $2 AND tag_id = ANY($3)",
        )
        .bind(bookmark_id)
        .bind(user_id)
        .bind(tag_ids)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }

    async fn names_for_bookmark(&self, bookmark_id: Uuid) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT t.name FROM bookmark_tags bt
             JOIN tags t ON t.id = bt.tag_id
             WHERE bt.bookmark_id = $1
             ORDER BY bt.created_at, bt.id",
        )
        .bind(bookmark_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(|r| r.get("name")).collect())
    }

    async fn names_for_bookmarks(
        &self,
        bookmark_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<String>>> {
        if bookmark_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query(
            "SELECT bt.bookmark_id, t.name FROM bookmark_tags bt
             JOIN tags t ON t.id = bt.tag_id
             WHERE bt.bookmark_id = ANY($1)
             ORDER BY bt.bookmark_id, bt.created_at, bt.id",
        )
        .bind(bookmark_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut map: HashMap<Uuid, Vec<String>> = HashMap::new();
        for row in rows {
            map.entry(row.get("bookmark_id"))
                .or_default()
                .push(row.get("name"));
        }
        Ok(map)
    }

    async fn list_with_counts(&self, user_id: Uuid) -> Result<Vec<TagWithCount>> {
        let rows = sqlx::query(
            "SELECT t.id, t.name, COUNT(bt.id) AS bookmark_count
             FROM tags t
             LEFT JOIN bookmark_tags bt ON bt.tag_id = t.id
             WHERE t.user_id = $1
             GROUP BY t.id, t.name
             ORDER BY t.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(|row| TagWithCount {
                id: row.get("id"),
                name: row.get("name"),
                bookmark_count: row.get("bookmark_count"),
            })
            .collect())
    }

    async fn recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT id, user_id, name, created_at FROM tags
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_tag).collect())
    }
}
