//! # bookmarko-db
//!
//! Storage layer for bookmarko.
//!
//! This crate provides:
//! - Connection pool management
//! - PostgreSQL repositories for bookmarks, tags and users
//! - An in-memory backend implementing the same traits
//! - The [`TagReconciler`], generic over any [`TagStore`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bookmarko_db::{Database, PoolConfig, TagReconciler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/bookmarko", PoolConfig::default()).await?;
//!     let tags = TagReconciler::new(Arc::new(db.tags.clone()));
//!     tags.add_tags_to_bookmark(user_id, bookmark_id, &["rust", "web"]).await;
//!     Ok(())
//! }
//! ```

pub mod bookmarks;
pub mod memory;
pub mod pool;
pub mod reconciler;
pub mod tags;
pub mod test_fixtures;
pub mod users;

pub use bookmarks::PgBookmarkRepository;
pub use memory::MemoryStore;
pub use pool::{connect_pool, log_pool_metrics, PoolConfig};
pub use reconciler::TagReconciler;
pub use tags::PgTagStore;
pub use users::PgUserRepository;

// Re-export core types for convenience
pub use bookmarko_core::{
    BookmarkRepository, Error, Result, TagStore, UserRepository,
};

/// PostgreSQL repositories sharing one connection pool.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub bookmarks: PgBookmarkRepository,
    pub tags: PgTagStore,
    pub users: PgUserRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            bookmarks: PgBookmarkRepository::new(pool.clone()),
            tags: PgTagStore::new(pool.clone()),
            users: PgUserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect to the given URL.
    pub async fn connect(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = connect_pool(url, &config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
