//! # folio-db
//!
//! PostgreSQL storage layer for folio.
//!
//! This crate provides:
//! - Connection pool management
//! - The schema-per-category partition store ([`PgPartitionStore`])
//! - On-demand schema bootstrap for an unbounded partition set
//! - The manuscript lifecycle manager (soft-delete, update, visibility)
//! - Personalization repositories (bookmarks, search history) in the
//!   shared `search_system` schema
//!
//! ## Example
//!
//! ```rust,ignore
//! use folio_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let categories = vec!["diet".to_string(), "beauty".to_string()];
//!     let db = Database::connect("postgres://localhost/folio", &categories).await?;
//!
//!     let diet = db.partitions.get("diet").expect("registered partition");
//!     println!("partition ready: {}", diet.category());
//!     Ok(())
//! }
//! ```

pub mod bookmarks;
pub mod history;
pub mod lifecycle;
pub mod partition;
pub mod pool;
pub mod schema;

// Re-export core types
pub use folio_core::*;

pub use bookmarks::PgBookmarkRepository;
pub use history::PgHistoryRepository;
pub use lifecycle::LifecycleManager;
pub use partition::PgPartitionStore;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use schema::{
    ensure_partition, ensure_personalization, validate_category_name, PERSONALIZATION_SCHEMA,
};

use std::sync::Arc;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined database context: the partition set for the registered
/// categories plus the personalization repositories and lifecycle manager.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::PgPool,
    /// One store per registered category partition.
    pub partitions: PartitionSet,
    /// Manuscript lifecycle mutations.
    pub lifecycle: LifecycleManager,
    /// Bookmark repository (search_system schema).
    pub bookmarks: Arc<PgBookmarkRepository>,
    /// Search history repository (search_system schema).
    pub history: Arc<PgHistoryRepository>,
}

impl Database {
    /// Build a Database over an existing pool, creating any missing
    /// schemas for the registered categories.
    pub async fn new(pool: sqlx::PgPool, categories: &[String]) -> Result<Self> {
        if categories.is_empty() {
            return Err(Error::Config(
                "at least one category partition must be registered".to_string(),
            ));
        }

        for category in categories {
            schema::ensure_partition(&pool, category).await?;
        }
        schema::ensure_personalization(&pool).await?;

        let stores: Vec<Arc<dyn PartitionStore>> = categories
            .iter()
            .map(|c| {
                PgPartitionStore::new(pool.clone(), c)
                    .map(|s| Arc::new(s) as Arc<dyn PartitionStore>)
            })
            .collect::<Result<_>>()?;
        let partitions = PartitionSet::new(stores);

        Ok(Self {
            lifecycle: LifecycleManager::new(partitions.clone()),
            bookmarks: Arc::new(PgBookmarkRepository::new(pool.clone())),
            history: Arc::new(PgHistoryRepository::new(pool.clone())),
            partitions,
            pool,
        })
    }

    /// Connect with default pool configuration.
    pub async fn connect(url: &str, categories: &[String]) -> Result<Self> {
        let pool = create_pool(url).await?;
        Self::new(pool, categories).await
    }

    /// Connect with custom pool configuration.
    pub async fn connect_with_config(
        url: &str,
        config: PoolConfig,
        categories: &[String],
    ) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Self::new(pool, categories).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
