//! Search history repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use folio_core::{Error, HistoryRepository, Result, SearchHistoryEntry};

use crate::schema::PERSONALIZATION_SCHEMA;

/// PostgreSQL implementation of [`HistoryRepository`]. One row per
/// `(user, keyword)` pair; repeat saves refresh `searched_at`.
pub struct PgHistoryRepository {
    pool: PgPool,
}

impl PgHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: PgRow) -> SearchHistoryEntry {
        SearchHistoryEntry {
            id: row.get("id"),
            user_id: row.get("user_id"),
            keyword: row.get("keyword"),
            category: row.get("category"),
            searched_at: row.get("searched_at"),
        }
    }
}

#[async_trait]
impl HistoryRepository for PgHistoryRepository {
    async fn record(
        &self,
        user_id: &str,
        keyword: &str,
        category: Option<&str>,
    ) -> Result<SearchHistoryEntry> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO "{PERSONALIZATION_SCHEMA}".search_history
                   (id, user_id, keyword, category, searched_at)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (user_id, keyword)
               DO UPDATE SET searched_at = EXCLUDED.searched_at,
                             category = EXCLUDED.category
               RETURNING id, user_id, keyword, category, searched_at"#
        ))
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(keyword)
        .bind(category)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Self::map_row(row))
    }

    async fn list(&self, user_id: &str, limit: i64) -> Result<Vec<SearchHistoryEntry>> {
        let rows = sqlx::query(&format!(
            r#"SELECT id, user_id, keyword, category, searched_at
               FROM "{PERSONALIZATION_SCHEMA}".search_history
               WHERE user_id = $1
               ORDER BY searched_at DESC
               LIMIT $2"#
        ))
        .bind(user_id)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(Self::map_row).collect())
    }

    async fn delete(&self, user_id: &str, keyword: Option<&str>) -> Result<u64> {
        let result = match keyword {
            Some(kw) => {
                sqlx::query(&format!(
                    r#"DELETE FROM "{PERSONALIZATION_SCHEMA}".search_history
                       WHERE user_id = $1 AND keyword = $2"#
                ))
                .bind(user_id)
                .bind(kw)
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    r#"DELETE FROM "{PERSONALIZATION_SCHEMA}".search_history
                       WHERE user_id = $1"#
                ))
                .bind(user_id)
                .execute(&self.pool)
                .await
            }
        }
        .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }
}
