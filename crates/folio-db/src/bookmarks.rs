//! Bookmark repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use folio_core::{
    Bookmark, BookmarkPage, BookmarkRepository, CreateBookmarkRequest, Error, Result,
};

use crate::schema::PERSONALIZATION_SCHEMA;

/// PostgreSQL implementation of [`BookmarkRepository`], backed by the
/// shared `search_system` schema.
pub struct PgBookmarkRepository {
    pool: PgPool,
}

impl PgBookmarkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: PgRow) -> Bookmark {
        Bookmark {
            id: row.get("id"),
            user_id: row.get("user_id"),
            manuscript_id: row.get("manuscript_id"),
            category: row.get("category"),
            keyword: row.get("keyword"),
            preview: row.get("preview"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl BookmarkRepository for PgBookmarkRepository {
    async fn create(&self, req: CreateBookmarkRequest) -> Result<Bookmark> {
        // The no-op DO UPDATE makes RETURNING yield the existing row on
        // conflict, so re-bookmarking returns the original id and
        // created_at instead of erroring or duplicating.
        let row = sqlx::query(&format!(
            r#"INSERT INTO "{PERSONALIZATION_SCHEMA}".bookmark
                   (id, user_id, manuscript_id, category, keyword, preview, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               ON CONFLICT (user_id, manuscript_id)
               DO UPDATE SET manuscript_id = EXCLUDED.manuscript_id
               RETURNING id, user_id, manuscript_id, category, keyword, preview, created_at"#
        ))
        .bind(Uuid::now_v7())
        .bind(&req.user_id)
        .bind(req.manuscript_id)
        .bind(&req.category)
        .bind(&req.keyword)
        .bind(&req.preview)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Self::map_row(row))
    }

    async fn delete_by_id(&self, user_id: &str, bookmark_id: Uuid) -> Result<()> {
        let result = sqlx::query(&format!(
            r#"DELETE FROM "{PERSONALIZATION_SCHEMA}".bookmark
               WHERE user_id = $1 AND id = $2"#
        ))
        .bind(user_id)
        .bind(bookmark_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("bookmark {}", bookmark_id)));
        }
        Ok(())
    }

    async fn delete_by_manuscript(&self, user_id: &str, manuscript_id: Uuid) -> Result<()> {
        let result = sqlx::query(&format!(
            r#"DELETE FROM "{PERSONALIZATION_SCHEMA}".bookmark
               WHERE user_id = $1 AND manuscript_id = $2"#
        ))
        .bind(user_id)
        .bind(manuscript_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!(
                "bookmark for manuscript {}",
                manuscript_id
            )));
        }
        Ok(())
    }

    async fn list(&self, user_id: &str, skip: i64, limit: i64) -> Result<BookmarkPage> {
        let total_row = sqlx::query(&format!(
            r#"SELECT COUNT(*) AS total FROM "{PERSONALIZATION_SCHEMA}".bookmark
               WHERE user_id = $1"#
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let rows = sqlx::query(&format!(
            r#"SELECT id, user_id, manuscript_id, category, keyword, preview, created_at
               FROM "{PERSONALIZATION_SCHEMA}".bookmark
               WHERE user_id = $1
               ORDER BY created_at DESC
               OFFSET $2 LIMIT $3"#
        ))
        .bind(user_id)
        .bind(skip.max(0))
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(BookmarkPage {
            bookmarks: rows.into_iter().map(Self::map_row).collect(),
            total: total_row.get::<i64, _>("total"),
            skip,
            limit,
        })
    }

    async fn check(&self, user_id: &str, manuscript_id: Uuid) -> Result<Option<Uuid>> {
        let row = sqlx::query(&format!(
            r#"SELECT id FROM "{PERSONALIZATION_SCHEMA}".bookmark
               WHERE user_id = $1 AND manuscript_id = $2"#
        ))
        .bind(user_id)
        .bind(manuscript_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| r.get("id")))
    }
}
