//! PostgreSQL partition store implementation.
//!
//! One `PgPartitionStore` wraps one category schema. All queries are
//! schema-qualified with a validated category name; read predicates always
//! exclude soft-deleted rows.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use folio_core::{
    CreateManuscriptRequest, Error, GroupCount, GroupKey, GroupSpec, Manuscript, ManuscriptFilter,
    PartitionStore, Result,
};

use crate::escape_like;
use crate::schema::validate_category_name;

/// PostgreSQL implementation of [`PartitionStore`], scoped to one category
/// schema.
pub struct PgPartitionStore {
    pool: PgPool,
    category: String,
}

impl PgPartitionStore {
    /// Create a store for the given category. The name is validated before
    /// it is ever interpolated into SQL.
    pub fn new(pool: PgPool, category: &str) -> Result<Self> {
        validate_category_name(category)?;
        Ok(Self {
            pool,
            category: category.to_string(),
        })
    }

    /// Map connection-class sqlx errors to `PartitionUnavailable` so the
    /// coordinator can distinguish a down partition from an empty result.
    fn map_err(&self, e: sqlx::Error) -> Error {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => Error::PartitionUnavailable {
                category: self.category.clone(),
                reason: e.to_string(),
            },
            other => Error::Database(other),
        }
    }

    fn map_row(&self, row: PgRow) -> Manuscript {
        Manuscript {
            id: row.get("id"),
            category: self.category.clone(),
            content: row.get("content"),
            keyword: row.get("keyword"),
            engine: row.get("engine"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            deleted: row.get("deleted"),
            deleted_at: row.get("deleted_at"),
            // Absence of the column value is treated as visible
            visible: row.get::<Option<bool>, _>("visible").unwrap_or(true),
            visibility_updated_at: row.get("visibility_updated_at"),
            update_memo: row.get("update_memo"),
        }
    }

    /// WHERE clause tail for a filter. `$1` is reserved for the query
    /// pattern when present.
    fn filter_clause(filter: &ManuscriptFilter) -> String {
        let mut clause = String::from("deleted = FALSE");
        if filter.visible_only {
            clause.push_str(" AND COALESCE(visible, TRUE) = TRUE");
        }
        if filter.query.is_some() {
            clause.push_str(" AND (content ILIKE $1 OR keyword ILIKE $1)");
        }
        clause
    }

    fn like_pattern(query: &str) -> String {
        format!("%{}%", escape_like(query))
    }

    const COLUMNS: &'static str = "id, content, keyword, engine, created_at, updated_at, \
         deleted, deleted_at, visible, visibility_updated_at, update_memo";
}

#[async_trait]
impl PartitionStore for PgPartitionStore {
    fn category(&self) -> &str {
        &self.category
    }

    async fn insert(&self, req: CreateManuscriptRequest) -> Result<Uuid> {
        let id = Uuid::now_v7();
        let result = sqlx::query(&format!(
            r#"INSERT INTO "{}".manuscript (id, content, keyword, engine, created_at, visible)
               VALUES ($1, $2, $3, $4, $5, TRUE)"#,
            self.category
        ))
        .bind(id)
        .bind(&req.content)
        .bind(&req.keyword)
        .bind(&req.engine)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| self.map_err(e))?;

        if result.rows_affected() == 0 {
            return Err(Error::StorageWrite(format!(
                "insert into partition '{}' wrote no rows",
                self.category
            )));
        }
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Manuscript> {
        let row = sqlx::query(&format!(
            r#"SELECT {} FROM "{}".manuscript WHERE id = $1 AND deleted = FALSE"#,
            Self::COLUMNS,
            self.category
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| self.map_err(e))?;

        row.map(|r| self.map_row(r))
            .ok_or(Error::ManuscriptNotFound(id))
    }

    async fn find(
        &self,
        filter: &ManuscriptFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Manuscript>> {
        let clause = Self::filter_clause(filter);
        // $1 = pattern (when present); skip/limit bound after it
        let (offset_param, limit_param) = if filter.query.is_some() {
            ("$2", "$3")
        } else {
            ("$1", "$2")
        };
        let sql = format!(
            r#"SELECT {} FROM "{}".manuscript
               WHERE {}
               ORDER BY created_at DESC
               OFFSET {} LIMIT {}"#,
            Self::COLUMNS,
            self.category,
            clause,
            offset_param,
            limit_param,
        );

        let mut q = sqlx::query(&sql);
        if let Some(query) = &filter.query {
            q = q.bind(Self::like_pattern(query));
        }
        let rows = q
            .bind(skip.max(0))
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| self.map_err(e))?;

        Ok(rows.into_iter().map(|r| self.map_row(r)).collect())
    }

    async fn count(&self, filter: &ManuscriptFilter) -> Result<i64> {
        let sql = format!(
            r#"SELECT COUNT(*) AS total FROM "{}".manuscript WHERE {}"#,
            self.category,
            Self::filter_clause(filter),
        );

        let mut q = sqlx::query(&sql);
        if let Some(query) = &filter.query {
            q = q.bind(Self::like_pattern(query));
        }
        let row = q.fetch_one(&self.pool).await.map_err(|e| self.map_err(e))?;
        Ok(row.get::<i64, _>("total"))
    }

    async fn group_counts(&self, spec: &GroupSpec) -> Result<Vec<GroupCount>> {
        match spec {
            GroupSpec::KeywordsSince(since) => {
                let rows = sqlx::query(&format!(
                    r#"SELECT keyword, COUNT(*) AS cnt FROM "{}".manuscript
                       WHERE deleted = FALSE AND created_at >= $1
                       GROUP BY keyword"#,
                    self.category
                ))
                .bind(since)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| self.map_err(e))?;

                Ok(rows
                    .into_iter()
                    .map(|r| GroupCount {
                        key: GroupKey::Keyword(r.get("keyword")),
                        count: r.get::<i64, _>("cnt"),
                    })
                    .collect())
            }
            GroupSpec::KeywordsMatching(term) => {
                let rows = sqlx::query(&format!(
                    r#"SELECT keyword, COUNT(*) AS cnt FROM "{}".manuscript
                       WHERE deleted = FALSE AND keyword ILIKE $1
                       GROUP BY keyword"#,
                    self.category
                ))
                .bind(Self::like_pattern(term))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| self.map_err(e))?;

                Ok(rows
                    .into_iter()
                    .map(|r| GroupCount {
                        key: GroupKey::Keyword(r.get("keyword")),
                        count: r.get::<i64, _>("cnt"),
                    })
                    .collect())
            }
            GroupSpec::EnginePerDaySince(since) => {
                let rows = sqlx::query(&format!(
                    r#"SELECT engine, (created_at AT TIME ZONE 'UTC')::date AS day,
                              COUNT(*) AS cnt
                       FROM "{}".manuscript
                       WHERE deleted = FALSE AND created_at >= $1
                       GROUP BY engine, day"#,
                    self.category
                ))
                .bind(since)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| self.map_err(e))?;

                Ok(rows
                    .into_iter()
                    .map(|r| GroupCount {
                        key: GroupKey::EngineDay {
                            engine: r.get("engine"),
                            day: r.get::<NaiveDate, _>("day"),
                        },
                        count: r.get::<i64, _>("cnt"),
                    })
                    .collect())
            }
        }
    }

    async fn soft_delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(&format!(
            r#"UPDATE "{}".manuscript
               SET deleted = TRUE, deleted_at = $2
               WHERE id = $1 AND deleted = FALSE"#,
            self.category
        ))
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| self.map_err(e))?;

        if result.rows_affected() == 0 {
            // Absent or already deleted: both are treated as if absent
            return Err(Error::ManuscriptNotFound(id));
        }
        Ok(())
    }

    async fn update_content(
        &self,
        id: Uuid,
        content: &str,
        memo: Option<&str>,
    ) -> Result<Manuscript> {
        let row = sqlx::query(&format!(
            r#"UPDATE "{}".manuscript
               SET content = $2, updated_at = $3, update_memo = $4
               WHERE id = $1 AND deleted = FALSE
               RETURNING {}"#,
            self.category,
            Self::COLUMNS,
        ))
        .bind(id)
        .bind(content)
        .bind(Utc::now())
        .bind(memo)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| self.map_err(e))?;

        row.map(|r| self.map_row(r))
            .ok_or(Error::ManuscriptNotFound(id))
    }

    async fn toggle_visibility(&self, id: Uuid) -> Result<bool> {
        let row = sqlx::query(&format!(
            r#"UPDATE "{}".manuscript
               SET visible = NOT COALESCE(visible, TRUE), visibility_updated_at = $2
               WHERE id = $1 AND deleted = FALSE
               RETURNING COALESCE(visible, TRUE) AS visible"#,
            self.category
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| self.map_err(e))?;

        row.map(|r| r.get::<bool, _>("visible"))
            .ok_or(Error::ManuscriptNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_clause_variants() {
        assert_eq!(
            PgPartitionStore::filter_clause(&ManuscriptFilter::all()),
            "deleted = FALSE"
        );
        assert_eq!(
            PgPartitionStore::filter_clause(&ManuscriptFilter::visible()),
            "deleted = FALSE AND COALESCE(visible, TRUE) = TRUE"
        );
        assert_eq!(
            PgPartitionStore::filter_clause(&ManuscriptFilter::query("x")),
            "deleted = FALSE AND (content ILIKE $1 OR keyword ILIKE $1)"
        );
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(PgPartitionStore::like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
