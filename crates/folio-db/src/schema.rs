//! Category schema validation and on-demand bootstrap.
//!
//! Each category partition is a PostgreSQL schema named after the category.
//! Because the partition set is unbounded and only known at runtime,
//! schemas and tables are created on demand with `IF NOT EXISTS` instead of
//! static migrations. Category names are validated before they are ever
//! interpolated into SQL.

use sqlx::PgPool;
use tracing::info;

use folio_core::{Error, Result};

/// Schema holding the personalization collections (bookmarks, history).
/// Reserved: never usable as a category name.
pub const PERSONALIZATION_SCHEMA: &str = "search_system";

/// Validate a category name for use as a PostgreSQL schema name.
///
/// Category names must:
/// - Not be empty
/// - Not exceed 63 bytes (PostgreSQL identifier limit)
/// - Contain only lowercase ASCII letters, digits, and underscores
/// - Start with a letter
/// - Not use a reserved name (`search_system`, `pg_*`, system schemas)
pub fn validate_category_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation(
            "Category name cannot be empty".to_string(),
        ));
    }

    if name.len() > 63 {
        return Err(Error::Validation(format!(
            "Category name exceeds 63 byte limit: {} bytes",
            name.len()
        )));
    }

    let first = name.chars().next().expect("non-empty checked above");
    if !first.is_ascii_lowercase() {
        return Err(Error::Validation(format!(
            "Category name must start with a lowercase letter, found: '{}'",
            first
        )));
    }

    for ch in name.chars() {
        if !ch.is_ascii_lowercase() && !ch.is_ascii_digit() && ch != '_' {
            return Err(Error::Validation(format!(
                "Category name contains invalid character: '{}'. Only lowercase letters, digits, and underscore allowed",
                ch
            )));
        }
    }

    const RESERVED: &[&str] = &[
        PERSONALIZATION_SCHEMA,
        "public",
        "pg_catalog",
        "pg_toast",
        "information_schema",
    ];
    if RESERVED.contains(&name) || name.starts_with("pg_") {
        return Err(Error::Validation(format!(
            "Category name '{}' is reserved",
            name
        )));
    }

    Ok(())
}

/// Create the schema and `manuscript` table for a category if absent.
pub async fn ensure_partition(pool: &PgPool, category: &str) -> Result<()> {
    validate_category_name(category)?;

    sqlx::query(&format!(r#"CREATE SCHEMA IF NOT EXISTS "{}""#, category))
        .execute(pool)
        .await
        .map_err(Error::Database)?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{category}".manuscript (
            id UUID PRIMARY KEY,
            content TEXT NOT NULL,
            keyword TEXT NOT NULL,
            engine TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ,
            deleted BOOLEAN NOT NULL DEFAULT FALSE,
            deleted_at TIMESTAMPTZ,
            visible BOOLEAN DEFAULT TRUE,
            visibility_updated_at TIMESTAMPTZ,
            update_memo TEXT
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(Error::Database)?;

    sqlx::query(&format!(
        r#"CREATE INDEX IF NOT EXISTS manuscript_created_at_idx
           ON "{category}".manuscript (created_at DESC)"#
    ))
    .execute(pool)
    .await
    .map_err(Error::Database)?;

    sqlx::query(&format!(
        r#"CREATE INDEX IF NOT EXISTS manuscript_keyword_idx
           ON "{category}".manuscript (keyword)"#
    ))
    .execute(pool)
    .await
    .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "schema",
        op = "ensure_partition",
        partition = category,
        "Category partition ready"
    );

    Ok(())
}

/// Create the `search_system` schema with the bookmark and search history
/// tables if absent.
pub async fn ensure_personalization(pool: &PgPool) -> Result<()> {
    sqlx::query(&format!(
        r#"CREATE SCHEMA IF NOT EXISTS "{}""#,
        PERSONALIZATION_SCHEMA
    ))
    .execute(pool)
    .await
    .map_err(Error::Database)?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{PERSONALIZATION_SCHEMA}".bookmark (
            id UUID PRIMARY KEY,
            user_id TEXT NOT NULL,
            manuscript_id UUID NOT NULL,
            category TEXT NOT NULL,
            keyword TEXT NOT NULL,
            preview TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            UNIQUE (user_id, manuscript_id)
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(Error::Database)?;

    sqlx::query(&format!(
        r#"CREATE INDEX IF NOT EXISTS bookmark_user_created_idx
           ON "{PERSONALIZATION_SCHEMA}".bookmark (user_id, created_at DESC)"#
    ))
    .execute(pool)
    .await
    .map_err(Error::Database)?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{PERSONALIZATION_SCHEMA}".search_history (
            id UUID PRIMARY KEY,
            user_id TEXT NOT NULL,
            keyword TEXT NOT NULL,
            category TEXT,
            searched_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            UNIQUE (user_id, keyword)
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(Error::Database)?;

    sqlx::query(&format!(
        r#"CREATE INDEX IF NOT EXISTS search_history_user_searched_idx
           ON "{PERSONALIZATION_SCHEMA}".search_history (user_id, searched_at DESC)"#
    ))
    .execute(pool)
    .await
    .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "schema",
        op = "ensure_personalization",
        "Personalization schema ready"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_category_names() {
        assert!(validate_category_name("diet").is_ok());
        assert!(validate_category_name("beauty").is_ok());
        assert!(validate_category_name("side_effects_2026").is_ok());
    }

    #[test]
    fn test_rejects_empty_and_long_names() {
        assert!(validate_category_name("").is_err());
        assert!(validate_category_name(&"a".repeat(64)).is_err());
        assert!(validate_category_name(&"a".repeat(63)).is_ok());
    }

    #[test]
    fn test_rejects_injection_attempts() {
        assert!(validate_category_name("diet\"; DROP TABLE manuscript; --").is_err());
        assert!(validate_category_name("diet beauty").is_err());
        assert!(validate_category_name("Diet").is_err());
        assert!(validate_category_name("1diet").is_err());
        assert!(validate_category_name("_diet").is_err());
    }

    #[test]
    fn test_rejects_reserved_names() {
        assert!(validate_category_name("search_system").is_err());
        assert!(validate_category_name("public").is_err());
        assert!(validate_category_name("pg_catalog").is_err());
        assert!(validate_category_name("pg_anything").is_err());
    }
}
