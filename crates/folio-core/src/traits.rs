//! Core traits for folio abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability. The federated
//! layer only ever talks to partitions through [`PartitionStore`], so tests
//! can inject an in-memory partition set.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// PARTITION STORE
// =============================================================================

/// Uniform read/write/aggregate contract against one category partition.
///
/// Every read path implicitly excludes `deleted = true` records. An
/// unreachable partition must surface [`crate::Error::PartitionUnavailable`]
/// rather than an empty result, so callers can distinguish "no matches"
/// from "partition down".
#[async_trait]
pub trait PartitionStore: Send + Sync {
    /// The category this partition holds. Attached to read results as
    /// provenance.
    fn category(&self) -> &str;

    /// Write a completed manuscript from the generation pipeline.
    /// The new record is Active/Visible.
    async fn insert(&self, req: CreateManuscriptRequest) -> Result<Uuid>;

    /// Fetch a single non-deleted manuscript. Absent or deleted records
    /// fail with `ManuscriptNotFound`.
    async fn fetch(&self, id: Uuid) -> Result<Manuscript>;

    /// Find matching manuscripts ordered by `created_at` descending.
    async fn find(&self, filter: &ManuscriptFilter, skip: i64, limit: i64)
        -> Result<Vec<Manuscript>>;

    /// Exact count of matching manuscripts under the same predicate.
    async fn count(&self, filter: &ManuscriptFilter) -> Result<i64>;

    /// Run a grouping pipeline over this partition, returning partial
    /// group rows for cross-partition merging.
    async fn group_counts(&self, spec: &GroupSpec) -> Result<Vec<GroupCount>>;

    /// Soft-delete: terminal. Stamps `deleted_at`. Fails `ManuscriptNotFound`
    /// when the record is absent or already deleted.
    async fn soft_delete(&self, id: Uuid) -> Result<()>;

    /// Replace content on an Active record, stamping `updated_at` and the
    /// optional memo. Fails `ManuscriptNotFound` on deleted/absent records.
    async fn update_content(
        &self,
        id: Uuid,
        content: &str,
        memo: Option<&str>,
    ) -> Result<Manuscript>;

    /// Flip `visible`, stamping `visibility_updated_at`. Returns the new
    /// value. Never touches `deleted`.
    async fn toggle_visibility(&self, id: Uuid) -> Result<bool>;
}

/// The injected, explicit registry of category partitions.
///
/// Passed into the coordinator and aggregation engine at construction; no
/// module-level global registry exists.
#[derive(Clone)]
pub struct PartitionSet {
    stores: Vec<Arc<dyn PartitionStore>>,
}

impl PartitionSet {
    pub fn new(stores: Vec<Arc<dyn PartitionStore>>) -> Self {
        Self { stores }
    }

    /// Look up one partition by category name.
    pub fn get(&self, category: &str) -> Option<&Arc<dyn PartitionStore>> {
        self.stores.iter().find(|s| s.category() == category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn PartitionStore>> {
        self.stores.iter()
    }

    pub fn categories(&self) -> Vec<String> {
        self.stores.iter().map(|s| s.category().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl std::fmt::Debug for PartitionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionSet")
            .field("categories", &self.categories())
            .finish()
    }
}

// =============================================================================
// PERSONALIZATION REPOSITORIES
// =============================================================================

/// Request for creating a bookmark. `keyword` and `preview` are captured
/// from the manuscript at bookmark time.
#[derive(Debug, Clone)]
pub struct CreateBookmarkRequest {
    pub user_id: String,
    pub manuscript_id: Uuid,
    pub category: String,
    pub keyword: String,
    pub preview: String,
}

/// Repository for user bookmarks, stored in the shared personalization
/// partition (never fanned out).
#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// Upsert by `(user_id, manuscript_id)`: re-bookmarking an existing pair
    /// returns the existing record instead of duplicating.
    async fn create(&self, req: CreateBookmarkRequest) -> Result<Bookmark>;

    /// Delete by the bookmark's own id, scoped to the owning user.
    async fn delete_by_id(&self, user_id: &str, bookmark_id: Uuid) -> Result<()>;

    /// Delete by the `(user, manuscript)` pair.
    async fn delete_by_manuscript(&self, user_id: &str, manuscript_id: Uuid) -> Result<()>;

    /// List the user's bookmarks, creation time descending.
    async fn list(&self, user_id: &str, skip: i64, limit: i64) -> Result<BookmarkPage>;

    /// Existence check: the bookmark id if the pair is bookmarked.
    async fn check(&self, user_id: &str, manuscript_id: Uuid) -> Result<Option<Uuid>>;
}

/// Repository for per-user search history: a most-recently-searched set
/// keyed by `(user, keyword)`, not an append-only log.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Upsert by `(user_id, keyword)`, refreshing `searched_at` and the
    /// category on repeat saves.
    async fn record(
        &self,
        user_id: &str,
        keyword: &str,
        category: Option<&str>,
    ) -> Result<SearchHistoryEntry>;

    /// Most recent entries by `searched_at` descending.
    async fn list(&self, user_id: &str, limit: i64) -> Result<Vec<SearchHistoryEntry>>;

    /// Delete one keyword's entry, or all of the user's history when
    /// `keyword` is `None`. Returns the number of entries removed.
    async fn delete(&self, user_id: &str, keyword: Option<&str>) -> Result<u64>;
}
