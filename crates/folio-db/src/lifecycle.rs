//! Manuscript lifecycle manager.
//!
//! Enforces the per-manuscript state machine over exactly one partition at
//! a time: Active/Visible ↔ Active/Hidden, with Deleted as the terminal
//! state. Content updates are orthogonal to the visibility axis. Every
//! operation locates the record by `(id, category)` first; an unknown
//! category or a record absent under that category is an error, not a
//! no-op.

use std::time::Instant;

use tracing::info;
use uuid::Uuid;

use folio_core::{Error, Manuscript, PartitionSet, Result};

/// Single-partition mutation service; never fans out.
#[derive(Clone)]
pub struct LifecycleManager {
    partitions: PartitionSet,
}

impl LifecycleManager {
    pub fn new(partitions: PartitionSet) -> Self {
        Self { partitions }
    }

    fn store(&self, category: &str) -> Result<&std::sync::Arc<dyn folio_core::PartitionStore>> {
        self.partitions
            .get(category)
            .ok_or_else(|| Error::NotFound(format!("category '{}'", category)))
    }

    /// Soft-delete a manuscript. Terminal: the record is excluded from
    /// every subsequent read path and no further transition is permitted.
    pub async fn delete(&self, category: &str, id: Uuid) -> Result<Uuid> {
        let start = Instant::now();
        self.store(category)?.soft_delete(id).await?;

        info!(
            subsystem = "lifecycle",
            component = "manager",
            op = "soft_delete",
            partition = category,
            manuscript_id = %id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Manuscript soft-deleted"
        );
        Ok(id)
    }

    /// Replace a manuscript's content, stamping `updated_at` and recording
    /// the optional memo. Allowed from either Active state; a deleted
    /// record fails as not-found.
    pub async fn update(
        &self,
        category: &str,
        id: Uuid,
        content: &str,
        memo: Option<&str>,
    ) -> Result<Manuscript> {
        if content.trim().is_empty() {
            return Err(Error::Validation(
                "updated content must not be empty".to_string(),
            ));
        }

        let manuscript = self.store(category)?.update_content(id, content, memo).await?;

        info!(
            subsystem = "lifecycle",
            component = "manager",
            op = "update_content",
            partition = category,
            manuscript_id = %id,
            "Manuscript content updated"
        );
        Ok(manuscript)
    }

    /// Flip `visible` on an Active manuscript, returning the new value.
    /// Never affects `deleted`.
    pub async fn toggle_visibility(&self, category: &str, id: Uuid) -> Result<bool> {
        let visible = self.store(category)?.toggle_visibility(id).await?;

        info!(
            subsystem = "lifecycle",
            component = "manager",
            op = "toggle_visibility",
            partition = category,
            manuscript_id = %id,
            visible,
            "Manuscript visibility toggled"
        );
        Ok(visible)
    }

    /// Fetch a single non-deleted manuscript by `(id, category)`.
    pub async fn fetch(&self, category: &str, id: Uuid) -> Result<Manuscript> {
        self.store(category)?.fetch(id).await
    }
}
