//! Shared fixtures: in-memory partition sets seeded with fully-formed
//! manuscripts so tests control `created_at` and lifecycle flags.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use folio_core::{Manuscript, MemoryPartition, PartitionSet, PartitionStore};
use uuid::Uuid;

pub fn manuscript(
    keyword: &str,
    content: &str,
    engine: &str,
    created_at: DateTime<Utc>,
) -> Manuscript {
    Manuscript {
        id: Uuid::new_v4(),
        category: String::new(),
        content: content.to_string(),
        keyword: keyword.to_string(),
        engine: engine.to_string(),
        created_at,
        updated_at: None,
        deleted: false,
        deleted_at: None,
        visible: true,
        visibility_updated_at: None,
        update_memo: None,
    }
}

/// `n` hours before now, so relative recency is explicit at the call site.
pub fn hours_ago(n: i64) -> DateTime<Utc> {
    Utc::now() - Duration::hours(n)
}

pub fn partitions(categories: &[&str]) -> (PartitionSet, Vec<Arc<MemoryPartition>>) {
    let stores: Vec<Arc<MemoryPartition>> = categories
        .iter()
        .map(|c| Arc::new(MemoryPartition::new(c)))
        .collect();
    let set = PartitionSet::new(
        stores
            .iter()
            .map(|s| s.clone() as Arc<dyn PartitionStore>)
            .collect(),
    );
    (set, stores)
}
