//! Shared application state.

use std::sync::Arc;

use folio_core::{BookmarkRepository, HistoryRepository, PartitionSet};
use folio_db::LifecycleManager;
use folio_search::{AggregationEngine, SearchCoordinator};

/// Everything the handlers need, behind `Arc`s so the state clones
/// cheaply per request. Repositories are trait objects so tests can run
/// the full router over in-memory backends.
#[derive(Clone)]
pub struct AppState {
    pub partitions: PartitionSet,
    pub coordinator: Arc<SearchCoordinator>,
    pub aggregation: Arc<AggregationEngine>,
    pub lifecycle: LifecycleManager,
    pub bookmarks: Arc<dyn BookmarkRepository>,
    pub history: Arc<dyn HistoryRepository>,
}

impl AppState {
    pub fn new(
        partitions: PartitionSet,
        bookmarks: Arc<dyn BookmarkRepository>,
        history: Arc<dyn HistoryRepository>,
    ) -> Self {
        Self {
            coordinator: Arc::new(SearchCoordinator::new(partitions.clone())),
            aggregation: Arc::new(AggregationEngine::new(partitions.clone())),
            lifecycle: LifecycleManager::new(partitions.clone()),
            partitions,
            bookmarks,
            history,
        }
    }
}
