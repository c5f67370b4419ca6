//! Scatter-gather search coordinator.
//!
//! Answers "search for `query`, optionally within `category`, returning
//! page `(skip, limit)` of globally best-ranked, non-deleted matches".
//! With a category the coordinator delegates to that single partition;
//! without one it fans the predicate out to every registered partition
//! concurrently, merges the locally-ranked slices, re-ranks them with the
//! injected score strategy, and windows the merged set.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use folio_core::{
    Error, Manuscript, ManuscriptFilter, PartitionSet, PartitionStore, Result, SearchPage,
};

use crate::fanout::{fan_out, FanOutConfig};
use crate::score::{KeywordContentScorer, ScoreStrategy};

/// Queries longer than this are rejected before touching storage.
pub const MAX_QUERY_LEN: usize = 200;

/// Upper bound on a single page.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page size applied when the caller passes none.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A federated search request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    /// When present, only this partition is queried (no fan-out).
    pub category: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

/// Coordinates search across an injected partition set.
pub struct SearchCoordinator {
    partitions: PartitionSet,
    scorer: Arc<dyn ScoreStrategy>,
    config: FanOutConfig,
}

impl SearchCoordinator {
    pub fn new(partitions: PartitionSet) -> Self {
        Self {
            partitions,
            scorer: Arc::new(KeywordContentScorer),
            config: FanOutConfig::default(),
        }
    }

    /// Replace the relevance strategy. Merge and pagination logic are
    /// unaffected by the choice of scorer.
    pub fn with_scorer(mut self, scorer: Arc<dyn ScoreStrategy>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_config(mut self, config: FanOutConfig) -> Self {
        self.config = config;
        self
    }

    fn validate_query(query: &str) -> Result<&str> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("query must not be empty".to_string()));
        }
        if trimmed.chars().count() > MAX_QUERY_LEN {
            return Err(Error::Validation(format!(
                "query exceeds {} characters",
                MAX_QUERY_LEN
            )));
        }
        Ok(trimmed)
    }

    fn clamp_page(skip: i64, limit: i64) -> (i64, i64) {
        (skip.max(0), limit.clamp(1, MAX_PAGE_SIZE))
    }

    /// Federated search. See module docs for the fan-out contract; the
    /// call fails only when every partition fails.
    pub async fn search(&self, req: SearchRequest) -> Result<SearchPage> {
        let start = Instant::now();
        let query = Self::validate_query(&req.query)?;
        let (skip, limit) = Self::clamp_page(req.skip, req.limit);
        let filter = ManuscriptFilter::query(query);

        let page = match &req.category {
            Some(category) => {
                let store = self
                    .partitions
                    .get(category)
                    .ok_or_else(|| Error::NotFound(format!("category '{}'", category)))?;
                let documents = store.find(&filter, skip, limit).await?;
                let total = store.count(&filter).await?;
                SearchPage {
                    documents,
                    total,
                    skip,
                    limit,
                    truncated: false,
                }
            }
            None => {
                let candidates = self.gather(&filter, skip, limit).await?;
                self.rank_and_window(query, candidates, skip, limit)
            }
        };

        info!(
            subsystem = "search",
            component = "coordinator",
            op = "search",
            query,
            partition_count = self.partitions.len(),
            result_count = page.documents.len(),
            total = page.total,
            truncated = page.truncated,
            duration_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );
        Ok(page)
    }

    /// Public listing: visible, non-deleted manuscripts ordered by
    /// recency. No relevance scoring.
    pub async fn list_visible(
        &self,
        category: Option<&str>,
        skip: i64,
        limit: i64,
    ) -> Result<SearchPage> {
        let (skip, limit) = Self::clamp_page(skip, limit);
        let filter = ManuscriptFilter::visible();

        match category {
            Some(category) => {
                let store = self
                    .partitions
                    .get(category)
                    .ok_or_else(|| Error::NotFound(format!("category '{}'", category)))?;
                let documents = store.find(&filter, skip, limit).await?;
                let total = store.count(&filter).await?;
                Ok(SearchPage {
                    documents,
                    total,
                    skip,
                    limit,
                    truncated: false,
                })
            }
            None => {
                let gathered = self.gather(&filter, skip, limit).await?;
                let mut merged = gathered.candidates;
                merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                let documents = merged
                    .into_iter()
                    .skip(skip as usize)
                    .take(limit as usize)
                    .collect();
                Ok(SearchPage {
                    documents,
                    total: gathered.total,
                    skip,
                    limit,
                    truncated: gathered.truncated,
                })
            }
        }
    }

    /// Fan the predicate out to every partition, requesting up to
    /// `skip + limit` candidates each so the globally correct top page is
    /// derivable without a second round-trip. Partition failures are
    /// isolated; only all-partitions-failed aborts.
    async fn gather(
        &self,
        filter: &ManuscriptFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Gathered> {
        // skip is caller-controlled; saturate instead of overflowing
        let budget = skip.saturating_add(limit);
        let filter = Arc::new(filter.clone());

        let results = fan_out(
            &self.partitions,
            &self.config,
            |store: Arc<dyn PartitionStore>| {
                let filter = Arc::clone(&filter);
                async move {
                    let docs = store.find(&filter, 0, budget).await?;
                    let count = store.count(&filter).await?;
                    Ok((docs, count))
                }
            },
        )
        .await;

        let partition_count = results.len();
        let mut gathered = Gathered {
            candidates: Vec::new(),
            total: 0,
            truncated: false,
        };
        let mut failed = 0usize;

        for (category, result) in results {
            match result {
                Ok((docs, count)) => {
                    // A partition that filled its candidate budget while
                    // counting more matches cannot rank its deep tail here.
                    if count > budget && docs.len() as i64 == budget {
                        gathered.truncated = true;
                    }
                    gathered.total += count;
                    gathered.candidates.extend(docs);
                }
                Err(e) => {
                    failed += 1;
                    warn!(
                        subsystem = "search",
                        component = "coordinator",
                        op = "gather",
                        partition = category,
                        error = %e,
                        "Partition excluded from fan-out"
                    );
                }
            }
        }

        if partition_count > 0 && failed == partition_count {
            return Err(Error::PartitionUnavailable {
                category: "*".to_string(),
                reason: format!("all {} partitions failed", partition_count),
            });
        }
        Ok(gathered)
    }

    /// Score, stable-sort by `(score desc, created_at desc)`, and slice
    /// the requested window from the merged candidate list.
    fn rank_and_window(
        &self,
        query: &str,
        gathered: Gathered,
        skip: i64,
        limit: i64,
    ) -> SearchPage {
        let mut scored: Vec<(f64, Manuscript)> = gathered
            .candidates
            .into_iter()
            .map(|m| (self.scorer.score(query, &m), m))
            .collect();

        // Stable sort: ties beyond (score, created_at) keep fan-in
        // arrival order, which is unspecified.
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.1.created_at.cmp(&a.1.created_at))
        });

        let documents = scored
            .into_iter()
            .map(|(_, m)| m)
            .skip(skip as usize)
            .take(limit as usize)
            .collect();

        SearchPage {
            documents,
            total: gathered.total,
            skip,
            limit,
            truncated: gathered.truncated,
        }
    }
}

struct Gathered {
    candidates: Vec<Manuscript>,
    total: i64,
    truncated: bool,
}
