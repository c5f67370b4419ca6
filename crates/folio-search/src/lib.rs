//! Federated search and aggregation over category partitions.
//!
//! This crate holds the scatter-gather layer: a [`SearchCoordinator`] that
//! fans queries out to every registered partition, merges and re-ranks the
//! partial results, and an [`AggregationEngine`] that computes popularity,
//! volume and autocomplete reports by summing per-partition group counts.
//! Neither type knows what backs a partition; both depend only on the
//! `PartitionStore` trait from `folio-core`.

pub mod aggregate;
pub mod coordinator;
pub mod fanout;
pub mod score;

pub use aggregate::{AggregationEngine, MIN_AUTOCOMPLETE_LEN};
pub use coordinator::{
    SearchCoordinator, SearchRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MAX_QUERY_LEN,
};
pub use fanout::{fan_out, FanOutConfig, DEFAULT_CONCURRENCY, DEFAULT_PARTITION_TIMEOUT};
pub use score::{KeywordContentScorer, ScoreStrategy, KEYWORD_MATCH_BONUS};
