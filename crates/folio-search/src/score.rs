//! Relevance scoring for federated search results.
//!
//! The score is a deliberately cheap proxy, not an information-retrieval
//! score: no text index is guaranteed to exist under any partition, so
//! candidates are ranked from the record fields alone. The strategy is a
//! trait so a real ranking function can replace it without touching the
//! merge/pagination logic.

use folio_core::Manuscript;

/// Bonus applied when the query appears in the manuscript's keyword.
pub const KEYWORD_MATCH_BONUS: f64 = 10.0;

/// Pluggable relevance score for one candidate against one query.
pub trait ScoreStrategy: Send + Sync {
    fn score(&self, query: &str, manuscript: &Manuscript) -> f64;
}

/// Default scorer: +10 when the query is a case-insensitive substring of
/// `keyword`, plus one point per case-insensitive occurrence of the query
/// in `content`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordContentScorer;

impl ScoreStrategy for KeywordContentScorer {
    fn score(&self, query: &str, manuscript: &Manuscript) -> f64 {
        let query = query.to_lowercase();
        if query.is_empty() {
            return 0.0;
        }

        let mut score = 0.0;
        if manuscript.keyword.to_lowercase().contains(&query) {
            score += KEYWORD_MATCH_BONUS;
        }
        score += manuscript.content.to_lowercase().matches(&query).count() as f64;
        score
    }
}
