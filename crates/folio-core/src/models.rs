//! Data models for folio.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// MANUSCRIPT
// =============================================================================

/// A generated text document owned by exactly one category partition.
///
/// The `category` field is provenance: it is not stored on the row but
/// attached by the partition adapter at read time, identifying which
/// partition the record came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manuscript {
    pub id: Uuid,
    /// Category partition this record was read from (provenance).
    pub category: String,
    /// Text body.
    pub content: String,
    /// The originating search/generation term.
    pub keyword: String,
    /// Identifier of the generator that produced this document.
    pub engine: String,
    /// Set once at creation, immutable.
    pub created_at: DateTime<Utc>,
    /// Stamped on content edits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Terminal once true; the record is excluded from every read path.
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Public-listing visibility, orthogonal to `deleted`.
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility_updated_at: Option<DateTime<Utc>>,
    /// Free-text memo recorded with the last content update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_memo: Option<String>,
}

impl Manuscript {
    /// First `max_chars` characters of the content, on a char boundary.
    /// Used for bookmark previews.
    pub fn preview(&self, max_chars: usize) -> String {
        self.content.chars().take(max_chars).collect()
    }
}

/// A completed manuscript write from the generation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateManuscriptRequest {
    pub content: String,
    pub keyword: String,
    pub engine: String,
}

// =============================================================================
// SEARCH
// =============================================================================

/// Predicate applied by a partition store on read paths.
///
/// Deleted records are always excluded; this struct only carries the
/// caller-controlled clauses.
#[derive(Debug, Clone, Default)]
pub struct ManuscriptFilter {
    /// Case-insensitive substring matched against `content` OR `keyword`.
    pub query: Option<String>,
    /// Restrict to `visible = true`. Used only by the public listing path,
    /// never by search.
    pub visible_only: bool,
}

impl ManuscriptFilter {
    /// Filter matching every non-deleted record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Substring filter for the search path.
    pub fn query(query: &str) -> Self {
        Self {
            query: Some(query.to_string()),
            visible_only: false,
        }
    }

    /// Visible-only filter for the public listing path.
    pub fn visible() -> Self {
        Self {
            query: None,
            visible_only: true,
        }
    }
}

/// One page of a (possibly federated) manuscript query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub documents: Vec<Manuscript>,
    /// Exact total match count (sum of per-partition counts).
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
    /// True when some partition's exact count exceeds the candidate budget
    /// fetched for ranking, so pages deep enough may not materialize every
    /// counted match.
    #[serde(default)]
    pub truncated: bool,
}

// =============================================================================
// AGGREGATION
// =============================================================================

/// Typed per-partition grouping pipeline.
///
/// Every variant is restricted to non-deleted records.
#[derive(Debug, Clone)]
pub enum GroupSpec {
    /// `group by keyword -> count` over records created at/after the instant.
    KeywordsSince(DateTime<Utc>),
    /// `group by keyword -> count` over records whose keyword contains the
    /// term (case-insensitive), no time window. Used by autocomplete.
    KeywordsMatching(String),
    /// `group by (engine, utc day) -> count` over records created at/after
    /// the instant. Used by the stats report.
    EnginePerDaySince(DateTime<Utc>),
}

/// Group key of a partial aggregation result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Keyword(String),
    EngineDay { engine: String, day: NaiveDate },
}

/// One merged or partial group row.
#[derive(Debug, Clone)]
pub struct GroupCount {
    pub key: GroupKey,
    pub count: i64,
}

/// Time window for the popularity report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
}

impl Period {
    /// Window start for `now`. `Today` is UTC midnight of the current day;
    /// `Week` and `Month` are rolling windows.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Period::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .expect("midnight is always a valid time")
                .and_utc(),
            Period::Week => now - chrono::Duration::days(7),
            Period::Month => now - chrono::Duration::days(30),
        }
    }
}

impl std::str::FromStr for Period {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "today" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(crate::Error::Validation(format!(
                "unknown period '{}', expected today|week|month",
                other
            ))),
        }
    }
}

/// Time window for the stats report. `Day` is a rolling 24-hour window,
/// unlike `Period::Today` which is calendar-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    Day,
    Week,
    Month,
}

impl StatsPeriod {
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            StatsPeriod::Day => now - chrono::Duration::days(1),
            StatsPeriod::Week => now - chrono::Duration::days(7),
            StatsPeriod::Month => now - chrono::Duration::days(30),
        }
    }
}

impl std::str::FromStr for StatsPeriod {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "day" => Ok(StatsPeriod::Day),
            "week" => Ok(StatsPeriod::Week),
            "month" => Ok(StatsPeriod::Month),
            other => Err(crate::Error::Validation(format!(
                "unknown period '{}', expected day|week|month",
                other
            ))),
        }
    }
}

/// Keyword with its merged occurrence count (autocomplete rows).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: i64,
}

/// One ranked entry of the popularity report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankedKeyword {
    /// 1-based rank after the cross-partition merge.
    pub rank: usize,
    pub keyword: String,
    pub count: i64,
}

/// Popularity report: top keywords within the period, merged across
/// partitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularReport {
    pub period: Period,
    pub keywords: Vec<RankedKeyword>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineCount {
    pub engine: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// Generation-volume report, merged across partitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsReport {
    pub period: StatsPeriod,
    pub total_count: i64,
    /// Volume per engine, count descending.
    pub by_engine: Vec<EngineCount>,
    /// Volume per category partition, count descending.
    pub by_category: Vec<CategoryCount>,
    /// Volume per UTC day, date ascending.
    pub daily: Vec<DailyCount>,
}

// =============================================================================
// PERSONALIZATION
// =============================================================================

/// A user's saved pointer to a manuscript.
///
/// Weak reference: `manuscript_id` + `category` are not integrity-checked
/// against the partitions and may dangle after a manuscript is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: Uuid,
    pub user_id: String,
    pub manuscript_id: Uuid,
    pub category: String,
    pub keyword: String,
    /// Truncated content snippet captured at bookmark time.
    pub preview: String,
    pub created_at: DateTime<Utc>,
}

/// One page of a user's bookmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkPage {
    pub bookmarks: Vec<Bookmark>,
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
}

/// Most-recently-searched entry, upserted per `(user, keyword)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    pub id: Uuid,
    pub user_id: String,
    pub keyword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Refreshed on every repeat save of the same keyword.
    pub searched_at: DateTime<Utc>,
}
