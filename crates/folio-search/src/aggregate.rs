//! Cross-partition aggregation reports.
//!
//! Each report fans a typed grouping pipeline out to every partition and
//! merges the partial rows by summing counts per group key. Unlike search,
//! a failed partition is skipped silently here: a trend report computed
//! over the surviving partitions is still useful, and there is no
//! per-partition result to misattribute.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use folio_core::{
    CategoryCount, DailyCount, EngineCount, GroupKey, GroupSpec, KeywordCount, PartitionSet,
    PartitionStore, Period, PopularReport, RankedKeyword, Result, StatsPeriod, StatsReport,
};

use crate::fanout::{fan_out, FanOutConfig};

/// Autocomplete terms shorter than this return no suggestions.
pub const MIN_AUTOCOMPLETE_LEN: usize = 2;

/// Computes popularity, volume and autocomplete reports over the full
/// partition set.
pub struct AggregationEngine {
    partitions: PartitionSet,
    config: FanOutConfig,
}

impl AggregationEngine {
    pub fn new(partitions: PartitionSet) -> Self {
        Self {
            partitions,
            config: FanOutConfig::default(),
        }
    }

    pub fn with_config(mut self, config: FanOutConfig) -> Self {
        self.config = config;
        self
    }

    /// Top keywords by manuscript count within the period, ranked from 1.
    /// Ties break alphabetically so ranks are deterministic.
    pub async fn popular(&self, period: Period, limit: usize) -> Result<PopularReport> {
        let start = Instant::now();
        let since = period.start(Utc::now());
        let spec = GroupSpec::KeywordsSince(since);

        let mut counts: HashMap<String, i64> = HashMap::new();
        for row in self.gather_groups(&spec, "popular").await {
            if let GroupKey::Keyword(keyword) = row.key {
                *counts.entry(keyword).or_insert(0) += row.count;
            }
        }

        let mut merged: Vec<(String, i64)> = counts.into_iter().collect();
        merged.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        merged.truncate(limit);

        let keywords = merged
            .into_iter()
            .enumerate()
            .map(|(i, (keyword, count))| RankedKeyword {
                rank: i + 1,
                keyword,
                count,
            })
            .collect::<Vec<_>>();

        info!(
            subsystem = "aggregate",
            component = "engine",
            op = "popular",
            period = ?period,
            result_count = keywords.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Popularity report complete"
        );
        Ok(PopularReport { period, keywords })
    }

    /// Generation-volume report: totals per engine, per category and per
    /// UTC day within the period.
    pub async fn stats(&self, period: StatsPeriod) -> Result<StatsReport> {
        let start = Instant::now();
        let since = period.start(Utc::now());
        let spec = GroupSpec::EnginePerDaySince(since);

        let results = fan_out(
            &self.partitions,
            &self.config,
            |store: Arc<dyn PartitionStore>| {
                let spec = spec.clone();
                async move { store.group_counts(&spec).await }
            },
        )
        .await;

        let mut total_count = 0i64;
        let mut by_engine: HashMap<String, i64> = HashMap::new();
        let mut by_category: HashMap<String, i64> = HashMap::new();
        let mut daily: HashMap<chrono::NaiveDate, i64> = HashMap::new();

        for (category, result) in results {
            let rows = match result {
                Ok(rows) => rows,
                Err(e) => {
                    warn!(
                        subsystem = "aggregate",
                        component = "engine",
                        op = "stats",
                        partition = category,
                        error = %e,
                        "Partition skipped in aggregation"
                    );
                    continue;
                }
            };
            for row in rows {
                if let GroupKey::EngineDay { engine, day } = row.key {
                    total_count += row.count;
                    *by_engine.entry(engine).or_insert(0) += row.count;
                    *by_category.entry(category.clone()).or_insert(0) += row.count;
                    *daily.entry(day).or_insert(0) += row.count;
                }
            }
        }

        let mut by_engine: Vec<EngineCount> = by_engine
            .into_iter()
            .map(|(engine, count)| EngineCount { engine, count })
            .collect();
        by_engine.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.engine.cmp(&b.engine)));

        let mut by_category: Vec<CategoryCount> = by_category
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();
        by_category.sort_by(|a, b| {
            b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category))
        });

        let mut daily: Vec<DailyCount> = daily
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect();
        daily.sort_by_key(|d| d.date);

        info!(
            subsystem = "aggregate",
            component = "engine",
            op = "stats",
            period = ?period,
            total = total_count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Stats report complete"
        );
        Ok(StatsReport {
            period,
            total_count,
            by_engine,
            by_category,
            daily,
        })
    }

    /// Keyword suggestions: case-insensitive substring match on stored
    /// keywords, ranked by occurrence count. Terms shorter than
    /// [`MIN_AUTOCOMPLETE_LEN`] characters yield an empty list, not an
    /// error.
    pub async fn autocomplete(&self, term: &str, limit: usize) -> Result<Vec<KeywordCount>> {
        let term = term.trim();
        if term.chars().count() < MIN_AUTOCOMPLETE_LEN {
            return Ok(Vec::new());
        }
        let spec = GroupSpec::KeywordsMatching(term.to_string());

        let mut counts: HashMap<String, i64> = HashMap::new();
        for row in self.gather_groups(&spec, "autocomplete").await {
            if let GroupKey::Keyword(keyword) = row.key {
                *counts.entry(keyword).or_insert(0) += row.count;
            }
        }

        let mut merged: Vec<KeywordCount> = counts
            .into_iter()
            .map(|(keyword, count)| KeywordCount { keyword, count })
            .collect();
        merged.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.keyword.cmp(&b.keyword)));
        merged.truncate(limit);
        Ok(merged)
    }

    /// Fan a grouping pipeline out and flatten the surviving partial rows.
    async fn gather_groups(
        &self,
        spec: &GroupSpec,
        op: &'static str,
    ) -> Vec<folio_core::GroupCount> {
        let results = fan_out(
            &self.partitions,
            &self.config,
            |store: Arc<dyn PartitionStore>| {
                let spec = spec.clone();
                async move { store.group_counts(&spec).await }
            },
        )
        .await;

        let mut rows = Vec::new();
        for (category, result) in results {
            match result {
                Ok(partial) => rows.extend(partial),
                Err(e) => {
                    warn!(
                        subsystem = "aggregate",
                        component = "engine",
                        op,
                        partition = category,
                        error = %e,
                        "Partition skipped in aggregation"
                    );
                }
            }
        }
        rows
    }
}
