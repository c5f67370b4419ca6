//! Search, autocomplete and report endpoints.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use folio_core::{KeywordCount, Period, PopularReport, SearchPage, StatsPeriod, StatsReport};
use folio_search::{SearchRequest, DEFAULT_PAGE_SIZE};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: String,
    category: Option<String>,
    #[serde(default)]
    skip: i64,
    limit: Option<i64>,
}

/// GET /api/search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchPage>> {
    let page = state
        .coordinator
        .search(SearchRequest {
            query: params.q,
            category: params.category,
            skip: params.skip,
            limit: params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        })
        .await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteParams {
    q: String,
    limit: Option<usize>,
}

/// GET /api/autocomplete
pub async fn autocomplete(
    State(state): State<AppState>,
    Query(params): Query<AutocompleteParams>,
) -> ApiResult<Json<Vec<KeywordCount>>> {
    let suggestions = state
        .aggregation
        .autocomplete(&params.q, params.limit.unwrap_or(10))
        .await?;
    Ok(Json(suggestions))
}

#[derive(Debug, Deserialize)]
pub struct PopularParams {
    period: Option<String>,
    limit: Option<usize>,
}

/// GET /api/popular
pub async fn popular(
    State(state): State<AppState>,
    Query(params): Query<PopularParams>,
) -> ApiResult<Json<PopularReport>> {
    let period: Period = params.period.as_deref().unwrap_or("today").parse()?;
    let report = state
        .aggregation
        .popular(period, params.limit.unwrap_or(10))
        .await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    period: Option<String>,
}

/// GET /api/stats
pub async fn stats(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> ApiResult<Json<StatsReport>> {
    let period: StatsPeriod = params.period.as_deref().unwrap_or("day").parse()?;
    let report = state.aggregation.stats(period).await?;
    Ok(Json(report))
}
