//! Search history endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use folio_core::SearchHistoryEntry;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecordBody {
    pub keyword: String,
    pub category: Option<String>,
}

/// POST /api/users/:user_id/history
///
/// Upsert by `(user, keyword)`: a repeat save refreshes `searched_at`
/// instead of appending a duplicate entry.
pub async fn record(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<RecordBody>,
) -> ApiResult<Json<SearchHistoryEntry>> {
    if body.keyword.trim().is_empty() {
        return Err(folio_core::Error::Validation(
            "keyword must not be empty".to_string(),
        )
        .into());
    }
    let entry = state
        .history
        .record(&user_id, body.keyword.trim(), body.category.as_deref())
        .await?;
    Ok(Json(entry))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    limit: Option<i64>,
}

/// GET /api/users/:user_id/history
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<SearchHistoryEntry>>> {
    let entries = state
        .history
        .list(&user_id, params.limit.unwrap_or(20))
        .await?;
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    /// When present, delete only this keyword's entry; otherwise clear
    /// the user's whole history.
    keyword: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: u64,
}

/// DELETE /api/users/:user_id/history
pub async fn delete(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = state
        .history
        .delete(&user_id, params.keyword.as_deref())
        .await?;
    Ok(Json(DeleteResponse { deleted }))
}
