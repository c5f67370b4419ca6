//! Manuscript ingest, listing and lifecycle endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_core::{CreateManuscriptRequest, Error, Manuscript, SearchPage};
use folio_search::DEFAULT_PAGE_SIZE;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub category: String,
    pub content: String,
    pub keyword: String,
    pub engine: String,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub id: Uuid,
    pub category: String,
}

/// POST /api/manuscripts
///
/// The generation pipeline's completed-manuscript write. The new record
/// is Active/Visible and becomes searchable immediately.
pub async fn ingest(
    State(state): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> ApiResult<(StatusCode, Json<IngestResponse>)> {
    for (field, value) in [
        ("category", &req.category),
        ("content", &req.content),
        ("keyword", &req.keyword),
        ("engine", &req.engine),
    ] {
        if value.trim().is_empty() {
            return Err(Error::Validation(format!("{} must not be empty", field)).into());
        }
    }

    let store = state
        .partitions
        .get(&req.category)
        .ok_or_else(|| Error::NotFound(format!("category '{}'", req.category)))?;
    let id = store
        .insert(CreateManuscriptRequest {
            content: req.content,
            keyword: req.keyword,
            engine: req.engine,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            id,
            category: req.category,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    category: Option<String>,
    /// 1-based page number.
    page: Option<i64>,
    limit: Option<i64>,
}

/// GET /api/manuscripts
///
/// Public listing: visible, non-deleted manuscripts, newest first.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<SearchPage>> {
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
    let page = params.page.unwrap_or(1).max(1);
    let skip = (page - 1) * limit;

    let result = state
        .coordinator
        .list_visible(params.category.as_deref(), skip, limit)
        .await?;
    Ok(Json(result))
}

/// GET /api/manuscripts/:category/:id
pub async fn fetch(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, Uuid)>,
) -> ApiResult<Json<Manuscript>> {
    let manuscript = state.lifecycle.fetch(&category, id).await?;
    Ok(Json(manuscript))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub content: String,
    pub memo: Option<String>,
}

/// PUT /api/manuscripts/:category/:id
pub async fn update(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, Uuid)>,
    Json(req): Json<UpdateRequest>,
) -> ApiResult<Json<Manuscript>> {
    let manuscript = state
        .lifecycle
        .update(&category, id, &req.content, req.memo.as_deref())
        .await?;
    Ok(Json(manuscript))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted_id: Uuid,
}

/// DELETE /api/manuscripts/:category/:id
pub async fn delete(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, Uuid)>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted_id = state.lifecycle.delete(&category, id).await?;
    Ok(Json(DeleteResponse { deleted_id }))
}

#[derive(Debug, Serialize)]
pub struct VisibilityResponse {
    pub manuscript_id: Uuid,
    pub visible: bool,
}

/// POST /api/manuscripts/:category/:id/visibility
pub async fn toggle_visibility(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, Uuid)>,
) -> ApiResult<Json<VisibilityResponse>> {
    let visible = state.lifecycle.toggle_visibility(&category, id).await?;
    Ok(Json(VisibilityResponse {
        manuscript_id: id,
        visible,
    }))
}
