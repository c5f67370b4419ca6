//! Bookmark endpoints.
//!
//! `keyword` and `preview` are captured from the live manuscript at
//! bookmark time, so the bookmark stays renderable even after the
//! manuscript is deleted (the reference is weak).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_core::{Bookmark, BookmarkPage, CreateBookmarkRequest};

use crate::error::ApiResult;
use crate::state::AppState;

/// Characters of manuscript content captured as the bookmark preview.
const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Deserialize)]
pub struct CreateBookmarkBody {
    pub manuscript_id: Uuid,
    pub category: String,
}

/// POST /api/users/:user_id/bookmarks
///
/// Upsert by `(user, manuscript)`: re-bookmarking returns the existing
/// record with 200 instead of creating a duplicate.
pub async fn create(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<CreateBookmarkBody>,
) -> ApiResult<(StatusCode, Json<Bookmark>)> {
    let manuscript = state
        .lifecycle
        .fetch(&body.category, body.manuscript_id)
        .await?;

    let existing = state
        .bookmarks
        .check(&user_id, body.manuscript_id)
        .await?
        .is_some();

    let bookmark = state
        .bookmarks
        .create(CreateBookmarkRequest {
            user_id,
            manuscript_id: manuscript.id,
            category: manuscript.category.clone(),
            keyword: manuscript.keyword.clone(),
            preview: manuscript.preview(PREVIEW_CHARS),
        })
        .await?;

    let status = if existing {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(bookmark)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    skip: i64,
    limit: Option<i64>,
}

/// GET /api/users/:user_id/bookmarks
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<BookmarkPage>> {
    let page = state
        .bookmarks
        .list(&user_id, params.skip.max(0), params.limit.unwrap_or(20))
        .await?;
    Ok(Json(page))
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub bookmarked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmark_id: Option<Uuid>,
}

/// GET /api/users/:user_id/bookmarks/check/:manuscript_id
pub async fn check(
    State(state): State<AppState>,
    Path((user_id, manuscript_id)): Path<(String, Uuid)>,
) -> ApiResult<Json<CheckResponse>> {
    let bookmark_id = state.bookmarks.check(&user_id, manuscript_id).await?;
    Ok(Json(CheckResponse {
        bookmarked: bookmark_id.is_some(),
        bookmark_id,
    }))
}

/// DELETE /api/users/:user_id/bookmarks/:bookmark_id
pub async fn delete(
    State(state): State<AppState>,
    Path((user_id, bookmark_id)): Path<(String, Uuid)>,
) -> ApiResult<StatusCode> {
    state.bookmarks.delete_by_id(&user_id, bookmark_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/users/:user_id/bookmarks/manuscript/:manuscript_id
pub async fn delete_by_manuscript(
    State(state): State<AppState>,
    Path((user_id, manuscript_id)): Path<(String, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .bookmarks
        .delete_by_manuscript(&user_id, manuscript_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
