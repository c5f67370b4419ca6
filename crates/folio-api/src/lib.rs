//! # folio-api
//!
//! HTTP API server for folio: federated manuscript search, aggregation
//! reports, lifecycle management and per-user personalization over a set
//! of category partitions.
//!
//! The router is built separately from the server bootstrap so the full
//! surface can be exercised in tests with `tower::ServiceExt::oneshot`
//! against in-memory state.

pub mod error;
pub mod handlers;
pub mod state;

use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Maximum accepted request body. Manuscripts are text; nothing close to
/// this arrives in practice.
const BODY_LIMIT_BYTES: usize = 4 * 1024 * 1024;

/// Generates time-ordered UUIDv7 request correlation IDs, so request ids
/// sort chronologically in logs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// GET /health
async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

/// Build the full application router over the given state.
pub fn build_router(state: AppState) -> Router {
    use handlers::{bookmarks, history, manuscripts, search};

    Router::new()
        .route("/health", get(health))
        // Search and reports
        .route("/api/search", get(search::search))
        .route("/api/autocomplete", get(search::autocomplete))
        .route("/api/popular", get(search::popular))
        .route("/api/stats", get(search::stats))
        // Manuscripts
        .route(
            "/api/manuscripts",
            get(manuscripts::list).post(manuscripts::ingest),
        )
        .route(
            "/api/manuscripts/:category/:id",
            get(manuscripts::fetch)
                .put(manuscripts::update)
                .delete(manuscripts::delete),
        )
        .route(
            "/api/manuscripts/:category/:id/visibility",
            post(manuscripts::toggle_visibility),
        )
        // Bookmarks
        .route(
            "/api/users/:user_id/bookmarks",
            get(bookmarks::list).post(bookmarks::create),
        )
        .route(
            "/api/users/:user_id/bookmarks/check/:manuscript_id",
            get(bookmarks::check),
        )
        .route(
            "/api/users/:user_id/bookmarks/manuscript/:manuscript_id",
            delete(bookmarks::delete_by_manuscript),
        )
        .route(
            "/api/users/:user_id/bookmarks/:bookmark_id",
            delete(bookmarks::delete),
        )
        // Search history
        .route(
            "/api/users/:user_id/history",
            get(history::list)
                .post(history::record)
                .delete(history::delete),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .with_state(state)
}
