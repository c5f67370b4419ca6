//! Full-router tests over in-memory state via `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use folio_api::{build_router, AppState};
use folio_core::{Manuscript, MemoryBookmarkStore, MemoryHistoryStore, MemoryPartition,
    PartitionSet, PartitionStore};

fn manuscript(keyword: &str, content: &str, created_at: DateTime<Utc>) -> Manuscript {
    Manuscript {
        id: Uuid::new_v4(),
        category: String::new(),
        content: content.to_string(),
        keyword: keyword.to_string(),
        engine: "gpt".to_string(),
        created_at,
        updated_at: None,
        deleted: false,
        deleted_at: None,
        visible: true,
        visibility_updated_at: None,
        update_memo: None,
    }
}

fn setup(categories: &[&str]) -> (Router, Vec<Arc<MemoryPartition>>) {
    let stores: Vec<Arc<MemoryPartition>> = categories
        .iter()
        .map(|c| Arc::new(MemoryPartition::new(c)))
        .collect();
    let set = PartitionSet::new(
        stores
            .iter()
            .map(|s| s.clone() as Arc<dyn PartitionStore>)
            .collect(),
    );
    let state = AppState::new(
        set,
        Arc::new(MemoryBookmarkStore::new()),
        Arc::new(MemoryHistoryStore::new()),
    );
    (build_router(state), stores)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (router, _) = setup(&["diet"]);
    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_federated_search_reports_exact_total() {
    let (router, stores) = setup(&["diet", "beauty"]);
    let now = Utc::now();
    // diet: 3 matches
    stores[0].push(manuscript("mounjaro", "mounjaro body", now - Duration::hours(3)));
    stores[0].push(manuscript("mounjaro faq", "text", now - Duration::hours(2)));
    stores[0].push(manuscript("other", "mentions mounjaro", now - Duration::hours(1)));
    // beauty: 1 match
    stores[1].push(manuscript("mounjaro skin", "text", now - Duration::hours(4)));

    let (status, body) =
        send(&router, Method::GET, "/api/search?q=mounjaro&skip=0&limit=2", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["documents"].as_array().unwrap().len(), 2);
    assert_eq!(body["skip"], 0);
    assert_eq!(body["limit"], 2);
}

#[tokio::test]
async fn test_search_validation_errors_are_400() {
    let (router, _) = setup(&["diet"]);

    let (status, body) = send(&router, Method::GET, "/api/search?q=%20%20", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("empty"));

    let long = "q".repeat(201);
    let (status, _) =
        send(&router, Method::GET, &format!("/api/search?q={}", long), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_unknown_category_is_404() {
    let (router, _) = setup(&["diet"]);
    let (status, _) =
        send(&router, Method::GET, "/api/search?q=mounjaro&category=finance", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_with_all_partitions_down_is_503() {
    let (router, stores) = setup(&["diet", "beauty"]);
    for store in &stores {
        store.set_failing(true);
    }
    let (status, _) = send(&router, Method::GET, "/api/search?q=mounjaro", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_ingest_then_fetch() {
    let (router, _) = setup(&["diet"]);

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/manuscripts",
        Some(json!({
            "category": "diet",
            "content": "all about mounjaro",
            "keyword": "mounjaro",
            "engine": "gpt"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["category"], "diet");

    let (status, body) = send(
        &router,
        Method::GET,
        &format!("/api/manuscripts/diet/{}", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["keyword"], "mounjaro");
    assert_eq!(body["visible"], true);
}

#[tokio::test]
async fn test_ingest_rejects_blank_fields_and_unknown_category() {
    let (router, _) = setup(&["diet"]);

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/manuscripts",
        Some(json!({"category": "diet", "content": "  ", "keyword": "k", "engine": "e"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/manuscripts",
        Some(json!({"category": "finance", "content": "c", "keyword": "k", "engine": "e"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_is_terminal_over_http() {
    let (router, stores) = setup(&["diet"]);
    let m = manuscript("mounjaro", "body", Utc::now());
    let id = m.id;
    stores[0].push(m);

    let (status, body) = send(
        &router,
        Method::DELETE,
        &format!("/api/manuscripts/diet/{}", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_id"], id.to_string());

    // Gone from fetch, update rejected, search misses it
    let (status, _) = send(
        &router,
        Method::GET,
        &format!("/api/manuscripts/diet/{}", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &router,
        Method::PUT,
        &format!("/api/manuscripts/diet/{}", id),
        Some(json!({"content": "revived"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&router, Method::GET, "/api/search?q=mounjaro", None).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_update_stamps_memo() {
    let (router, stores) = setup(&["diet"]);
    let m = manuscript("k", "original", Utc::now());
    let id = m.id;
    stores[0].push(m);

    let (status, body) = send(
        &router,
        Method::PUT,
        &format!("/api/manuscripts/diet/{}", id),
        Some(json!({"content": "revised", "memo": "typo fix"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "revised");
    assert_eq!(body["update_memo"], "typo fix");
}

#[tokio::test]
async fn test_visibility_toggle_hides_from_listing_not_search() {
    let (router, stores) = setup(&["diet"]);
    let m = manuscript("mounjaro", "body", Utc::now());
    let id = m.id;
    stores[0].push(m);

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/api/manuscripts/diet/{}/visibility", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["visible"], false);

    let (_, listing) = send(&router, Method::GET, "/api/manuscripts", None).await;
    assert_eq!(listing["total"], 0);

    let (_, page) = send(&router, Method::GET, "/api/search?q=mounjaro", None).await;
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn test_bookmark_create_is_idempotent_over_http() {
    let (router, stores) = setup(&["diet"]);
    let m = manuscript("mounjaro", "long body text", Utc::now());
    let id = m.id;
    stores[0].push(m);

    let body = json!({"manuscript_id": id, "category": "diet"});
    let (status, first) = send(
        &router,
        Method::POST,
        "/api/users/u1/bookmarks",
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["keyword"], "mounjaro");
    assert_eq!(first["preview"], "long body text");

    let (status, second) =
        send(&router, Method::POST, "/api/users/u1/bookmarks", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);

    let (_, check) = send(
        &router,
        Method::GET,
        &format!("/api/users/u1/bookmarks/check/{}", id),
        None,
    )
    .await;
    assert_eq!(check["bookmarked"], true);

    let (status, _) = send(
        &router,
        Method::DELETE,
        &format!("/api/users/u1/bookmarks/manuscript/{}", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, page) = send(&router, Method::GET, "/api/users/u1/bookmarks", None).await;
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn test_bookmarking_missing_manuscript_is_404() {
    let (router, _) = setup(&["diet"]);
    let (status, _) = send(
        &router,
        Method::POST,
        "/api/users/u1/bookmarks",
        Some(json!({"manuscript_id": Uuid::new_v4(), "category": "diet"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_record_list_delete() {
    let (router, _) = setup(&["diet"]);

    let (status, entry) = send(
        &router,
        Method::POST,
        "/api/users/u1/history",
        Some(json!({"keyword": "mounjaro", "category": "diet"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["keyword"], "mounjaro");

    // Repeat save keeps a single entry
    send(
        &router,
        Method::POST,
        "/api/users/u1/history",
        Some(json!({"keyword": "mounjaro"})),
    )
    .await;
    let (_, list) = send(&router, Method::GET, "/api/users/u1/history", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (_, deleted) = send(
        &router,
        Method::DELETE,
        "/api/users/u1/history?keyword=mounjaro",
        None,
    )
    .await;
    assert_eq!(deleted["deleted"], 1);
}

#[tokio::test]
async fn test_autocomplete_popular_and_stats_endpoints() {
    let (router, stores) = setup(&["diet", "beauty"]);
    let now = Utc::now();
    stores[0].push(manuscript("mounjaro", "a", now));
    stores[0].push(manuscript("mounjaro", "b", now));
    stores[1].push(manuscript("morning routine", "c", now));

    let (status, suggestions) =
        send(&router, Method::GET, "/api/autocomplete?q=mo&limit=5", None).await;
    assert_eq!(status, StatusCode::OK);
    let suggestions = suggestions.as_array().unwrap().clone();
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0]["keyword"], "mounjaro");
    assert_eq!(suggestions[0]["count"], 2);

    let (status, report) = send(&router, Method::GET, "/api/popular?period=today", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["period"], "today");
    assert_eq!(report["keywords"][0]["rank"], 1);
    assert_eq!(report["keywords"][0]["keyword"], "mounjaro");

    let (status, stats) = send(&router, Method::GET, "/api/stats?period=week", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_count"], 3);

    let (status, _) = send(&router, Method::GET, "/api/popular?period=fortnight", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
