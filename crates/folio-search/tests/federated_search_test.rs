//! End-to-end federated search over in-memory partitions.

mod fixtures;

use folio_search::{SearchCoordinator, SearchRequest};

use fixtures::{hours_ago, manuscript, partitions};

fn request(query: &str, skip: i64, limit: i64) -> SearchRequest {
    SearchRequest {
        query: query.to_string(),
        category: None,
        skip,
        limit,
    }
}

#[tokio::test]
async fn test_merge_ranks_best_candidates_across_partitions() {
    let (set, stores) = partitions(&["diet", "beauty", "fitness"]);

    // diet: three matches with distinct scores
    stores[0].push(manuscript(
        "mounjaro side effects",
        "mounjaro weekly, mounjaro monthly",
        "gpt",
        hours_ago(5),
    )); // 10 + 2 = 12
    stores[0].push(manuscript(
        "weight loss",
        "one mention of mounjaro",
        "gpt",
        hours_ago(4),
    )); // 1
    stores[0].push(manuscript("mounjaro dosage", "body text", "gpt", hours_ago(3))); // 10

    // beauty: one match
    stores[1].push(manuscript(
        "skincare",
        "mounjaro, mounjaro and mounjaro again",
        "claude",
        hours_ago(2),
    )); // 3

    // fitness: no matches
    stores[2].push(manuscript("running", "unrelated", "gpt", hours_ago(1)));

    let coordinator = SearchCoordinator::new(set);
    let page = coordinator.search(request("mounjaro", 0, 2)).await.unwrap();

    // Exact total across partitions, window of the two best-scored
    assert_eq!(page.total, 4);
    assert_eq!(page.documents.len(), 2);
    assert_eq!(page.documents[0].keyword, "mounjaro side effects");
    assert_eq!(page.documents[1].keyword, "mounjaro dosage");

    // diet matched 3 but only budget (skip+limit = 2) candidates were
    // fetched from it
    assert!(page.truncated);
}

#[tokio::test]
async fn test_full_budget_page_is_not_truncated() {
    let (set, stores) = partitions(&["diet", "beauty"]);
    stores[0].push(manuscript("mounjaro", "a", "gpt", hours_ago(2)));
    stores[1].push(manuscript("mounjaro faq", "b", "gpt", hours_ago(1)));

    let coordinator = SearchCoordinator::new(set);
    let page = coordinator.search(request("mounjaro", 0, 10)).await.unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.documents.len(), 2);
    assert!(!page.truncated);
}

#[tokio::test]
async fn test_equal_scores_break_ties_by_recency() {
    let (set, stores) = partitions(&["diet", "beauty"]);
    stores[0].push(manuscript("mounjaro old", "x", "gpt", hours_ago(10)));
    stores[1].push(manuscript("mounjaro new", "y", "gpt", hours_ago(1)));

    let coordinator = SearchCoordinator::new(set);
    let page = coordinator.search(request("mounjaro", 0, 10)).await.unwrap();

    assert_eq!(page.documents[0].keyword, "mounjaro new");
    assert_eq!(page.documents[1].keyword, "mounjaro old");
}

#[tokio::test]
async fn test_window_skips_into_merged_ranking() {
    let (set, stores) = partitions(&["diet", "beauty"]);
    stores[0].push(manuscript("mounjaro a", "", "gpt", hours_ago(4))); // 10
    stores[0].push(manuscript("mounjaro b", "", "gpt", hours_ago(3))); // 10
    stores[1].push(manuscript("other", "mounjaro once", "gpt", hours_ago(2))); // 1

    let coordinator = SearchCoordinator::new(set);
    let page = coordinator.search(request("mounjaro", 2, 2)).await.unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.documents.len(), 1);
    assert_eq!(page.documents[0].keyword, "other");
    assert_eq!(page.skip, 2);
}

#[tokio::test]
async fn test_extreme_skip_returns_empty_page() {
    let (set, stores) = partitions(&["diet", "beauty"]);
    stores[0].push(manuscript("mounjaro", "x", "gpt", hours_ago(1)));

    let coordinator = SearchCoordinator::new(set);
    let page = coordinator
        .search(request("mounjaro", i64::MAX, 10))
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert!(page.documents.is_empty());
    assert_eq!(page.skip, i64::MAX);
}

#[tokio::test]
async fn test_failed_partition_is_excluded_not_fatal() {
    let (set, stores) = partitions(&["diet", "beauty"]);
    stores[0].push(manuscript("mounjaro", "x", "gpt", hours_ago(1)));
    stores[1].push(manuscript("mounjaro too", "y", "gpt", hours_ago(2)));
    stores[1].set_failing(true);

    let coordinator = SearchCoordinator::new(set);
    let page = coordinator.search(request("mounjaro", 0, 10)).await.unwrap();

    // Results and total reflect surviving partitions only
    assert_eq!(page.total, 1);
    assert_eq!(page.documents.len(), 1);
    assert_eq!(page.documents[0].category, "diet");
}

#[tokio::test]
async fn test_all_partitions_failed_is_an_error() {
    let (set, stores) = partitions(&["diet", "beauty"]);
    for store in &stores {
        store.set_failing(true);
    }

    let coordinator = SearchCoordinator::new(set);
    let err = coordinator
        .search(request("mounjaro", 0, 10))
        .await
        .unwrap_err();
    assert!(err.is_partition_unavailable());
}

#[tokio::test]
async fn test_query_validation() {
    let (set, _stores) = partitions(&["diet"]);
    let coordinator = SearchCoordinator::new(set);

    assert!(matches!(
        coordinator.search(request("", 0, 10)).await,
        Err(folio_core::Error::Validation(_))
    ));
    assert!(matches!(
        coordinator.search(request("   ", 0, 10)).await,
        Err(folio_core::Error::Validation(_))
    ));
    let long = "q".repeat(201);
    assert!(matches!(
        coordinator.search(request(&long, 0, 10)).await,
        Err(folio_core::Error::Validation(_))
    ));
}

#[tokio::test]
async fn test_category_scoped_search_skips_fan_out() {
    let (set, stores) = partitions(&["diet", "beauty"]);
    stores[0].push(manuscript("mounjaro", "diet doc", "gpt", hours_ago(1)));
    stores[1].push(manuscript("mounjaro", "beauty doc", "gpt", hours_ago(2)));
    // Scoped search still works when the other partition is down
    stores[1].set_failing(true);

    let coordinator = SearchCoordinator::new(set);
    let page = coordinator
        .search(SearchRequest {
            query: "mounjaro".to_string(),
            category: Some("diet".to_string()),
            skip: 0,
            limit: 10,
        })
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.documents[0].category, "diet");
    assert!(!page.truncated);
}

#[tokio::test]
async fn test_unknown_category_is_not_found() {
    let (set, _stores) = partitions(&["diet"]);
    let coordinator = SearchCoordinator::new(set);

    let err = coordinator
        .search(SearchRequest {
            query: "mounjaro".to_string(),
            category: Some("finance".to_string()),
            skip: 0,
            limit: 10,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, folio_core::Error::NotFound(_)));
}

#[tokio::test]
async fn test_list_visible_merges_by_recency_and_hides_hidden() {
    let (set, stores) = partitions(&["diet", "beauty"]);
    stores[0].push(manuscript("a", "1", "gpt", hours_ago(3)));
    stores[1].push(manuscript("b", "2", "gpt", hours_ago(1)));

    let mut hidden = manuscript("c", "3", "gpt", hours_ago(2));
    hidden.visible = false;
    stores[0].push(hidden);

    let mut deleted = manuscript("d", "4", "gpt", hours_ago(1));
    deleted.deleted = true;
    stores[1].push(deleted);

    let coordinator = SearchCoordinator::new(set);
    let page = coordinator.list_visible(None, 0, 10).await.unwrap();

    assert_eq!(page.total, 2);
    let keywords: Vec<&str> = page.documents.iter().map(|m| m.keyword.as_str()).collect();
    assert_eq!(keywords, vec!["b", "a"]);
}
