//! Tavily search client against a wiremock server.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jobscout::JobscoutError;
use jobscout::SearchResult;
use jobscout::providers::{NoopSearch, SearchProvider, TavilySearch};

async fn client(server: &MockServer) -> TavilySearch {
    TavilySearch::new("tvly-test")
        .unwrap()
        .with_base_url(server.uri())
}

#[tokio::test]
async fn search_posts_query_and_maps_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({
            "api_key": "tvly-test",
            "query": "nursing jobs Canada",
            "search_depth": "basic",
            "max_results": 5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "nursing jobs Canada",
            "results": [
                {"title": "Nurse", "url": "https://a", "content": "Hiring nurses", "score": 0.9},
                {"title": "Caregiver", "url": "https://b", "content": "Live-in care"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = client(&server)
        .await
        .search("nursing jobs Canada", 5)
        .await
        .unwrap();

    assert_eq!(
        results,
        vec![
            SearchResult::new("Nurse", "https://a", "Hiring nurses"),
            SearchResult::new("Caregiver", "https://b", "Live-in care"),
        ]
    );
}

#[tokio::test]
async fn search_truncates_to_max_results() {
    let server = MockServer::start().await;
    let results: Vec<_> = (0..5)
        .map(|i| json!({"title": format!("Job {i}"), "url": format!("https://{i}"), "content": ""}))
        .collect();
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": results })))
        .mount(&server)
        .await;

    let found = client(&server).await.search("jobs", 2).await.unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[1].title, "Job 1");
}

#[tokio::test]
async fn missing_results_field_means_no_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert!(client(&server).await.search("jobs", 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn error_status_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = client(&server).await.search("jobs", 3).await.unwrap_err();
    match err {
        JobscoutError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "invalid api key");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn malformed_body_becomes_search_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).await.search("jobs", 3).await.unwrap_err();
    assert!(matches!(err, JobscoutError::Search(_)));
}

#[tokio::test]
async fn noop_search_returns_nothing() {
    assert!(NoopSearch.search("jobs", 10).await.unwrap().is_empty());
}
