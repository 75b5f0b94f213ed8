//! Integration tests for the proxy router.
//!
//! Requests go straight into the router with `tower::ServiceExt::oneshot`;
//! the provider behind it is a wiremock server.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use dailynews::news::{Blocklist, NewsClient};
use dailynews::proxy::{router, ProxyState};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(provider: &MockServer) -> Router {
    let news = NewsClient::direct(
        reqwest::Client::new(),
        provider.uri(),
        Some(SecretString::from("server-key".to_string())),
        Blocklist::default(),
    );
    router(ProxyState {
        news,
        default_country: "us".to_string(),
        default_category: "general".to_string(),
    })
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn provider_article(n: usize, title: &str) -> Value {
    json!({
        "source": { "id": null, "name": "Wire" },
        "title": title,
        "url": format!("https://news.example.com/{n}"),
        "publishedAt": "2023-01-01T00:00:00Z"
    })
}

// ============================================================================
// Headlines
// ============================================================================

#[tokio::test]
async fn test_headlines_are_filtered_and_reshaped() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .and(query_param("country", "de"))
        .and(query_param("category", "technology"))
        .and(query_param("pageSize", "10"))
        .and(query_param("page", "2"))
        .and(query_param("apiKey", "server-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "totalResults": 3,
            "articles": [
                provider_article(1, "Chip makers expand"),
                provider_article(2, "Tesla recalls cars"),
                provider_article(3, "New phone reviewed"),
            ]
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let (status, body) = get(
        app(&provider),
        "/api/fetchTopHeadlines?country=de&category=technology&pageSize=10&page=2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalResults"], json!(2));
    let titles: Vec<&str> = body["articles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Chip makers expand", "New phone reviewed"]);
    assert_eq!(body["articles"][0]["source"]["name"], json!("Wire"));
}

#[tokio::test]
async fn test_missing_params_use_defaults() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .and(query_param("country", "us"))
        .and(query_param("category", "general"))
        .and(query_param("pageSize", "10"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "totalResults": 0,
            "articles": []
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let (status, body) = get(app(&provider), "/api/fetchTopHeadlines?pageSize=abc").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "articles": [], "totalResults": 0 }));
}

#[tokio::test]
async fn test_headline_failure_hides_upstream_detail() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": "error",
            "message": "Your API key is invalid."
        })))
        .mount(&provider)
        .await;

    let (status, body) = get(app(&provider), "/api/fetchTopHeadlines").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to load news" }));
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_passes_query_and_total_through() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/everything"))
        .and(query_param("q", "solar power"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "totalResults": 57,
            "articles": [
                provider_article(1, "Solar farms grow"),
                provider_article(2, "Tesla solar roof"),
            ]
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let (status, body) = get(app(&provider), "/api/searchNews?q=solar%20power").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalResults"], json!(57));
    assert_eq!(body["articles"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_search_failure_hides_upstream_detail() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/everything"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "status": "error",
            "code": "rateLimited",
            "message": "Too many requests"
        })))
        .mount(&provider)
        .await;

    let (status, body) = get(app(&provider), "/api/searchNews?q=anything").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to search news" }));
}

// ============================================================================
// Static routes
// ============================================================================

#[tokio::test]
async fn test_categories_lists_every_category() {
    let provider = MockServer::start().await;
    let (status, body) = get(app(&provider), "/api/categories").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "categories": [
                "general", "business", "entertainment", "health",
                "science", "sports", "technology"
            ]
        })
    );
}

#[tokio::test]
async fn test_health_reports_ok() {
    let provider = MockServer::start().await;
    let response = app(&provider)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let provider = MockServer::start().await;
    let (status, _) = get(app(&provider), "/api/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
