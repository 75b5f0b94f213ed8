//! Integration tests for the offline cache: install, activate, and
//! network-first fetch with fallback to stored responses.
//!
//! Every test uses a fresh in-memory database and its own mock origin.
//! Tests that take the origin down use a dedicated (non-pooled) server and a
//! client without idle connections, so the next request really fails.

use dailynews::cache::{cache_names, CacheError, CacheHandle, OfflineCache};
use dailynews::news::{Blocklist, HeadlineQuery, NewsClient, UpstreamError};
use dailynews::storage::{CacheEntry, Database};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn test_db() -> Database {
    Database::open(":memory:").await.unwrap()
}

fn http() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}

async fn dedicated_server() -> MockServer {
    MockServer::builder().start().await
}

async fn mount_ok(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

fn url(server: &MockServer, rest: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), rest)).unwrap()
}

// ============================================================================
// Install / Activate
// ============================================================================

#[tokio::test]
async fn test_install_stores_every_static_asset() {
    let server = MockServer::start().await;
    mount_ok(&server, "/", r#"{"name":"dailynews"}"#).await;
    mount_ok(&server, "/api/categories", r#"{"categories":[]}"#).await;

    let db = test_db().await;
    let cache = OfflineCache::new(db.clone(), http(), &server.uri(), 1)
        .unwrap()
        .with_static_assets(vec!["/".to_string(), "/api/categories".to_string()]);

    assert_eq!(cache.install().await.unwrap(), 2);

    let (static_name, _) = cache_names(1);
    let stored = db
        .cache_match(url(&server, "/api/categories").as_str(), &[&static_name])
        .await
        .unwrap()
        .expect("asset stored");
    assert_eq!(stored.status, 200);
    assert_eq!(stored.body, br#"{"categories":[]}"#.to_vec());
    assert_eq!(stored.content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_install_is_all_or_nothing() {
    let server = MockServer::start().await;
    mount_ok(&server, "/", "index").await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let db = test_db().await;
    let cache = OfflineCache::new(db.clone(), http(), &server.uri(), 1)
        .unwrap()
        .with_static_assets(vec!["/".to_string(), "/missing".to_string()]);

    let err = cache.install().await.unwrap_err();
    match err {
        CacheError::Install { url, status } => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/missing"));
        }
        other => panic!("expected install error, got {other:?}"),
    }

    let (static_name, _) = cache_names(1);
    assert!(db
        .cache_match(url(&server, "/").as_str(), &[&static_name])
        .await
        .unwrap()
        .is_none());
    assert!(db.cache_names().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_activate_deletes_outdated_partitions() {
    let server = MockServer::start().await;
    mount_ok(&server, "/", "index").await;

    let db = test_db().await;
    let (old_static, old_dynamic) = cache_names(1);
    db.cache_put(&CacheEntry {
        cache_name: old_static.clone(),
        url: url(&server, "/").to_string(),
        status: 200,
        content_type: None,
        body: b"stale".to_vec(),
    })
    .await
    .unwrap();
    db.cache_open(&old_dynamic).await.unwrap();
    db.cache_open("someone-elses-cache").await.unwrap();

    let cache = OfflineCache::new(db.clone(), http(), &server.uri(), 2).unwrap();
    cache.install().await.unwrap();
    let mut deleted = cache.activate().await.unwrap();
    deleted.sort();

    let mut expected = vec![old_dynamic, old_static.clone(), "someone-elses-cache".to_string()];
    expected.sort();
    assert_eq!(deleted, expected);

    let (new_static, _) = cache_names(2);
    assert_eq!(db.cache_names().await.unwrap(), vec![new_static]);
    assert!(db
        .cache_match(url(&server, "/").as_str(), &[&old_static])
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_activate_keeps_current_partitions() {
    let server = MockServer::start().await;
    let db = test_db().await;
    let (static_name, dynamic_name) = cache_names(5);
    db.cache_open(&static_name).await.unwrap();
    db.cache_open(&dynamic_name).await.unwrap();

    let cache = OfflineCache::new(db.clone(), http(), &server.uri(), 5).unwrap();
    assert!(cache.activate().await.unwrap().is_empty());
    assert_eq!(db.cache_names().await.unwrap().len(), 2);
}

// ============================================================================
// Fetch
// ============================================================================

#[tokio::test]
async fn test_fetch_falls_back_to_stored_copy_when_origin_is_down() {
    let server = dedicated_server().await;
    mount_ok(&server, "/api/fetchTopHeadlines", r#"{"articles":[],"totalResults":0}"#).await;

    let db = test_db().await;
    let cache = OfflineCache::new(db, http(), &server.uri(), 1).unwrap();
    let target = url(&server, "/api/fetchTopHeadlines?country=us&category=general");

    let live = cache.fetch(&target).await.unwrap();
    assert!(!live.from_cache);
    assert_eq!(live.status, 200);

    drop(server);

    let offline = cache.fetch(&target).await.unwrap();
    assert!(offline.from_cache);
    assert_eq!(offline.body, live.body);
    assert_eq!(offline.url, target.to_string());
}

#[tokio::test]
async fn test_fetch_without_stored_copy_reports_offline() {
    let server = dedicated_server().await;
    let db = test_db().await;
    let cache = OfflineCache::new(db, http(), &server.uri(), 1).unwrap();
    let target = url(&server, "/api/searchNews?q=never-seen");
    drop(server);

    let err = cache.fetch(&target).await.unwrap_err();
    assert!(matches!(err, CacheError::Offline { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_non_success_responses_are_passed_through_but_not_stored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/fetchTopHeadlines"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "Failed to load news" })))
        .mount(&server)
        .await;

    let db = test_db().await;
    let cache = OfflineCache::new(db.clone(), http(), &server.uri(), 1).unwrap();
    let target = url(&server, "/api/fetchTopHeadlines");

    let response = cache.fetch(&target).await.unwrap();
    assert_eq!(response.status, 500);
    assert!(!response.from_cache);

    let names = [cache.static_cache(), cache.dynamic_cache()];
    assert!(db.cache_match(target.as_str(), &names).await.unwrap().is_none());
}

#[tokio::test]
async fn test_other_origins_are_not_stored() {
    let origin = MockServer::start().await;
    let elsewhere = MockServer::start().await;
    mount_ok(&elsewhere, "/feed", "third party").await;

    let db = test_db().await;
    let cache = OfflineCache::new(db.clone(), http(), &origin.uri(), 1).unwrap();
    let target = url(&elsewhere, "/feed");

    let response = cache.fetch(&target).await.unwrap();
    assert_eq!(response.body, b"third party".to_vec());

    let names = [cache.static_cache(), cache.dynamic_cache()];
    assert!(db.cache_match(target.as_str(), &names).await.unwrap().is_none());
}

#[tokio::test]
async fn test_bypassed_hosts_skip_storage() {
    let server = MockServer::start().await;
    mount_ok(&server, "/api/categories", r#"{"categories":[]}"#).await;

    let db = test_db().await;
    let cache = OfflineCache::new(db.clone(), http(), &server.uri(), 1)
        .unwrap()
        .with_bypass_hosts(vec!["127.0.0.1".to_string()]);
    let target = url(&server, "/api/categories");

    let response = cache.fetch(&target).await.unwrap();
    assert_eq!(response.status, 200);

    let names = [cache.static_cache(), cache.dynamic_cache()];
    assert!(db.cache_match(target.as_str(), &names).await.unwrap().is_none());
}

#[tokio::test]
async fn test_bypassed_hosts_are_never_replayed_offline() {
    let server = dedicated_server().await;
    let db = test_db().await;
    let cache = OfflineCache::new(db.clone(), http(), &server.uri(), 1)
        .unwrap()
        .with_bypass_hosts(vec!["127.0.0.1".to_string()]);
    let target = url(&server, "/v2/everything?q=offline");

    db.cache_put(&CacheEntry {
        cache_name: cache.dynamic_cache().to_string(),
        url: target.to_string(),
        status: 200,
        content_type: Some("application/json".to_string()),
        body: br#"{"articles":[],"totalResults":0}"#.to_vec(),
    })
    .await
    .unwrap();
    drop(server);

    let err = cache.fetch(&target).await.unwrap_err();
    assert!(matches!(err, CacheError::Network(_)), "got {err:?}");
}

// ============================================================================
// Through the worker
// ============================================================================

#[tokio::test]
async fn test_news_client_reads_cached_headlines_offline() {
    let server = dedicated_server().await;
    Mock::given(method("GET"))
        .and(path("/api/fetchTopHeadlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "articles": [
                { "title": "Cached story", "url": "https://news.example.com/cached" }
            ],
            "totalResults": 1
        })))
        .mount(&server)
        .await;

    let db = test_db().await;
    let cache = OfflineCache::new(db, http(), &server.uri(), 1)
        .unwrap()
        .with_static_assets(Vec::new());
    let (handle, _worker) = CacheHandle::spawn(cache);
    let news = NewsClient::via_proxy(server.uri(), handle, Blocklist::default());
    let query = HeadlineQuery::new("us", "health").page(1, 10);

    let online = news.top_headlines(&query).await.unwrap();
    assert_eq!(online.articles.len(), 1);

    drop(server);

    let offline = news.top_headlines(&query).await.unwrap();
    assert_eq!(offline.articles, online.articles);
    assert_eq!(offline.articles[0].category.as_deref(), Some("health"));

    let unseen = news
        .top_headlines(&HeadlineQuery::new("us", "sports").page(1, 10))
        .await
        .unwrap_err();
    assert!(matches!(unseen, UpstreamError::Offline), "got {unseen:?}");
}
