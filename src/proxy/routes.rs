use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::error::ProxyError;
use super::ProxyState;
use crate::news::{
    HeadlineQuery, NewsPage, SearchQuery, WireArticle, CATEGORIES, DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
};

/// Query parameters arrive as strings; unparseable numbers fall back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HeadlineParams {
    country: Option<String>,
    category: Option<String>,
    page_size: Option<String>,
    page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchParams {
    #[serde(default)]
    q: String,
    page_size: Option<String>,
    page: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageBody {
    articles: Vec<WireArticle>,
    total_results: u64,
}

impl From<NewsPage> for PageBody {
    fn from(page: NewsPage) -> Self {
        Self {
            articles: page.articles.iter().map(WireArticle::from).collect(),
            total_results: page.total_results,
        }
    }
}

fn number(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

fn non_empty(raw: Option<String>, default: &str) -> String {
    raw.filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub(crate) async fn fetch_top_headlines(
    State(state): State<ProxyState>,
    Query(params): Query<HeadlineParams>,
) -> Result<impl IntoResponse, ProxyError> {
    let query = HeadlineQuery {
        country: non_empty(params.country, &state.default_country),
        category: non_empty(params.category, &state.default_category),
        page_size: number(params.page_size.as_deref(), DEFAULT_PAGE_SIZE),
        page: number(params.page.as_deref(), DEFAULT_PAGE),
    };

    let page = state
        .news
        .top_headlines(&query)
        .await
        .map_err(ProxyError::Headlines)?;
    Ok(Json(PageBody::from(page)))
}

pub(crate) async fn search_news(
    State(state): State<ProxyState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ProxyError> {
    let query = SearchQuery {
        query: params.q,
        page_size: number(params.page_size.as_deref(), DEFAULT_PAGE_SIZE),
        page: number(params.page.as_deref(), DEFAULT_PAGE),
    };

    let page = state
        .news
        .search(&query)
        .await
        .map_err(ProxyError::Search)?;
    Ok(Json(PageBody::from(page)))
}

pub(crate) async fn categories() -> impl IntoResponse {
    Json(json!({ "categories": CATEGORIES }))
}

pub(crate) async fn index() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/api/fetchTopHeadlines?country&category&pageSize&page",
            "/api/searchNews?q&pageSize&page",
            "/api/categories",
        ],
    }))
}

pub(crate) async fn health() -> &'static str {
    "ok"
}
