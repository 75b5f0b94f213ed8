use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use super::blocklist::Blocklist;
use super::types::{
    or_default, Article, HeadlineQuery, NewsPage, SearchQuery, WireArticle, WireError,
    WireResponse, DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
};
use crate::cache::{CacheError, CacheHandle};
use crate::util::{read_limited_bytes, BodyError, MAX_BODY_SIZE};

const HEADLINES_FAILED: &str = "Failed to fetch news";
const SEARCH_FAILED: &str = "Failed to search news";

/// Errors from a single headline or search call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Non-success status; `message` is the provider's explanation when it sent one
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Request timed out")]
    Timeout,
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Response too large")]
    TooLarge,
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
    /// Network down and the offline cache has no copy of this page
    #[error("You are offline and this page has not been cached")]
    Offline,
    #[error("Offline cache error: {0}")]
    Cache(String),
}

impl From<BodyError> for UpstreamError {
    fn from(err: BodyError) -> Self {
        match err {
            BodyError::Network(e) => UpstreamError::Network(e),
            BodyError::TooLarge => UpstreamError::TooLarge,
            e @ BodyError::Incomplete { .. } => UpstreamError::Malformed(e.to_string()),
        }
    }
}

impl From<CacheError> for UpstreamError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Network(e) => UpstreamError::Network(e),
            CacheError::Timeout => UpstreamError::Timeout,
            CacheError::TooLarge => UpstreamError::TooLarge,
            CacheError::Offline { .. } => UpstreamError::Offline,
            other => UpstreamError::Cache(other.to_string()),
        }
    }
}

#[derive(Clone)]
enum Transport {
    /// Straight to the provider with the API key.
    Direct {
        http: reqwest::Client,
        api_key: Option<Arc<SecretString>>,
    },
    /// Through a `--serve` proxy, via the offline cache worker.
    Proxy { cache: CacheHandle },
}

#[derive(Clone, Copy)]
enum Endpoint {
    Headlines,
    Search,
}

/// Headline and search fetcher.
///
/// Each call issues exactly one GET and never retries; callers decide what
/// to do with a failure.
#[derive(Clone)]
pub struct NewsClient {
    transport: Transport,
    base_url: String,
    blocklist: Arc<Blocklist>,
    timeout: Duration,
}

impl NewsClient {
    /// Client that talks to the provider at `base_url` (e.g. `https://newsapi.org/v2`).
    pub fn direct(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
        blocklist: Blocklist,
    ) -> Self {
        if api_key.is_none() {
            tracing::warn!("No news API key configured (set NEWS_API); provider calls will be rejected");
        }
        Self {
            transport: Transport::Direct {
                http,
                api_key: api_key.map(Arc::new),
            },
            base_url: base_url.into(),
            blocklist: Arc::new(blocklist),
            timeout: Duration::from_secs(30),
        }
    }

    /// Client that talks to a `dailynews --serve` proxy at `proxy_url`
    /// through the offline cache.
    pub fn via_proxy(proxy_url: impl Into<String>, cache: CacheHandle, blocklist: Blocklist) -> Self {
        Self {
            transport: Transport::Proxy { cache },
            base_url: proxy_url.into(),
            blocklist: Arc::new(blocklist),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn blocklist(&self) -> &Blocklist {
        &self.blocklist
    }

    /// Top headlines for a country and category.
    ///
    /// Blocked titles are removed and every article is tagged with the
    /// category. `total_results` is the number of articles left on this page
    /// after filtering, not the provider's total.
    pub async fn top_headlines(&self, query: &HeadlineQuery) -> Result<NewsPage, UpstreamError> {
        let page_size = or_default(query.page_size, DEFAULT_PAGE_SIZE);
        let page = or_default(query.page, DEFAULT_PAGE);

        let mut params = Vec::with_capacity(4);
        if !query.country.is_empty() {
            params.push(("country", query.country.clone()));
        }
        if !query.category.is_empty() {
            params.push(("category", query.category.clone()));
        }
        params.push(("pageSize", page_size.to_string()));
        params.push(("page", page.to_string()));

        let url = self.endpoint(Endpoint::Headlines, &params)?;
        let category = (!query.category.is_empty()).then_some(query.category.as_str());
        let (articles, _) = self.get_page(url, category, HEADLINES_FAILED).await?;

        let articles = self.blocklist.filter(articles);
        let total_results = articles.len() as u64;
        tracing::debug!(
            country = %query.country,
            category = %query.category,
            page = page,
            kept = total_results,
            "Fetched top headlines"
        );
        Ok(NewsPage {
            articles,
            total_results,
        })
    }

    /// Free-text search. Results are not filtered and `total_results` is the
    /// provider's reported total (or the page length when it sends none).
    pub async fn search(&self, query: &SearchQuery) -> Result<NewsPage, UpstreamError> {
        let page_size = or_default(query.page_size, DEFAULT_PAGE_SIZE);
        let page = or_default(query.page, DEFAULT_PAGE);
        let params = [
            ("q", query.query.clone()),
            ("pageSize", page_size.to_string()),
            ("page", page.to_string()),
        ];

        let url = self.endpoint(Endpoint::Search, &params)?;
        let (articles, total) = self.get_page(url, None, SEARCH_FAILED).await?;
        let total_results = total.unwrap_or(articles.len() as u64);
        tracing::debug!(
            query = %query.query,
            page = page,
            returned = articles.len(),
            total = total_results,
            "Fetched search results"
        );
        Ok(NewsPage {
            articles,
            total_results,
        })
    }

    fn endpoint(&self, endpoint: Endpoint, params: &[(&str, String)]) -> Result<Url, UpstreamError> {
        let path = match (&self.transport, endpoint) {
            (Transport::Direct { .. }, Endpoint::Headlines) => "top-headlines",
            (Transport::Direct { .. }, Endpoint::Search) => "everything",
            (Transport::Proxy { .. }, Endpoint::Headlines) => "api/fetchTopHeadlines",
            (Transport::Proxy { .. }, Endpoint::Search) => "api/searchNews",
        };
        let raw = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let mut url = Url::parse(&raw).map_err(|e| UpstreamError::InvalidUrl(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// GET `url`, returning the status and body.
    async fn get(&self, url: Url) -> Result<(u16, Vec<u8>), UpstreamError> {
        match &self.transport {
            Transport::Direct { http, api_key } => {
                let mut url = url;
                if let Some(key) = api_key {
                    url.query_pairs_mut()
                        .append_pair("apiKey", key.expose_secret());
                }
                let response = tokio::time::timeout(self.timeout, http.get(url).send())
                    .await
                    .map_err(|_| UpstreamError::Timeout)??;
                let status = response.status().as_u16();
                let body = read_limited_bytes(response, MAX_BODY_SIZE).await?;
                Ok((status, body))
            }
            Transport::Proxy { cache } => {
                let response = cache.fetch(url).await?;
                if response.from_cache {
                    tracing::info!(url = %response.url, "Serving news page from offline cache");
                }
                Ok((response.status, response.body))
            }
        }
    }

    async fn get_page(
        &self,
        url: Url,
        category: Option<&str>,
        fallback_message: &str,
    ) -> Result<(Vec<Article>, Option<u64>), UpstreamError> {
        let path = url.path().to_string();
        let (status, body) = self.get(url).await?;
        let page = decode_page(status, &body, category, fallback_message);
        if let Err(e) = &page {
            tracing::warn!(path = %path, status = status, error = %e, "News request failed");
        }
        page
    }
}

/// Decode a provider or proxy response body.
fn decode_page(
    status: u16,
    body: &[u8],
    category: Option<&str>,
    fallback_message: &str,
) -> Result<(Vec<Article>, Option<u64>), UpstreamError> {
    if !(200..300).contains(&status) {
        let err: WireError = serde_json::from_slice(body).unwrap_or_default();
        let message = err
            .message
            .or(err.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback_message.to_string());
        return Err(UpstreamError::Status { status, message });
    }

    let response: WireResponse =
        serde_json::from_slice(body).map_err(|e| UpstreamError::Malformed(e.to_string()))?;

    let mut skipped = 0usize;
    let articles: Vec<Article> = response
        .articles
        .into_iter()
        .filter_map(|value| {
            let article = serde_json::from_value::<WireArticle>(value)
                .ok()
                .and_then(|wire| wire.into_article(category));
            if article.is_none() {
                skipped += 1;
            }
            article
        })
        .collect();

    if skipped > 0 {
        tracing::debug!(skipped = skipped, "Dropped article records without title or url");
    }

    Ok((articles, response.total_results))
}
