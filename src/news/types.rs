use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the URL digest.
const ID_LEN: usize = 16;

/// The news categories offered by the provider's top-headlines endpoint.
pub const CATEGORIES: [&str; 7] = [
    "general",
    "business",
    "entertainment",
    "health",
    "science",
    "sports",
    "technology",
];

// ============================================================================
// Article
// ============================================================================

/// A news article as shown in the feed and persisted in the local store.
///
/// Persisted as camelCase JSON. Only `title` and `url` are required; `id`
/// may be empty until the record is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Article {
    /// Build an article with only the required fields; the id is derived from `url`.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: article_id(&url),
            title: title.into(),
            description: None,
            url,
            image_url: None,
            source_name: None,
            author: None,
            published_at: None,
            content: None,
            category: None,
        }
    }

    /// Fill in the URL-derived id if the record has none.
    pub fn ensure_id(&mut self) -> &str {
        if self.id.is_empty() {
            self.id = article_id(&self.url);
        }
        &self.id
    }
}

/// Stable, URL-safe identifier for an article URL.
///
/// The URL is canonicalized first (scheme and host lower-cased, fragment
/// dropped) so trivially different spellings of one link share an id.
/// Strings that do not parse as URLs are hashed as trimmed.
pub fn article_id(url: &str) -> String {
    let canonical = match url::Url::parse(url.trim()) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            String::from(parsed)
        }
        Err(_) => url.trim().to_string(),
    };
    let hash = Sha256::digest(canonical.as_bytes());
    let mut hex = format!("{:x}", hash);
    hex.truncate(ID_LEN);
    hex
}

// ============================================================================
// Provider wire format
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// One article record in the provider's JSON shape. Every field is optional
/// on the wire; records without a title or url are dropped on conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireArticle {
    #[serde(default)]
    pub source: Option<WireSource>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl WireArticle {
    /// Convert to an [`Article`], tagging it with `category` when given.
    pub fn into_article(self, category: Option<&str>) -> Option<Article> {
        let title = non_empty(self.title)?;
        let url = non_empty(self.url)?;
        let published_at = self
            .published_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Some(Article {
            id: article_id(&url),
            title,
            description: non_empty(self.description),
            url,
            image_url: non_empty(self.url_to_image),
            source_name: self.source.and_then(|s| non_empty(s.name)),
            author: non_empty(self.author),
            published_at,
            content: non_empty(self.content),
            category: category.map(str::to_string),
        })
    }
}

impl From<&Article> for WireArticle {
    fn from(article: &Article) -> Self {
        Self {
            source: article.source_name.as_ref().map(|name| WireSource {
                id: None,
                name: Some(name.clone()),
            }),
            author: article.author.clone(),
            title: Some(article.title.clone()),
            description: article.description.clone(),
            url: Some(article.url.clone()),
            url_to_image: article.image_url.clone(),
            published_at: article.published_at.map(|dt| dt.to_rfc3339()),
            content: article.content.clone(),
        }
    }
}

/// Response body of both the provider and the local proxy.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireResponse {
    pub articles: Vec<serde_json::Value>,
    #[serde(default)]
    pub total_results: Option<u64>,
}

/// Error body: the provider sends `message`, the proxy sends `error`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

// ============================================================================
// Queries and pages
// ============================================================================

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_API_BASE: &str = "https://newsapi.org/v2";

/// Parameters for a top-headlines request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineQuery {
    pub country: String,
    pub category: String,
    pub page_size: u32,
    pub page: u32,
}

impl HeadlineQuery {
    pub fn new(country: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            category: category.into(),
            page_size: DEFAULT_PAGE_SIZE,
            page: DEFAULT_PAGE,
        }
    }

    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }
}

/// Parameters for a free-text search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub page_size: u32,
    pub page: u32,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page_size: DEFAULT_PAGE_SIZE,
            page: DEFAULT_PAGE,
        }
    }

    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }
}

/// Zero means "use the default".
pub(crate) fn or_default(value: u32, default: u32) -> u32 {
    if value == 0 {
        default
    } else {
        value
    }
}

/// One page of results plus the total the caller should paginate against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsPage {
    pub articles: Vec<Article>,
    pub total_results: u64,
}
