//! News provider access: article types, the headline blocklist, and the
//! headline/search client.
//!
//! - [`types`] - [`Article`], the provider wire format, queries and pages
//! - [`blocklist`] - case-sensitive title filter applied to top headlines
//! - [`client`] - [`NewsClient`], one GET per call, direct or through the proxy

mod blocklist;
mod client;
mod types;

pub use blocklist::Blocklist;
pub use client::{NewsClient, UpstreamError};
pub use types::{
    article_id, Article, HeadlineQuery, NewsPage, SearchQuery, WireArticle, WireSource,
    CATEGORIES, DEFAULT_API_BASE, DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
};
