use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::storage::{CacheEntry, Database, StoreError};
use crate::util::{read_limited_bytes, BodyError, MAX_BODY_SIZE};

const CACHE_PREFIX: &str = "dailynews-cache";
const DYNAMIC_CACHE_PREFIX: &str = "dailynews-dynamic-cache";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Request timed out")]
    Timeout,
    #[error("Response too large")]
    TooLarge,
    #[error("Connection dropped before the full response arrived")]
    Incomplete,
    /// Network failed and no partition holds a copy of the URL
    #[error("Offline and no cached response for {url}")]
    Offline { url: String },
    /// A static asset answered with something other than 200 during install
    #[error("Failed to cache {url}: status {status}")]
    Install { url: String, status: u16 },
    #[error("Cache storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Offline cache worker has stopped")]
    WorkerGone,
}

impl From<BodyError> for CacheError {
    fn from(err: BodyError) -> Self {
        match err {
            BodyError::Network(e) => CacheError::Network(e),
            BodyError::TooLarge => CacheError::TooLarge,
            BodyError::Incomplete { .. } => CacheError::Incomplete,
        }
    }
}

/// A response produced by the offline cache, from the network or from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub from_cache: bool,
}

impl From<CacheEntry> for CachedResponse {
    fn from(entry: CacheEntry) -> Self {
        Self {
            url: entry.url,
            status: entry.status,
            content_type: entry.content_type,
            body: entry.body,
            from_cache: true,
        }
    }
}

/// Partition names for a cache version: `(static, dynamic)`.
pub fn cache_names(version: u32) -> (String, String) {
    (
        format!("{CACHE_PREFIX}-v{version}"),
        format!("{DYNAMIC_CACHE_PREFIX}-v{version}"),
    )
}

/// Network-first response cache for GET requests to the first-party origin.
///
/// The static partition is filled once by [`install`](Self::install) from a
/// fixed asset list; the dynamic partition collects every successful
/// first-party response. Bypassed hosts are never stored or served from
/// storage. Only the cache worker task owns an instance.
pub struct OfflineCache {
    db: Database,
    http: reqwest::Client,
    origin: Url,
    static_cache: String,
    dynamic_cache: String,
    static_assets: Vec<String>,
    bypass_hosts: Vec<String>,
    timeout: Duration,
}

impl OfflineCache {
    pub fn new(
        db: Database,
        http: reqwest::Client,
        origin: &str,
        version: u32,
    ) -> Result<Self, CacheError> {
        let origin = Url::parse(origin)?;
        let (static_cache, dynamic_cache) = cache_names(version);
        Ok(Self {
            db,
            http,
            origin,
            static_cache,
            dynamic_cache,
            static_assets: vec!["/".to_string()],
            bypass_hosts: vec!["newsapi.org".to_string()],
            timeout: Duration::from_secs(30),
        })
    }

    pub fn with_static_assets(mut self, assets: Vec<String>) -> Self {
        self.static_assets = assets;
        self
    }

    pub fn with_bypass_hosts(mut self, hosts: Vec<String>) -> Self {
        self.bypass_hosts = hosts;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn static_cache(&self) -> &str {
        &self.static_cache
    }

    pub fn dynamic_cache(&self) -> &str {
        &self.dynamic_cache
    }

    fn is_bypassed(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        self.bypass_hosts.iter().any(|bypass| {
            host == bypass
                || host
                    .strip_suffix(bypass.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }

    fn is_first_party(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin()
    }

    async fn network(&self, url: &Url) -> Result<CachedResponse, CacheError> {
        let response = tokio::time::timeout(self.timeout, self.http.get(url.clone()).send())
            .await
            .map_err(|_| CacheError::Timeout)??;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = read_limited_bytes(response, MAX_BODY_SIZE).await?;
        Ok(CachedResponse {
            url: url.to_string(),
            status,
            content_type,
            body,
            from_cache: false,
        })
    }

    /// Fetch every static asset and store them all, or store nothing.
    ///
    /// Returns the number of assets cached.
    pub async fn install(&self) -> Result<usize, CacheError> {
        let mut entries = Vec::with_capacity(self.static_assets.len());
        for asset in &self.static_assets {
            let url = self.origin.join(asset)?;
            let response = self.network(&url).await?;
            if response.status != 200 {
                return Err(CacheError::Install {
                    url: url.to_string(),
                    status: response.status,
                });
            }
            entries.push(CacheEntry {
                cache_name: self.static_cache.clone(),
                url: response.url,
                status: response.status,
                content_type: response.content_type,
                body: response.body,
            });
        }

        self.db.cache_open(&self.static_cache).await?;
        self.db.cache_put_all(&entries).await?;
        tracing::info!(cache = %self.static_cache, assets = entries.len(), "Offline cache installed");
        Ok(entries.len())
    }

    /// Delete every partition that is not one of the current two.
    ///
    /// Returns the names that were removed.
    pub async fn activate(&self) -> Result<Vec<String>, CacheError> {
        let mut deleted = Vec::new();
        for name in self.db.cache_names().await? {
            if name != self.static_cache && name != self.dynamic_cache {
                self.db.cache_delete(&name).await?;
                tracing::info!(cache = %name, "Deleted outdated offline cache");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Network-first GET with fallback to stored copies.
    pub async fn fetch(&self, url: &Url) -> Result<CachedResponse, CacheError> {
        if self.is_bypassed(url) {
            return self.network(url).await;
        }

        match self.network(url).await {
            Ok(response) => {
                if response.status == 200 && self.is_first_party(url) {
                    let entry = CacheEntry {
                        cache_name: self.dynamic_cache.clone(),
                        url: response.url.clone(),
                        status: response.status,
                        content_type: response.content_type.clone(),
                        body: response.body.clone(),
                    };
                    // The response is still good even if storing it fails
                    if let Err(e) = self.db.cache_put(&entry).await {
                        tracing::warn!(url = %url, error = %e, "Failed to store response in offline cache");
                    }
                }
                Ok(response)
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Network failed, trying offline cache");
                let names = [self.static_cache.as_str(), self.dynamic_cache.as_str()];
                match self.db.cache_match(url.as_str(), &names).await? {
                    Some(entry) => Ok(entry.into()),
                    None => Err(CacheError::Offline {
                        url: url.to_string(),
                    }),
                }
            }
        }
    }
}
