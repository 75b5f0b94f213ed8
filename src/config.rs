//! Configuration file parser for ~/.config/dailynews/config.toml.
//!
//! The config file is optional: a missing or empty file yields `Config::default()`.
//! Unknown keys are accepted but logged, since they are usually typos.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::news::Blocklist;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// Every field has a default, so any subset of keys can be specified.
/// `news_api_key` is masked in `Debug` output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme variant name ("dark" or "light").
    pub theme: String,

    /// Two-letter country code for top headlines.
    pub country: String,

    /// Category shown when the feed is first opened.
    pub category: String,

    /// Articles requested per page.
    pub page_size: u32,

    /// Base URL of the news provider API.
    pub api_base_url: String,

    /// Provider API key (alternative to the NEWS_API env var).
    /// Env var takes precedence over config file.
    pub news_api_key: Option<String>,

    /// Base URL of a running `dailynews --serve` instance. When set, the reader
    /// talks to the proxy through the offline cache instead of the provider.
    pub proxy_url: Option<String>,

    /// Headlines whose title contains any of these substrings are hidden.
    pub blocked_keywords: Vec<String>,

    /// Version suffix of the offline cache partitions. Bumping it evicts
    /// every older partition on the next activation.
    pub cache_version: u32,

    /// Proxy paths stored in the static cache partition on install.
    pub static_assets: Vec<String>,

    /// Hosts the offline cache never stores or serves.
    pub bypass_hosts: Vec<String>,

    /// Per-request timeout for provider and proxy calls.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            country: "us".to_string(),
            category: "general".to_string(),
            page_size: crate::news::DEFAULT_PAGE_SIZE,
            api_base_url: crate::news::DEFAULT_API_BASE.to_string(),
            news_api_key: None,
            proxy_url: None,
            blocked_keywords: Blocklist::default().entries().to_vec(),
            cache_version: 1,
            static_assets: vec!["/".to_string(), "/api/categories".to_string()],
            bypass_hosts: vec!["newsapi.org".to_string()],
            request_timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("theme", &self.theme)
            .field("country", &self.country)
            .field("category", &self.category)
            .field("page_size", &self.page_size)
            .field("api_base_url", &self.api_base_url)
            .field(
                "news_api_key",
                &self.news_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("proxy_url", &self.proxy_url)
            .field("blocked_keywords", &self.blocked_keywords)
            .field("cache_version", &self.cache_version)
            .field("static_assets", &self.static_assets)
            .field("bypass_hosts", &self.bypass_hosts)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 12] = [
        "theme",
        "country",
        "category",
        "page_size",
        "api_base_url",
        "news_api_key",
        "proxy_url",
        "blocked_keywords",
        "cache_version",
        "static_assets",
        "bypass_hosts",
        "request_timeout_secs",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            country = %config.country,
            category = %config.category,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Resolve the provider API key: `NEWS_API` env var first, then config file.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var("NEWS_API")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.news_api_key.clone())
    }

    /// Blocklist built from `blocked_keywords`.
    pub fn blocklist(&self) -> Blocklist {
        Blocklist::new(self.blocked_keywords.iter().cloned())
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

// ============================================================================
// Tests
// ============================================================================
