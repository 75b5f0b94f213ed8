use anyhow::{Context, Result};
use clap::Parser;
use secrecy::SecretString;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

use dailynews::app::{App, AppEvent};
use dailynews::cache::{CacheHandle, OfflineCache};
use dailynews::config::Config;
use dailynews::news::{NewsClient, CATEGORIES};
use dailynews::preferences::{PreferenceManager, CATEGORY_KEY};
use dailynews::proxy::{self, ProxyState};
use dailynews::storage::{Database, DatabaseError};
use dailynews::ui;

/// Get the config directory path (~/.config/dailynews/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("dailynews");
    Ok(config_dir)
}

#[derive(Parser, Debug)]
#[command(name = "dailynews", about = "Terminal news reader with offline bookmarks")]
struct Args {
    /// Run the news proxy on this address instead of the reader
    #[arg(long, value_name = "ADDR")]
    serve: Option<SocketAddr>,

    /// Reset database (delete and recreate)
    #[arg(long)]
    reset_db: bool,

    /// Remove every saved article and exit
    #[arg(long)]
    clear_bookmarks: bool,

    /// Two-letter country code for top headlines
    #[arg(long)]
    country: Option<String>,

    /// Category to open on
    #[arg(long)]
    category: Option<String>,
}

fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::limited(3))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Client that calls the provider directly with the resolved API key.
fn direct_client(config: &Config, http: reqwest::Client) -> NewsClient {
    NewsClient::direct(
        http,
        config.api_base_url.clone(),
        config.resolve_api_key().map(SecretString::from),
        config.blocklist(),
    )
    .with_timeout(config.request_timeout())
}

/// Start the offline cache worker in front of `proxy_url` and run its
/// install and activate steps in the background.
fn proxied_client(
    config: &Config,
    db: &Database,
    http: reqwest::Client,
    proxy_url: &str,
) -> Result<NewsClient> {
    let cache = OfflineCache::new(db.clone(), http, proxy_url, config.cache_version)
        .with_context(|| format!("Invalid proxy_url '{proxy_url}'"))?
        .with_static_assets(config.static_assets.clone())
        .with_bypass_hosts(config.bypass_hosts.clone())
        .with_timeout(config.request_timeout());
    let (handle, _worker) = CacheHandle::spawn(cache);

    let lifecycle = handle.clone();
    tokio::spawn(async move {
        match lifecycle.install().await {
            Ok(count) => tracing::debug!(assets = count, "Offline cache install finished"),
            // The proxy may be down; runtime responses are still cached
            Err(e) => tracing::warn!(error = %e, "Offline cache install failed"),
        }
        if let Err(e) = lifecycle.activate().await {
            tracing::warn!(error = %e, "Offline cache activation failed");
        }
    });

    Ok(NewsClient::via_proxy(proxy_url, handle, config.blocklist())
        .with_timeout(config.request_timeout()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never land in the alternate screen
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        println!("Created config directory: {}", config_dir.display());
    }

    // User-only access: the directory holds the API key and saved articles
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }

    let mut config = Config::load(&config_dir.join("config.toml"))
        .context("Failed to load config.toml")?;
    if let Some(country) = &args.country {
        config.country = country.trim().to_ascii_lowercase();
    }
    if let Some(category) = &args.category {
        if !CATEGORIES.contains(&category.as_str()) {
            anyhow::bail!(
                "Unknown category '{}'. Expected one of: {}",
                category,
                CATEGORIES.join(", ")
            );
        }
    }

    let http = build_http_client(config.request_timeout())?;

    // Proxy mode needs no local database
    if let Some(addr) = args.serve {
        let state = ProxyState {
            news: direct_client(&config, http),
            default_country: config.country.clone(),
            default_category: config.category.clone(),
        };
        return proxy::serve(addr, state).await;
    }

    let db_path = config_dir.join("dailynews.db");

    if args.reset_db && db_path.exists() {
        std::fs::remove_file(&db_path).context("Failed to delete database")?;
        println!("Database reset.");
    }

    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of dailynews appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    if args.clear_bookmarks {
        let removed = db
            .clear_articles()
            .await
            .context("Failed to clear saved articles")?;
        println!("Removed {} saved articles.", removed);
        return Ok(());
    }

    let news = match config.proxy_url.as_deref() {
        Some(proxy_url) => proxied_client(&config, &db, http, proxy_url)?,
        None => direct_client(&config, http),
    };

    let mut prefs = match PreferenceManager::load(&config, &db).await {
        Ok(prefs) => prefs,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load stored preferences, using config defaults");
            PreferenceManager::from_config(&config)
        }
    };
    if let Some(category) = &args.category {
        if let Err(e) = prefs.set(&db, CATEGORY_KEY, category).await {
            tracing::warn!(error = %e, "Failed to persist category preference");
        }
    }

    let mut app = App::new(db, news, prefs, config.country.clone(), config.page_size);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
