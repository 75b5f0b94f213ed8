//! Local HTTP proxy in front of the news provider.
//!
//! Keeps the provider API key on the machine running `dailynews --serve`
//! and reshapes provider responses into `{articles, totalResults}`, with
//! top headlines passed through the keyword blocklist.

mod error;
mod routes;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::news::NewsClient;

pub use error::ProxyError;

/// Shared state for proxy handlers.
#[derive(Clone)]
pub struct ProxyState {
    pub news: NewsClient,
    pub default_country: String,
    pub default_category: String,
}

/// Build the proxy router.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/api/categories", get(routes::categories))
        .route("/api/fetchTopHeadlines", get(routes::fetch_top_headlines))
        .route("/api/searchNews", get(routes::search_news))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the proxy on `addr` until Ctrl+C or SIGTERM.
pub async fn serve(addr: SocketAddr, state: ProxyState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind proxy to {addr}"))?;
    let local = listener.local_addr().unwrap_or(addr);
    tracing::info!(addr = %local, "News proxy listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Proxy server error")?;

    tracing::info!("News proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
