//! Background task spawning for the UI.
//!
//! Every fetch and store operation runs in its own task and reports back
//! through an `AppEvent`. Panics inside a task are caught and reported
//! instead of silently killing it.

use crate::app::AppEvent;
use crate::feed::{FeedSource, PageRequest};
use crate::news::{Article, HeadlineQuery, NewsClient, SearchQuery};
use crate::storage::Database;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

async fn send(tx: &mpsc::Sender<AppEvent>, event: AppEvent, name: &'static str) {
    if let Err(e) = tx.send(event).await {
        tracing::warn!(error = %e, event = name, "Channel send failed (receiver dropped)");
    }
}

/// Run a task body, reporting a panic as `TaskPanicked`.
fn spawn_guarded<F>(task: &'static str, tx: mpsc::Sender<AppEvent>, body: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(panic_msg) = catch_task_panic(body).await {
            tracing::error!(task, error = %panic_msg, "Background task panicked");
            send(
                &tx,
                AppEvent::TaskPanicked {
                    task,
                    error: panic_msg,
                },
                "TaskPanicked",
            )
            .await;
        }
    });
}

/// Fetch one feed page and report it as `PageLoaded`.
///
/// A panic is reported as a failed page so the feed leaves its loading state.
pub(super) fn spawn_page_load(news: NewsClient, request: PageRequest, tx: mpsc::Sender<AppEvent>) {
    tracing::debug!(source = %request.source, page = request.page, seq = request.seq, "Spawning page load");
    tokio::spawn(async move {
        let outcome = catch_task_panic(async {
            match &request.source {
                FeedSource::Headlines { country, category } => {
                    let query = HeadlineQuery::new(country, category)
                        .page(request.page, request.page_size);
                    news.top_headlines(&query).await
                }
                FeedSource::Search { query } => {
                    let query = SearchQuery::new(query).page(request.page, request.page_size);
                    news.search(&query).await
                }
            }
        })
        .await;

        let result = match outcome {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(panic_msg) => {
                tracing::error!(task = "page_load", error = %panic_msg, "Background task panicked");
                Err(format!("Internal error: {panic_msg}"))
            }
        };
        send(&tx, AppEvent::PageLoaded { request, result }, "PageLoaded").await;
    });
}

/// Write an article to the local store.
pub(super) fn spawn_save(
    db: Database,
    mut article: Article,
    open: bool,
    tx: mpsc::Sender<AppEvent>,
) {
    let tx_events = tx.clone();
    spawn_guarded("save_article", tx, async move {
        let event = match db.save_article(&mut article).await {
            Ok(id) => AppEvent::ArticleSaved { id, open },
            Err(e) => {
                tracing::error!(error = %e, url = %article.url, "Failed to save article");
                AppEvent::ArticleSaveFailed {
                    error: e.to_string(),
                }
            }
        };
        send(&tx_events, event, "ArticleSaved").await;
    });
}

/// Look up a stored article for the detail view.
pub(super) fn spawn_detail_load(
    db: Database,
    id: String,
    generation: u64,
    tx: mpsc::Sender<AppEvent>,
) {
    let tx_events = tx.clone();
    spawn_guarded("article_load", tx, async move {
        let result = db.get_article(&id).await.map_err(|e| e.to_string());
        send(
            &tx_events,
            AppEvent::ArticleLoaded {
                id,
                generation,
                result,
            },
            "ArticleLoaded",
        )
        .await;
    });
}

pub(super) fn spawn_bookmarks_load(db: Database, tx: mpsc::Sender<AppEvent>) {
    let tx_events = tx.clone();
    spawn_guarded("bookmarks_load", tx, async move {
        let result = db.list_articles().await.map_err(|e| e.to_string());
        send(&tx_events, AppEvent::BookmarksLoaded(result), "BookmarksLoaded").await;
    });
}

pub(super) fn spawn_clear_bookmarks(db: Database, tx: mpsc::Sender<AppEvent>) {
    let tx_events = tx.clone();
    spawn_guarded("bookmarks_clear", tx, async move {
        let result = db.clear_articles().await.map_err(|e| e.to_string());
        send(&tx_events, AppEvent::BookmarksCleared(result), "BookmarksCleared").await;
    });
}
