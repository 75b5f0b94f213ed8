//! Application event handling.
//!
//! Applies the results of background fetches and store operations to the
//! application state.

use crate::app::{App, AppEvent, View};
use crate::feed::Applied;
use tokio::sync::mpsc;

use super::helpers::spawn_detail_load;

/// Handle application events from background tasks.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match event {
        AppEvent::PageLoaded { request, result } => {
            let count = result.as_ref().map(|p| p.articles.len()).ok();
            if app.apply_page(&request, result) == Applied::Accepted {
                tracing::debug!(
                    source = %request.source,
                    page = request.page,
                    articles = ?count,
                    "Feed page applied"
                );
            }
        }
        AppEvent::ArticleSaved { id, open } => {
            app.saved_ids.insert(id.clone());
            if open {
                let generation = app.open_detail(id.clone());
                spawn_detail_load(app.db.clone(), id, generation, event_tx.clone());
            } else {
                app.set_status("Article saved for later");
            }
        }
        AppEvent::ArticleSaveFailed { error } => {
            app.set_error(format!("Failed to save article: {error}"));
        }
        AppEvent::ArticleLoaded {
            id,
            generation,
            result,
        } => {
            app.apply_detail(&id, generation, result);
        }
        AppEvent::BookmarksLoaded(result) => {
            app.bookmarks_loading = false;
            match result {
                Ok(articles) => {
                    app.saved_ids
                        .extend(articles.iter().map(|a| a.id.clone()));
                    app.bookmarks = articles;
                    app.clamp_selections();
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to load bookmarks");
                    app.set_error(format!("Failed to load bookmarks: {e}"));
                }
            }
        }
        AppEvent::BookmarksCleared(result) => match result {
            Ok(count) => {
                app.bookmarks.clear();
                app.saved_ids.clear();
                app.selected_bookmark = 0;
                if app.view == View::Article {
                    app.exit_detail();
                }
                app.set_status(format!(
                    "Cleared {} saved article{}",
                    count,
                    if count == 1 { "" } else { "s" }
                ));
            }
            Err(e) => {
                app.set_error(format!("Failed to clear bookmarks: {e}"));
            }
        },
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            app.bookmarks_loading = false;
            app.set_error(format!("Internal error in {task}: {error}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::news::{Article, Blocklist, NewsClient, NewsPage};
    use crate::preferences::PreferenceManager;
    use crate::storage::Database;

    async fn test_app() -> App {
        let db = Database::open(":memory:").await.unwrap();
        let news = NewsClient::direct(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            None,
            Blocklist::default(),
        );
        App::new(db, news, PreferenceManager::from_config(&Config::default()), "us", 10)
    }

    #[tokio::test]
    async fn test_page_loaded_fills_headlines() {
        let mut app = test_app().await;
        let (tx, _rx) = mpsc::channel(1);
        let request = app.headlines.mount().unwrap();
        let page = NewsPage {
            articles: vec![Article::new("One", "https://example.com/1")],
            total_results: 1,
        };
        handle_app_event(
            &mut app,
            AppEvent::PageLoaded {
                request,
                result: Ok(page),
            },
            &tx,
        );
        assert_eq!(app.headlines.items().len(), 1);
        assert!(!app.headlines.has_more());
    }

    #[tokio::test]
    async fn test_saved_without_open_shows_status() {
        let mut app = test_app().await;
        let (tx, _rx) = mpsc::channel(1);
        handle_app_event(
            &mut app,
            AppEvent::ArticleSaved {
                id: "abc".to_string(),
                open: false,
            },
            &tx,
        );
        assert!(app.saved_ids.contains("abc"));
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg.as_ref(), "Article saved for later");
        assert_eq!(app.view, View::Headlines);
    }

    #[tokio::test]
    async fn test_saved_with_open_loads_detail() {
        let mut app = test_app().await;
        let mut article = Article::new("Open me", "https://example.com/open");
        let id = app.db.save_article(&mut article).await.unwrap();

        let (tx, mut rx) = mpsc::channel(1);
        handle_app_event(
            &mut app,
            AppEvent::ArticleSaved {
                id: id.clone(),
                open: true,
            },
            &tx,
        );
        assert_eq!(app.view, View::Article);

        let event = rx.recv().await.unwrap();
        handle_app_event(&mut app, event, &tx);
        assert_eq!(app.focused_article().map(|a| a.title.as_str()), Some("Open me"));
    }

    #[tokio::test]
    async fn test_bookmarks_cleared_resets_list() {
        let mut app = test_app().await;
        let (tx, _rx) = mpsc::channel(1);
        app.view = View::Bookmarks;
        handle_app_event(
            &mut app,
            AppEvent::BookmarksLoaded(Ok(vec![
                Article::new("a", "https://a.example"),
                Article::new("b", "https://b.example"),
            ])),
            &tx,
        );
        assert_eq!(app.bookmarks.len(), 2);
        assert_eq!(app.saved_ids.len(), 2);

        handle_app_event(&mut app, AppEvent::BookmarksCleared(Ok(2)), &tx);
        assert!(app.bookmarks.is_empty());
        assert!(app.saved_ids.is_empty());
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg.as_ref(), "Cleared 2 saved articles");
    }
}
