//! Input handling for the TUI.
//!
//! This module processes keyboard input and dispatches to the appropriate
//! handler based on current view and mode.

use crate::app::{App, AppEvent, ConfirmAction, View};
use crate::feed::PageRequest;
use crate::preferences::{CATEGORY_KEY, THEME_KEY};
use crate::util::{validate_url_for_open, MAX_SEARCH_QUERY_LENGTH};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{
    spawn_bookmarks_load, spawn_clear_bookmarks, spawn_detail_load, spawn_page_load, spawn_save,
};
use super::Action;

/// Lines moved per page scroll in the article view.
const PAGE_SCROLL: usize = 10;

/// Main input dispatch function.
///
/// Routes input to the appropriate handler based on current mode and view.
pub(super) async fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Ok(Action::Quit);
    }

    // Confirmation dialog captures all keys when visible
    if app.pending_confirm.is_some() {
        return Ok(handle_confirm_input(app, code, event_tx));
    }

    if app.view == View::Search && app.search_editing {
        return Ok(handle_search_input(app, code, event_tx));
    }

    match code {
        KeyCode::Char('q') => return Ok(Action::Quit),
        KeyCode::Esc => {
            // First Esc dismisses a notice, the next one navigates back
            if !app.dismiss_status() {
                app.back();
            }
        }
        KeyCode::Char('t') => toggle_theme(app).await,
        KeyCode::Char('/') => app.enter_search(),
        KeyCode::Char('B') => {
            if app.view != View::Bookmarks {
                match app.view {
                    View::Search => app.leave_search(),
                    View::Article => app.exit_detail(),
                    _ => {}
                }
                app.view = View::Bookmarks;
                app.bookmarks_loading = true;
                spawn_bookmarks_load(app.db.clone(), event_tx.clone());
            }
        }
        KeyCode::Char('C') => {
            app.pending_confirm = Some(ConfirmAction::ClearBookmarks);
        }
        KeyCode::Char('o') => open_in_browser(app),
        KeyCode::Char('s') => {
            if let Some(article) = app.focused_article().cloned() {
                spawn_save(app.db.clone(), article, false, event_tx.clone());
            }
        }
        _ => match app.view {
            View::Article => handle_article_input(app, code),
            View::Headlines | View::Search | View::Bookmarks => {
                handle_list_input(app, code, event_tx).await
            }
        },
    }
    Ok(Action::Continue)
}

fn spawn_request(app: &App, request: Option<PageRequest>, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(request) = request {
        spawn_page_load(app.news.clone(), request, event_tx.clone());
    }
}

/// Keys shared by the three list views.
async fn handle_list_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Enter => {
            // Opening saves first; the detail view reads from the store
            if let Some(article) = app.selected_article().cloned() {
                if app.view == View::Bookmarks {
                    let generation = app.open_detail(article.id.clone());
                    spawn_detail_load(
                        app.db.clone(),
                        article.id,
                        generation,
                        event_tx.clone(),
                    );
                } else {
                    spawn_save(app.db.clone(), article, true, event_tx.clone());
                }
            }
        }
        KeyCode::Char('m') => {
            let outcome = match app.active_feed_mut() {
                None => return,
                Some(feed) if feed.is_loading() => Err("Already loading..."),
                Some(feed) => match feed.load_more() {
                    Some(request) => Ok(request),
                    None if feed.error().is_some() => Err("Press r to retry"),
                    None => Err("No more articles"),
                },
            };
            match outcome {
                Ok(request) => spawn_request(app, Some(request), event_tx),
                Err(msg) => app.set_status(msg),
            }
        }
        KeyCode::Char('r') => {
            let request = app.active_feed_mut().and_then(|feed| feed.retry());
            if request.is_some() {
                app.dismiss_status();
                app.set_status("Retrying...");
            }
            spawn_request(app, request, event_tx);
        }
        KeyCode::Char('l') | KeyCode::Tab if app.view == View::Headlines => {
            let request = app.next_category();
            remember_category(app).await;
            spawn_request(app, request, event_tx);
        }
        KeyCode::Char('h') | KeyCode::BackTab if app.view == View::Headlines => {
            let request = app.prev_category();
            remember_category(app).await;
            spawn_request(app, request, event_tx);
        }
        KeyCode::Char('i') if app.view == View::Search => {
            app.search_editing = true;
        }
        _ => {}
    }
}

fn handle_article_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::PageDown | KeyCode::Char(' ') => app.scroll_down(PAGE_SCROLL),
        KeyCode::PageUp => app.scroll_up(PAGE_SCROLL),
        KeyCode::Char('b') | KeyCode::Backspace => app.exit_detail(),
        _ => {}
    }
}

/// Handle typing into the search box.
fn handle_search_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match code {
        KeyCode::Esc => {
            // Nothing searched yet: leave the view entirely
            if app.search.is_none() {
                app.leave_search();
            } else {
                app.search_editing = false;
            }
        }
        KeyCode::Enter => {
            let page_size = app.headlines.page_size();
            let request = app.submit_search(page_size);
            spawn_request(app, request, event_tx);
        }
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(c) => {
            if app.search_input.len() + c.len_utf8() <= MAX_SEARCH_QUERY_LENGTH {
                app.search_input.push(c);
            } else {
                app.set_status(format!(
                    "Search query too long (max {} chars)",
                    MAX_SEARCH_QUERY_LENGTH
                ));
            }
        }
        _ => {}
    }
    Action::Continue
}

fn handle_confirm_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(ConfirmAction::ClearBookmarks) = app.pending_confirm.take() {
                app.set_status("Clearing saved articles...");
                spawn_clear_bookmarks(app.db.clone(), event_tx.clone());
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_confirm = None;
            app.set_status("Cancelled");
        }
        _ => {}
    }
    Action::Continue
}

fn open_in_browser(app: &mut App) {
    let Some(url) = app.focused_article().map(|a| a.url.clone()) else {
        return;
    };
    match validate_url_for_open(&url) {
        Err(e) => app.set_error(e.to_string()),
        Ok(url) => {
            if let Err(e) = open::that(url.as_str()) {
                app.set_error(format!("Failed to open browser: {}", e));
            } else {
                app.set_status("Opening in browser...");
            }
        }
    }
}

async fn toggle_theme(app: &mut App) {
    let variant = app.cycle_theme();
    if let Err(e) = app.prefs.set(&app.db, THEME_KEY, variant.key()).await {
        tracing::warn!(error = %e, "Failed to persist theme preference");
    }
    app.set_status(format!("Theme: {}", variant.name()));
}

async fn remember_category(app: &mut App) {
    let category = app.current_category();
    if let Err(e) = app.prefs.set(&app.db, CATEGORY_KEY, category).await {
        tracing::warn!(error = %e, "Failed to persist category preference");
    }
}
