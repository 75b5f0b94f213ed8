//! Render functions for the TUI.
//!
//! This module handles all rendering logic, dispatching to the appropriate
//! view based on application state.

use crate::app::{App, ConfirmAction, View};
use crate::news::CATEGORIES;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{cards, reader, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 50;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Main render dispatch function.
///
/// Routes to the appropriate view renderer based on current application state.
/// Handles terminal size validation before rendering.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    match app.view {
        View::Article => render_article(f, app),
        View::Headlines | View::Search | View::Bookmarks => render_list_view(f, app),
    }

    if let Some(ref confirm) = app.pending_confirm {
        render_confirm_overlay(f, app, confirm);
    }
}

/// Header row, card list, footer row, status bar.
fn render_list_view(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    cards::render(f, app, chunks[1]);
    cards::render_footer(f, app, chunks[2]);
    status::render(f, app, chunks[3]);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let line = match app.view {
        View::Headlines => category_tabs(app),
        View::Search => {
            let cursor = if app.search_editing { "_" } else { "" };
            Line::from(vec![
                Span::styled(" Search: ", app.style("tab_active")),
                Span::raw(format!(" {}{}", app.search_input, cursor)),
            ])
        }
        View::Bookmarks => Line::from(Span::styled(" Saved articles ", app.style("tab_active"))),
        View::Article => Line::default(),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn category_tabs(app: &App) -> Line<'static> {
    let mut spans = Vec::with_capacity(CATEGORIES.len() * 2);
    for (i, category) in CATEGORIES.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("|", app.style("tab_separator")));
        }
        let style = if i == app.category_index {
            app.style("tab_active")
        } else {
            app.style("tab_inactive")
        };
        spans.push(Span::styled(format!(" {} ", capitalize(category)), style));
    }
    Line::from(spans)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render the article view (detail + status bar).
fn render_article(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    reader::render(f, app, chunks[0]);
    status::render(f, app, chunks[1]);
}

/// Render a confirmation dialog overlay centered on screen.
fn render_confirm_overlay(f: &mut Frame, app: &App, confirm: &ConfirmAction) {
    let area = f.area();

    let text = match confirm {
        ConfirmAction::ClearBookmarks => {
            "Remove all saved articles?\n\nThis cannot be undone.\n\n(y) Confirm  (n/Esc) Cancel"
        }
    };

    let width = 50u16.min(area.width.saturating_sub(4));
    let height = 7u16.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);

    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("overlay_border"))
                .title(" Confirm "),
        )
        .alignment(Alignment::Center)
        .style(app.style("detail_body"));

    f.render_widget(paragraph, overlay);
}
