use crate::app::{App, View};
use crate::feed::FeedStatus;
use crate::news::Article;
use crate::util::{relative_time, strip_control_chars, truncate_to_width};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// "Source · 5 minutes ago", skipping whatever is missing.
pub fn card_meta(article: &Article, now: DateTime<Utc>) -> String {
    let mut parts = Vec::with_capacity(2);
    if let Some(source) = article.source_name.as_deref().filter(|s| !s.is_empty()) {
        parts.push(strip_control_chars(source).into_owned());
    }
    if let Some(published) = article.published_at {
        parts.push(relative_time(published, now));
    }
    parts.join(" · ")
}

fn card(
    app: &App,
    article: &Article,
    selected: bool,
    width: usize,
    now: DateTime<Utc>,
) -> ListItem<'static> {
    let title_style = if selected {
        app.style("card_selected")
    } else {
        app.style("card_title")
    };

    let mut title_spans = Vec::with_capacity(2);
    if app.is_saved(article) {
        title_spans.push(Span::styled("★ ", app.style("card_saved")));
    }
    let title = strip_control_chars(&article.title);
    title_spans.push(Span::styled(
        truncate_to_width(&title, width.saturating_sub(2)).into_owned(),
        title_style,
    ));

    let mut lines = vec![Line::from(title_spans)];
    let meta = card_meta(article, now);
    if !meta.is_empty() {
        lines.push(Line::from(Span::styled(meta, app.style("card_meta"))));
    }
    if let Some(description) = article.description.as_deref().filter(|d| !d.is_empty()) {
        let description = strip_control_chars(description).replace(['\n', '\r'], " ");
        lines.push(Line::from(Span::styled(
            truncate_to_width(&description, width).into_owned(),
            app.style("card_description"),
        )));
    }
    lines.push(Line::default());
    ListItem::new(lines)
}

/// Render the article card list for the current view.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let articles = app.visible_articles();
    let width = area.width.saturating_sub(2) as usize;
    let now = Utc::now();

    let items: Vec<ListItem> = if articles.is_empty() {
        vec![ListItem::new(empty_message(app))]
    } else {
        articles
            .iter()
            .enumerate()
            .map(|(i, article)| card(app, article, i == app.selected_index(), width, now))
            .collect()
    };

    let title = match app.view {
        View::Headlines => format!(" Top headlines: {} ", app.current_category()),
        View::Search => match app.search.as_ref() {
            Some(feed) => format!(" Results for {} ", feed.source()),
            None => " Search ".to_string(),
        },
        View::Bookmarks => " Saved for later ".to_string(),
        View::Article => String::new(),
    };

    let mut state = ListState::default();
    if !articles.is_empty() {
        state.select(Some(app.selected_index()));
    }

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("panel_border_focused"))
            .title(title),
    );
    f.render_stateful_widget(list, area, &mut state);
}

fn empty_message(app: &App) -> &'static str {
    if app.view == View::Bookmarks {
        return if app.bookmarks_loading {
            "Loading..."
        } else {
            "No saved articles. Press s on a headline to save it."
        };
    }
    match app.active_feed().map(|f| f.status()) {
        None => "Press / and type a search term",
        Some(FeedStatus::Idle) | Some(FeedStatus::Loading) => "Loading...",
        Some(FeedStatus::Error) => "Could not load articles. Press r to retry.",
        Some(FeedStatus::Loaded) => "No articles found",
    }
}

/// "Showing N of M articles" plus the load-more affordance.
pub fn footer_text(app: &App) -> String {
    if app.view == View::Bookmarks {
        let n = app.bookmarks.len();
        return format!("{} saved article{}", n, if n == 1 { "" } else { "s" });
    }
    let Some(feed) = app.active_feed() else {
        return String::new();
    };
    let mut text = format!(
        "Showing {} of {} articles",
        feed.items().len(),
        feed.total_available()
    );
    match feed.status() {
        FeedStatus::Loading if !feed.items().is_empty() => text.push_str("  Loading more..."),
        FeedStatus::Error => text.push_str("  [r] retry"),
        _ if feed.can_load_more() => text.push_str("  [m] load more"),
        _ => {}
    }
    text
}

pub fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }
    f.render_widget(
        Paragraph::new(footer_text(app)).style(app.style("load_more")),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_card_meta_joins_present_parts() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut article = Article::new("t", "https://example.com");
        assert_eq!(card_meta(&article, now), "");

        article.source_name = Some("BBC News".to_string());
        assert_eq!(card_meta(&article, now), "BBC News");

        article.published_at = Some(now - Duration::minutes(5));
        assert_eq!(card_meta(&article, now), "BBC News · 5 minutes ago");
    }
}
