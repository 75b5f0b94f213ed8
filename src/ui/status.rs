use crate::app::{App, View};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Key hints for the current view.
pub fn hints(app: &App) -> &'static str {
    match app.view {
        View::Headlines => {
            "[j/k]move [h/l]category [Enter]open [s]ave [m]ore [r]etry [/]search [B]ookmarks [t]heme [q]uit"
        }
        View::Search if app.search_editing => "Type to search | Enter search | Esc cancel",
        View::Search => "[j/k]move [Enter]open [s]ave [m]ore [r]etry [i]edit [Esc]back [q]uit",
        View::Bookmarks => "[j/k]move [Enter]open [o]pen link [C]lear all [Esc]back [q]uit",
        View::Article => "[j/k]scroll [s]ave [o]pen link [Esc]back [q]uit",
    }
}

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let (text, style): (Cow<'_, str>, _) = match &app.status_message {
        Some((msg, _)) if app.status_is_error => (
            Cow::Owned(format!("{}  [Esc] dismiss", msg)),
            app.style("notice_error"),
        ),
        Some((msg, _)) => (Cow::Borrowed(msg.as_ref()), app.style("status_bar")),
        None => (Cow::Borrowed(hints(app)), app.style("status_bar")),
    };

    f.render_widget(Paragraph::new(text).style(style), area);
}
