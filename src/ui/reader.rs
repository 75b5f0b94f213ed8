use crate::app::{App, DetailState};
use crate::news::Article;
use crate::util::{format_date, strip_char_count_suffix, strip_control_chars};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn push_paragraph(lines: &mut Vec<Line<'static>>, text: &str, style: Style) {
    for line in strip_control_chars(text).lines() {
        lines.push(Line::from(Span::styled(line.to_string(), style)));
    }
    lines.push(Line::default());
}

/// Build the detail page for a stored article.
pub fn article_lines(app: &App, article: &Article) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        strip_control_chars(&article.title).into_owned(),
        app.style("detail_heading"),
    )));

    let mut meta = Vec::with_capacity(3);
    if let Some(source) = article.source_name.as_deref() {
        meta.push(strip_control_chars(source).into_owned());
    }
    if let Some(published) = article.published_at {
        meta.push(format_date(published));
    }
    if let Some(author) = article.author.as_deref().filter(|a| !a.is_empty()) {
        meta.push(format!("By {}", strip_control_chars(author)));
    }
    if !meta.is_empty() {
        lines.push(Line::from(Span::styled(meta.join(" · "), app.style("detail_meta"))));
    }
    lines.push(Line::default());

    if let Some(description) = article.description.as_deref().filter(|d| !d.is_empty()) {
        push_paragraph(&mut lines, description, app.style("detail_body"));
    }
    if let Some(content) = article.content.as_deref() {
        let content = strip_char_count_suffix(content);
        if !content.is_empty() {
            push_paragraph(&mut lines, content, app.style("detail_body"));
        }
    }

    lines.push(Line::from(vec![
        Span::styled("Read the full story: ", app.style("detail_meta")),
        Span::styled(
            strip_control_chars(&article.url).into_owned(),
            app.style("detail_link"),
        ),
    ]));
    lines
}

/// Render the article detail view
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    // Guard against zero-width/height areas during extreme resizes
    if area.width < 3 || area.height < 3 {
        return;
    }

    let lines = match &app.detail {
        DetailState::Loaded(article) => article_lines(app, article),
        DetailState::Loading { .. } => vec![Line::from("Loading article...")],
        DetailState::Idle => vec![Line::from("No article selected")],
    };

    // Clamp against the unwrapped line count before rendering
    let visible = area.height.saturating_sub(2) as usize;
    app.clamp_scroll(lines.len(), visible);

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border"))
                .title(" Article "),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.scroll_offset as u16, 0));

    f.render_widget(paragraph, area);
}
