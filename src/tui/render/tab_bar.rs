use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::summary::StatusFilter;
use crate::tui::app::{App, Tab};

use super::spans_width;

/// Render the tab bar: Day and All tabs, with separator line below
pub fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Split into tab row and separator row
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tabs
            Constraint::Length(1), // separator
        ])
        .split(area);

    let sep_cols = render_tabs(frame, app, chunks[0]);
    render_separator(frame, app, chunks[1], &sep_cols);
}

/// Render tabs and return the column positions of each separator character.
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) -> Vec<usize> {
    let bg = app.theme.background;
    let mut spans: Vec<Span> = Vec::new();
    let mut sep_cols: Vec<usize> = Vec::new();
    let sep = Span::styled("\u{2502}", Style::default().fg(app.theme.dim).bg(bg));

    // Leading icon
    spans.push(Span::styled(" ", Style::default().bg(bg)));
    spans.push(Span::styled(
        "\u{25B6}",
        Style::default().fg(app.theme.purple).bg(bg),
    ));
    spans.push(Span::styled(" ", Style::default().bg(bg)));

    // Day tab shows how much is left on the selected date
    let remaining = app.day_tasks().iter().filter(|t| !t.completed).count();
    let day_label = if remaining > 0 {
        format!(" Day {} ", remaining)
    } else {
        " Day ".to_string()
    };
    spans.push(Span::styled(day_label, tab_style(app, app.tab == Tab::Day)));
    sep_cols.push(spans_width(&spans));
    spans.push(sep.clone());

    let all_label = format!(" All {} ", app.store.len());
    spans.push(Span::styled(all_label, tab_style(app, app.tab == Tab::All)));
    sep_cols.push(spans_width(&spans));
    spans.push(sep);

    // Storage medium, right-aligned
    let medium = format!("{} ", app.backend_kind());
    let used = spans_width(&spans);
    let width = area.width as usize;
    if used + medium.len() < width {
        spans.push(Span::styled(
            " ".repeat(width - used - medium.len()),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(medium, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let tabs = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(tabs, area);
    sep_cols
}

fn render_separator(frame: &mut Frame, app: &App, area: Rect, sep_cols: &[usize]) {
    let width = area.width as usize;
    let bg = app.theme.background;
    let dim = app.theme.dim;

    let indicator = filter_indicator(app);
    let indicator_width = spans_width(&indicator);
    // One space before the indicator, one after
    let separator_end = if indicator.is_empty() {
        width
    } else {
        width.saturating_sub(indicator_width + 2)
    };

    let mut sep_text = String::with_capacity(separator_end * 3);
    for col in 0..separator_end {
        if sep_cols.contains(&col) {
            sep_text.push('\u{2534}');
        } else {
            sep_text.push('\u{2500}');
        }
    }
    let mut spans = vec![Span::styled(sep_text, Style::default().fg(dim).bg(bg))];
    if !indicator.is_empty() {
        spans.push(Span::styled(" ", Style::default().bg(bg)));
        spans.extend(indicator);
        spans.push(Span::styled(" ", Style::default().bg(bg)));
    }

    let sep_widget = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(sep_widget, area);
}

/// "filter: pending /milk" on the all-tasks tab when narrowing is active
fn filter_indicator(app: &App) -> Vec<Span<'static>> {
    let bg = app.theme.background;
    let status = app.query.status();
    let search = app.query.search().to_string();
    if app.tab != Tab::All || (status == StatusFilter::All && search.is_empty()) {
        return Vec::new();
    }

    let mut spans = vec![Span::styled(
        "filter: ",
        Style::default().fg(app.theme.purple).bg(bg),
    )];
    if status != StatusFilter::All {
        let color = app.theme.completion_color(status == StatusFilter::Completed);
        spans.push(Span::styled(status.to_string(), Style::default().fg(color).bg(bg)));
    }
    if !search.is_empty() {
        if status != StatusFilter::All {
            spans.push(Span::styled(" ", Style::default().bg(bg)));
        }
        spans.push(Span::styled(
            format!("/{}", search),
            Style::default().fg(app.theme.highlight).bg(bg),
        ));
    }
    spans
}

/// Style for a tab: highlighted if current, normal otherwise
fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text).bg(app.theme.background)
    }
}
