use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::task::parse_date_key;
use crate::ops::daily::short_date;
use crate::ops::paginate::PageButton;
use crate::ops::summary::summarize;
use crate::tui::app::App;
use crate::util::unicode;

use super::{scroll_offset, spans_width, task_lines};

/// Render the all-tasks tab: counts, active filters, the current page of
/// rows and the page strip
pub fn render_summary_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let summary = summarize(&app.store, &app.query);
    let total = summary.rows.len();
    let pager = app.query.pager();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // counts + query line + blank
            Constraint::Min(1),    // rows
            Constraint::Length(1), // page strip
        ])
        .split(area);

    // Header
    let counts = &summary.counts;
    let dim = Style::default().fg(app.theme.dim).bg(bg);
    let header = vec![
        Line::from(vec![
            Span::styled(" ", Style::default().bg(bg)),
            Span::styled(
                "All Tasks",
                Style::default()
                    .fg(app.theme.text_bright)
                    .bg(bg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  {} total \u{00B7} {} completed \u{00B7} {} pending \u{00B7} {} days",
                    counts.all, counts.completed, counts.pending, counts.active_dates
                ),
                Style::default().fg(app.theme.text).bg(bg),
            ),
        ]),
        Line::from(query_spans(app)),
    ];
    frame.render_widget(
        Paragraph::new(header).style(Style::default().bg(bg)),
        chunks[0],
    );

    // Rows
    let page = summary.page(&app.query);
    let width = chunks[1].width as usize;
    let height = chunks[1].height as usize;
    let mut lines: Vec<Line> = Vec::new();
    if page.is_empty() {
        lines.push(Line::from(Span::styled(" No tasks match.", dim)));
    } else {
        let mut focus = 0;
        for (i, row) in page.iter().enumerate() {
            let is_cursor = i == app.all_cursor;
            if is_cursor {
                focus = lines.len();
            }
            let label = parse_date_key(row.date)
                .map(short_date)
                .unwrap_or_else(|| row.date.to_string());
            let lead = Span::styled(
                unicode::fit_to_width(&label, 13),
                Style::default().fg(app.theme.purple),
            );
            lines.extend(task_lines(
                app,
                row.task,
                vec![lead],
                is_cursor,
                app.expanded.contains(&row.task.id),
                width,
            ));
        }
        let skip = scroll_offset(focus, height);
        lines = lines.into_iter().skip(skip).collect();
    }
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(bg)),
        chunks[1],
    );

    // Footer: page buttons left, range right
    let mut footer: Vec<Span> = vec![Span::styled(" ", Style::default().bg(bg))];
    for button in pager.buttons(total) {
        match button {
            PageButton::Page { number, current: true } => footer.push(Span::styled(
                format!("[{}]", number),
                Style::default()
                    .fg(app.theme.text_bright)
                    .bg(app.theme.selection_bg)
                    .add_modifier(Modifier::BOLD),
            )),
            PageButton::Page { number, .. } => footer.push(Span::styled(
                format!(" {} ", number),
                Style::default().fg(app.theme.text).bg(bg),
            )),
            PageButton::Ellipsis => footer.push(Span::styled(" \u{2026} ", dim)),
        }
    }
    let range = format!("{} ", pager.range_text(total));
    let used = spans_width(&footer);
    let footer_width = chunks[2].width as usize;
    if used + range.len() < footer_width {
        footer.push(Span::styled(
            " ".repeat(footer_width - used - range.len()),
            Style::default().bg(bg),
        ));
    }
    footer.push(Span::styled(range, dim));
    frame.render_widget(
        Paragraph::new(Line::from(footer)).style(Style::default().bg(bg)),
        chunks[2],
    );
}

/// `show: pending  search: milk  per page: 25`
fn query_spans(app: &App) -> Vec<Span<'static>> {
    let bg = app.theme.background;
    let label = Style::default().fg(app.theme.dim).bg(bg);
    let value = Style::default().fg(app.theme.text).bg(bg);
    let mut spans = vec![
        Span::styled(" show: ", label),
        Span::styled(app.query.status().to_string(), value),
    ];
    let search = app.query.search();
    if !search.is_empty() {
        spans.push(Span::styled("  search: ", label));
        spans.push(Span::styled(
            search.to_string(),
            Style::default().fg(app.theme.highlight).bg(bg),
        ));
    }
    spans.push(Span::styled("  per page: ", label));
    spans.push(Span::styled(app.query.pager().page_size().to_string(), value));
    spans
}
