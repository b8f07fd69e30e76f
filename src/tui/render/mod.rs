pub mod confirm_popup;
pub mod day_view;
pub mod form_popup;
pub mod help_overlay;
pub mod status_row;
pub mod summary_view;
pub mod tab_bar;
#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Block;
use regex::Regex;

use crate::model::task::Task;
use crate::util::unicode;

use super::app::{App, Tab};

/// Draw the whole screen: tab bar, active view, popups and status row
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: tab bar (2 rows) | content | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // tab bar + separator
            Constraint::Min(1),    // content area
            Constraint::Length(1), // status row
        ])
        .split(area);

    tab_bar::render_tab_bar(frame, app, chunks[0]);

    match app.tab {
        Tab::Day => day_view::render_day_view(frame, app, chunks[1]),
        Tab::All => summary_view::render_summary_view(frame, app, chunks[1]),
    }

    // Popups (rendered on top of content)
    if app.form.is_some() {
        form_popup::render_form_popup(frame, app, chunks[1]);
    }
    if app.confirm.is_some() {
        confirm_popup::render_confirm_popup(frame, app, chunks[1]);
    }
    if app.show_help {
        help_overlay::render_help_overlay(frame, app, frame.area());
    }

    status_row::render_status_row(frame, app, chunks[2]);
}

/// Push spans for text with regex match highlighting. If no regex or no matches,
/// pushes a single span with `base_style`. Otherwise splits text at match boundaries.
pub(super) fn push_highlighted_spans<'a>(
    spans: &mut Vec<Span<'a>>,
    text: &str,
    base_style: Style,
    highlight_style: Style,
    search_re: Option<&Regex>,
) {
    let re = match search_re {
        Some(r) => r,
        None => {
            spans.push(Span::styled(text.to_string(), base_style));
            return;
        }
    };

    let mut last_end = 0;
    for m in re.find_iter(text) {
        if m.start() > last_end {
            spans.push(Span::styled(
                text[last_end..m.start()].to_string(),
                base_style,
            ));
        }
        spans.push(Span::styled(
            text[m.start()..m.end()].to_string(),
            highlight_style,
        ));
        last_end = m.end();
    }
    if last_end < text.len() || text.is_empty() {
        spans.push(Span::styled(text[last_end..].to_string(), base_style));
    }
}

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

/// Pad a line with background up to `width` cells
pub(super) fn pad_to(spans: &mut Vec<Span<'_>>, width: usize, style: Style) {
    let used = spans_width(spans);
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), style));
    }
}

/// `[x]` or `[ ]`
pub(super) fn checkbox(completed: bool) -> &'static str {
    if completed { "[x]" } else { "[ ]" }
}

/// Display lines for one task: the checkbox row, then the description
/// (indented, dimmed) when `expanded`. `lead` goes between the cursor gutter
/// and the checkbox.
pub(super) fn task_lines<'a>(
    app: &App,
    task: &Task,
    lead: Vec<Span<'a>>,
    is_cursor: bool,
    expanded: bool,
    width: usize,
) -> Vec<Line<'a>> {
    let theme = &app.theme;
    let bg = if is_cursor {
        theme.selection_bg
    } else {
        theme.background
    };
    let base = Style::default().bg(bg);
    let search_re = app.active_search_re();
    let match_style = Style::default()
        .fg(theme.search_match_fg)
        .bg(theme.search_match_bg);

    let mut spans: Vec<Span> = Vec::new();
    let gutter = if is_cursor { "\u{258E}" } else { " " };
    spans.push(Span::styled(gutter, base.fg(theme.highlight)));
    spans.extend(lead.into_iter().map(|s| {
        let style = s.style.bg(bg);
        s.style(style)
    }));
    spans.push(Span::styled(
        checkbox(task.completed),
        base.fg(theme.completion_color(task.completed)),
    ));
    spans.push(Span::styled(" ", base));

    let mut title_style = base.fg(if task.completed { theme.dim } else { theme.text_bright });
    if task.completed {
        title_style = title_style.add_modifier(Modifier::CROSSED_OUT);
    }
    if is_cursor {
        title_style = title_style.add_modifier(Modifier::BOLD);
    }
    push_highlighted_spans(&mut spans, &task.title, title_style, match_style, search_re.as_ref());

    // Fold marker and creation time, right-aligned
    let marker = if task.body.is_empty() {
        ""
    } else if expanded {
        " \u{25BE}"
    } else {
        " \u{25B8}"
    };
    spans.push(Span::styled(marker, base.fg(theme.dim)));
    let stamp = format!(" {} ", task.created_at);
    let used = spans_width(&spans);
    let stamp_width = unicode::display_width(&stamp);
    if used + stamp_width <= width {
        spans.push(Span::styled(" ".repeat(width - used - stamp_width), base));
        spans.push(Span::styled(stamp, base.fg(theme.dim)));
    } else {
        pad_to(&mut spans, width, base);
    }

    let mut lines = vec![Line::from(spans)];
    if expanded {
        let body_style = Style::default().fg(theme.dim).bg(theme.background);
        for body_line in task.body.lines() {
            let mut body_spans = vec![Span::styled("       ", body_style)];
            push_highlighted_spans(
                &mut body_spans,
                body_line,
                body_style,
                match_style,
                search_re.as_ref(),
            );
            lines.push(Line::from(body_spans));
        }
    }
    lines
}

/// First line to draw so that `focus` is visible in `height` rows
pub(super) fn scroll_offset(focus: usize, height: usize) -> usize {
    if height == 0 {
        return focus;
    }
    (focus + 1).saturating_sub(height)
}

/// A `width` x `height` rectangle centered in `area`, clipped to it
pub(super) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
