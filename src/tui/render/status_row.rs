use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode, Tab};

use super::pad_to;

/// Render the bottom row: the search prompt while typing, otherwise the
/// latest status message, otherwise key hints
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let width = area.width as usize;
    let mut spans: Vec<Span> = Vec::new();

    if app.mode == Mode::Search {
        let (before, after) = app.search_input.split();
        let text_style = Style::default().fg(theme.text_bright).bg(bg);
        spans.push(Span::styled(" /", Style::default().fg(theme.highlight).bg(bg)));
        spans.push(Span::styled(before, text_style));
        spans.push(Span::styled("\u{258C}", Style::default().fg(theme.highlight).bg(bg)));
        spans.push(Span::styled(after, text_style));
        spans.push(Span::styled(
            "   Enter keep  Esc clear",
            Style::default().fg(theme.dim).bg(bg),
        ));
    } else if let Some(status) = &app.status {
        let color = if status.error { theme.red } else { theme.green };
        spans.push(Span::styled(
            format!(" {}", status.text),
            Style::default().fg(color).bg(bg),
        ));
    } else {
        let hints = match app.tab {
            Tab::Day => " a add  x toggle  e edit  d delete  \u{2190}\u{2192} day  ? help  q quit",
            Tab::All => " / search  f filter  s page size  [ ] page  ? help  q quit",
        };
        spans.push(Span::styled(hints, Style::default().fg(theme.dim).bg(bg)));
    }

    pad_to(&mut spans, width, Style::default().bg(bg));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn hints_by_default() {
        let (mut app, _) = app_with_tasks(&[]);
        let output = render_to_string(TERM_W, 1, |frame, area| {
            render_status_row(frame, &app, area);
        });
        assert!(output.contains("a add"));

        app.tab = Tab::All;
        let output = render_to_string(TERM_W, 1, |frame, area| {
            render_status_row(frame, &app, area);
        });
        assert!(output.contains("/ search"));
    }

    #[test]
    fn status_message_replaces_hints() {
        let (mut app, saved) = app_with_tasks(&[]);
        saved.fail(true);
        app.add_task("2024-01-01", "milk", "");
        let output = render_to_string(TERM_W, 1, |frame, area| {
            render_status_row(frame, &app, area);
        });
        assert_eq!(output, " Error saving data");
    }

    #[test]
    fn search_prompt_shows_cursor() {
        let (mut app, _) = app_with_tasks(&[]);
        app.tab = Tab::All;
        app.mode = Mode::Search;
        app.search_input.insert_str("milk");
        let output = render_to_string(TERM_W, 1, |frame, area| {
            render_status_row(frame, &app, area);
        });
        assert!(output.starts_with(" /milk\u{258C}"));
    }
}
