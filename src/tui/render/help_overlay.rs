use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;

const KEY_WIDTH: usize = 14;

const GENERAL: &[(&str, &str)] = &[
    ("1 / 2 / Tab", "Day tab / All tab"),
    ("j k \u{2191} \u{2193}", "Move cursor"),
    ("Enter", "Show or hide description"),
    ("a", "Add task"),
    ("e", "Edit task"),
    ("x Space", "Toggle completed"),
    ("d", "Delete task"),
    ("D", "Delete all tasks"),
    ("I / X", "Import / export JSON"),
    ("?", "Help"),
    ("q", "Quit"),
];

const DAY: &[(&str, &str)] = &[
    ("h l \u{2190} \u{2192}", "Previous / next day"),
    ("t", "Today"),
    ("g", "Go to date"),
];

const ALL: &[(&str, &str)] = &[
    ("/", "Search"),
    ("Esc", "Clear search"),
    ("f", "Cycle status filter"),
    ("s", "Cycle page size"),
    ("] [ n p", "Next / previous page"),
    ("g G", "First / last page"),
];

/// Key reference drawn over the whole screen; any key closes it
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let heading = Style::default()
        .fg(theme.purple)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let key_style = Style::default().fg(theme.highlight).bg(bg);
    let text_style = Style::default().fg(theme.text).bg(bg);

    let mut lines: Vec<Line> = Vec::new();
    for (title, keys) in [("General", GENERAL), ("Day tab", DAY), ("All tab", ALL)] {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(title, heading)));
        for (key, action) in keys {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<width$}", key, width = KEY_WIDTH), key_style),
                Span::styled(*action, text_style),
            ]));
        }
    }

    let height = lines.len() as u16 + 2;
    let popup = super::centered_rect(50, height, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.dim).bg(bg))
        .title(Span::styled(" Keys ", heading))
        .style(Style::default().bg(bg));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn lists_keys_by_tab() {
        let (app, _) = app_with_tasks(&[]);
        let output = render_to_string(TERM_W, 40, |frame, area| {
            render_help_overlay(frame, &app, area);
        });
        assert!(output.contains("Keys"));
        assert!(output.contains("Add task"));
        assert!(output.contains("Previous / next day"));
        assert!(output.contains("Cycle page size"));
    }
}
