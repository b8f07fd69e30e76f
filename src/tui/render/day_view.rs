use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::daily::{daily_view, short_date};
use crate::tui::app::App;

use super::{scroll_offset, task_lines};

/// Render the day tab: label, counts, then the date's tasks
pub fn render_day_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let view = daily_view(&app.store, app.selected_date, app.today);
    let width = area.width as usize;

    let mut header = vec![
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled(
            view.label.clone(),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    // Relative labels still show which date they mean
    if view.label.ends_with("Tasks") {
        header.push(Span::styled(
            format!("  {}", short_date(view.date)),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }
    let counts = Line::from(Span::styled(
        format!(
            " {} \u{00B7} {} completed \u{00B7} {} remaining",
            view.count_text(),
            view.counts.completed,
            view.counts.remaining
        ),
        Style::default().fg(app.theme.text).bg(bg),
    ));

    let mut lines: Vec<Line> = vec![Line::from(header), counts, Line::from("")];
    let list_height = (area.height as usize).saturating_sub(lines.len());

    if view.tasks.is_empty() {
        lines.push(Line::from(Span::styled(
            " No tasks for this day. Press a to add one.",
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    } else {
        let mut rows: Vec<Line> = Vec::new();
        let mut focus = 0;
        for (i, task) in view.tasks.iter().enumerate() {
            let is_cursor = i == app.day_cursor;
            if is_cursor {
                focus = rows.len();
            }
            let number = Span::styled(
                format!("{:>2}. ", i + 1),
                Style::default().fg(app.theme.dim),
            );
            rows.extend(task_lines(
                app,
                task,
                vec![number],
                is_cursor,
                app.expanded.contains(&task.id),
                width,
            ));
        }
        let skip = scroll_offset(focus, list_height);
        lines.extend(rows.into_iter().skip(skip).take(list_height));
    }

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn day_with_tasks() {
        let (mut app, _) = app_with_tasks(&[
            ("2024-01-01", "Buy milk", "2 litres\nsemi-skimmed"),
            ("2024-01-01", "Call mom", ""),
            ("2024-01-02", "Elsewhere", ""),
        ]);
        let id = app.store.tasks_on("2024-01-01")[0].id;
        app.store.toggle("2024-01-01", id).unwrap();
        app.expanded.insert(id);

        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_day_view(frame, &app, area);
        });
        assert!(output.contains("Today's Tasks  Jan 1, 2024"));
        assert!(output.contains("2 tasks \u{00B7} 1 completed \u{00B7} 1 remaining"));
        assert!(output.contains(" 1. [x] Buy milk"));
        assert!(output.contains("semi-skimmed"));
        assert!(output.contains(" 2. [ ] Call mom"));
        assert!(!output.contains("Elsewhere"));
    }

    #[test]
    fn collapsed_body_is_hidden() {
        let (app, _) = app_with_tasks(&[("2024-01-01", "Buy milk", "2 litres")]);
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_day_view(frame, &app, area);
        });
        assert!(output.contains("Buy milk \u{25B8}"));
        assert!(!output.contains("2 litres"));
    }

    #[test]
    fn empty_future_day() {
        let (mut app, _) = app_with_tasks(&[]);
        app.shift_day(true);
        app.shift_day(true);
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_day_view(frame, &app, area);
        });
        assert!(output.contains("Wednesday, January 3, 2024"));
        assert!(output.contains("0 tasks"));
        assert!(output.contains("No tasks for this day."));
    }

    #[test]
    fn cursor_stays_visible_in_long_lists() {
        let rows: Vec<(&str, &str, &str)> = (0..40).map(|_| ("2024-01-01", "chore", "")).collect();
        let (mut app, _) = app_with_tasks(&rows);
        app.day_cursor = 39;
        let output = render_to_string(TERM_W, 12, |frame, area| {
            render_day_view(frame, &app, area);
        });
        assert!(output.contains("40. [ ] chore"));
        assert!(!output.contains(" 1. [ ] chore"));
    }
}
