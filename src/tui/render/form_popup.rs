use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, FormField};
use crate::tui::line_input::LineInput;

const POPUP_WIDTH: u16 = 64;

/// Render the open form as a bordered popup centered in `area`
pub fn render_form_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(form) = &app.form else {
        return;
    };
    let theme = &app.theme;
    let bg = theme.background;
    let label_style = Style::default().fg(theme.purple).bg(bg);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        form.kind.first_label(),
        label_style,
    )));
    lines.push(input_line(app, &form.title, form.field == FormField::Title));

    if form.kind.has_body() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Description", label_style)));
        lines.extend(body_lines(app, &form.body, form.field == FormField::Body));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        if form.kind.has_body() {
            "Enter save  Tab switch field  Esc cancel"
        } else {
            "Enter confirm  Esc cancel"
        },
        Style::default().fg(theme.dim).bg(bg),
    )));

    // Borders plus content
    let height = lines.len() as u16 + 2;
    let popup = super::centered_rect(POPUP_WIDTH, height, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.highlight).bg(bg))
        .title(Span::styled(
            format!(" {} ", form.kind.heading()),
            Style::default()
                .fg(theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(bg));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

/// One-line field with a block cursor when focused
fn input_line<'a>(app: &App, input: &'a LineInput, focused: bool) -> Line<'a> {
    let text_style = Style::default().fg(app.theme.text_bright).bg(app.theme.background);
    if !focused {
        return Line::from(Span::styled(input.text(), text_style));
    }
    let (before, after) = input.split();
    Line::from(vec![
        Span::styled(before, text_style),
        Span::styled("\u{258C}", Style::default().fg(app.theme.highlight)),
        Span::styled(after, text_style),
    ])
}

/// The description field, one display row per line of text
fn body_lines<'a>(app: &App, input: &'a LineInput, focused: bool) -> Vec<Line<'a>> {
    let text_style = Style::default().fg(app.theme.text).bg(app.theme.background);
    let cursor_style = Style::default().fg(app.theme.highlight);
    if focused {
        let (before, after) = input.split();
        let mut lines: Vec<Line> = Vec::new();
        let mut current: Vec<Span> = Vec::new();
        for (i, part) in before.split('\n').enumerate() {
            if i > 0 {
                lines.push(Line::from(std::mem::take(&mut current)));
            }
            current.push(Span::styled(part, text_style));
        }
        current.push(Span::styled("\u{258C}", cursor_style));
        for (i, part) in after.split('\n').enumerate() {
            if i > 0 {
                lines.push(Line::from(std::mem::take(&mut current)));
            }
            current.push(Span::styled(part, text_style));
        }
        lines.push(Line::from(current));
        return lines;
    }
    let text = input.text();
    if text.is_empty() {
        return vec![Line::from(Span::styled(
            "(none)",
            Style::default().fg(app.theme.dim).bg(app.theme.background),
        ))];
    }
    text.split('\n')
        .map(|line| Line::from(Span::styled(line, text_style)))
        .collect()
}
