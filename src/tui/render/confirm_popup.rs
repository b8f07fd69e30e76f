use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, ConfirmAction};
use crate::util::unicode;

const MAX_TITLE_WIDTH: usize = 40;

pub fn render_confirm_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(action) = &app.confirm else {
        return;
    };
    let theme = &app.theme;
    let bg = theme.background;

    let question = match action {
        ConfirmAction::DeleteTask { title, .. } => format!(
            "Delete '{}'? (y/n)",
            unicode::truncate_to_width(title, MAX_TITLE_WIDTH)
        ),
        ConfirmAction::ClearAll => format!("Delete all {} tasks? (y/n)", app.store.len()),
    };

    let width = (unicode::display_width(&question) as u16).saturating_add(6);
    let popup = super::centered_rect(width, 3, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.red).bg(bg))
        .style(Style::default().bg(bg));
    let text = Paragraph::new(Line::from(Span::styled(
        question,
        Style::default()
            .fg(theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(block);

    frame.render_widget(Clear, popup);
    frame.render_widget(text, popup);
}
