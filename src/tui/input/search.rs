use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode};

use super::edit_line;

/// Live search: every edit re-filters the all-tasks tab
pub(super) fn handle_search(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.mode = Mode::Navigate,
        KeyCode::Esc => {
            app.search_input.clear();
            app.apply_search();
            app.mode = Mode::Navigate;
        }
        _ => {
            let before = app.search_input.text().to_string();
            if edit_line(&mut app.search_input, key) && app.search_input.text() != before {
                app.apply_search();
            }
        }
    }
}
