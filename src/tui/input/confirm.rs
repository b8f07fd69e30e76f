use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, ConfirmAction, Mode};

pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            let action = app.confirm.take();
            app.mode = Mode::Navigate;
            match action {
                Some(ConfirmAction::DeleteTask { date, id, .. }) => app.delete_task(&date, id),
                Some(ConfirmAction::ClearAll) => app.clear_all(),
                None => {}
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.confirm = None;
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::super::handle_key;
    use super::super::test_keys::*;
    use crate::tui::app::Mode;
    use crate::tui::render::test_helpers::*;
    use crossterm::event::KeyCode;

    #[test]
    fn confirm_delete_removes_task_and_date() {
        let (mut app, saved) = app_with_tasks(&[("2024-01-01", "only", "")]);
        handle_key(&mut app, ch('d'));
        handle_key(&mut app, ch('y'));
        assert!(app.store.is_empty());
        assert!(!app.store.tasks().contains_key("2024-01-01"));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(saved.count(), 1);
    }

    #[test]
    fn cancel_keeps_everything() {
        let (mut app, saved) = app_with_tasks(&[("2024-01-01", "a", ""), ("2024-01-02", "b", "")]);
        handle_key(&mut app, ch('D'));
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.store.len(), 2);
        assert!(app.confirm.is_none());

        handle_key(&mut app, ch('D'));
        handle_key(&mut app, ch('n'));
        assert_eq!(app.store.len(), 2);
        assert_eq!(saved.count(), 0);

        handle_key(&mut app, ch('D'));
        handle_key(&mut app, ch('y'));
        assert!(app.store.is_empty());
        assert_eq!(saved.count(), 1);
    }
}
