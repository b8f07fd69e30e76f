use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::task::date_key;
use crate::ops::transfer;
use crate::tui::app::{App, ConfirmAction, Form, FormKind, Mode, Tab};

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('c') {
            app.should_quit = true;
        }
        return;
    }

    // Keys shared by both tabs
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('?') => {
            app.show_help = true;
            return;
        }
        KeyCode::Tab => {
            app.tab = match app.tab {
                Tab::Day => Tab::All,
                Tab::All => Tab::Day,
            };
            app.clamp_cursors();
            return;
        }
        KeyCode::Char('1') => {
            app.tab = Tab::Day;
            return;
        }
        KeyCode::Char('2') => {
            app.tab = Tab::All;
            app.clamp_cursors();
            return;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_cursor(1);
            return;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.move_cursor(-1);
            return;
        }
        KeyCode::Enter => {
            app.toggle_expanded();
            return;
        }
        KeyCode::Char('a') => {
            open_add_form(app);
            return;
        }
        KeyCode::Char('x') | KeyCode::Char(' ') => {
            if let Some((date, id)) = app.selected_task() {
                app.toggle_task(&date, id);
            }
            return;
        }
        KeyCode::Char('e') => {
            open_edit_form(app);
            return;
        }
        KeyCode::Char('d') => {
            if let Some((date, id)) = app.selected_task() {
                let title = app
                    .store
                    .find(&date, id)
                    .map(|t| t.title.clone())
                    .unwrap_or_default();
                app.confirm = Some(ConfirmAction::DeleteTask { date, id, title });
                app.mode = Mode::Confirm;
            }
            return;
        }
        KeyCode::Char('D') => {
            if !app.store.is_empty() {
                app.confirm = Some(ConfirmAction::ClearAll);
                app.mode = Mode::Confirm;
            }
            return;
        }
        KeyCode::Char('X') => {
            let name = transfer::default_export_name(Local::now().date_naive());
            app.form = Some(Form::with_values(FormKind::Export, &name, ""));
            app.mode = Mode::Form;
            return;
        }
        KeyCode::Char('I') => {
            app.form = Some(Form::new(FormKind::Import));
            app.mode = Mode::Form;
            return;
        }
        _ => {}
    }

    match app.tab {
        Tab::Day => handle_day_key(app, key),
        Tab::All => handle_all_key(app, key),
    }
}

fn handle_day_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.shift_day(false),
        KeyCode::Char('l') | KeyCode::Right => app.shift_day(true),
        KeyCode::Char('t') => app.set_date(app.today),
        KeyCode::Char('g') => {
            let current = app.selected_key();
            app.form = Some(Form::with_values(FormKind::GoToDate, &current, ""));
            app.mode = Mode::Form;
        }
        _ => {}
    }
}

fn handle_all_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('f') => app.cycle_status(),
        KeyCode::Char('s') => app.cycle_page_size(),
        KeyCode::Char('/') => app.mode = Mode::Search,
        KeyCode::Esc => {
            app.search_input.clear();
            app.apply_search();
        }
        KeyCode::Char(']') | KeyCode::Char('n') | KeyCode::PageDown | KeyCode::Right => {
            app.next_page()
        }
        KeyCode::Char('[') | KeyCode::Char('p') | KeyCode::PageUp | KeyCode::Left => {
            app.prev_page()
        }
        KeyCode::Char('g') | KeyCode::Home => app.first_page(),
        KeyCode::Char('G') | KeyCode::End => app.last_page(),
        _ => {}
    }
}

/// New task form: for the shown date on the day tab, today otherwise
fn open_add_form(app: &mut App) {
    let date = match app.tab {
        Tab::Day => app.selected_key(),
        Tab::All => date_key(app.today),
    };
    app.form = Some(Form::new(FormKind::Add { date }));
    app.mode = Mode::Form;
}

fn open_edit_form(app: &mut App) {
    let Some((date, id)) = app.selected_task() else {
        return;
    };
    let Some(task) = app.store.find(&date, id) else {
        return;
    };
    let form = Form::with_values(FormKind::Edit { date, id }, &task.title, &task.body);
    app.form = Some(form);
    app.mode = Mode::Form;
}

#[cfg(test)]
mod tests {
    use super::super::handle_key;
    use super::super::test_keys::*;
    use crate::tui::app::{ConfirmAction, FormKind, Mode, Tab};
    use crate::tui::render::test_helpers::*;
    use crossterm::event::KeyCode;

    #[test]
    fn toggle_and_delete_from_day_tab() {
        let (mut app, saved) = app_with_tasks(&[("2024-01-01", "a", ""), ("2024-01-01", "b", "")]);
        handle_key(&mut app, ch('j'));
        handle_key(&mut app, ch('x'));
        assert!(app.store.tasks_on("2024-01-01")[1].completed);
        assert_eq!(saved.count(), 1);

        handle_key(&mut app, ch('d'));
        assert_eq!(app.mode, Mode::Confirm);
        assert!(matches!(
            app.confirm,
            Some(ConfirmAction::DeleteTask { ref title, .. }) if title == "b"
        ));
    }

    #[test]
    fn day_navigation() {
        let (mut app, _) = app_with_tasks(&[]);
        handle_key(&mut app, ch('l'));
        assert_eq!(app.selected_key(), "2024-01-02");
        handle_key(&mut app, key(KeyCode::Left));
        handle_key(&mut app, ch('h'));
        assert_eq!(app.selected_key(), "2023-12-31");
        handle_key(&mut app, ch('t'));
        assert_eq!(app.selected_date, app.today);
    }

    #[test]
    fn add_form_targets_selected_date() {
        let (mut app, _) = app_with_tasks(&[]);
        handle_key(&mut app, ch('l'));
        handle_key(&mut app, ch('a'));
        assert_eq!(app.mode, Mode::Form);
        assert_eq!(
            app.form.as_ref().unwrap().kind,
            FormKind::Add {
                date: "2024-01-02".into()
            }
        );
    }

    #[test]
    fn edit_form_prefills() {
        let (mut app, _) = app_with_tasks(&[("2024-01-01", "Buy milk", "2 litres")]);
        handle_key(&mut app, ch('e'));
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.title.text(), "Buy milk");
        assert_eq!(form.body.text(), "2 litres");
    }

    #[test]
    fn all_tab_keys() {
        let (mut app, _) = app_with_tasks(&[("2024-01-01", "a", "")]);
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.tab, Tab::All);
        handle_key(&mut app, ch('f'));
        assert_eq!(app.query.status().to_string(), "completed");
        handle_key(&mut app, ch('s'));
        assert_eq!(app.query.pager().page_size(), 50);
        handle_key(&mut app, ch('/'));
        assert_eq!(app.mode, Mode::Search);
    }

    #[test]
    fn clear_all_needs_tasks() {
        let (mut app, _) = app_with_tasks(&[]);
        handle_key(&mut app, ch('D'));
        assert_eq!(app.mode, Mode::Navigate);
        let (mut app, _) = app_with_tasks(&[("2024-01-01", "a", "")]);
        handle_key(&mut app, ch('D'));
        assert_eq!(app.confirm, Some(ConfirmAction::ClearAll));
    }

    #[test]
    fn quit() {
        let (mut app, _) = app_with_tasks(&[]);
        handle_key(&mut app, ch('q'));
        assert!(app.should_quit);
    }
}
