use crossterm::event::{KeyCode, KeyEvent};

use crate::model::task::parse_date_key;
use crate::tui::app::{App, FormField, FormKind, Mode};

use super::{edit_line, single_line};

pub(super) fn handle_form(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => close_form(app),
        KeyCode::Enter => submit_form(app),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
            if let Some(form) = &mut app.form {
                form.switch_field();
            }
        }
        _ => {
            if let Some(form) = &mut app.form {
                edit_line(form.focused_mut(), key);
            }
        }
    }
}

/// Pasted newlines survive only in the description field
pub(super) fn paste_into_form(app: &mut App, text: &str) {
    let Some(form) = &mut app.form else {
        return;
    };
    match form.field {
        FormField::Title => form.title.insert_str(&single_line(text)),
        FormField::Body => form.body.insert_str(&text.replace("\r\n", "\n").replace('\r', "\n")),
    }
}

fn close_form(app: &mut App) {
    app.form = None;
    app.mode = Mode::Navigate;
}

fn submit_form(app: &mut App) {
    let Some(form) = app.form.clone() else {
        close_form(app);
        return;
    };
    let value = form.title.text().trim().to_string();
    let done = match &form.kind {
        FormKind::Add { date } => app.add_task(date, form.title.text(), form.body.text()),
        FormKind::Edit { date, id } => {
            app.update_task(date, *id, form.title.text(), form.body.text())
        }
        FormKind::GoToDate => match parse_date_key(&value) {
            Some(date) => {
                app.set_date(date);
                true
            }
            None => {
                app.notify(format!("Not a date: {}", value), true);
                false
            }
        },
        FormKind::Import => {
            if value.is_empty() {
                false
            } else {
                app.import_from(&value);
                true
            }
        }
        FormKind::Export => {
            if value.is_empty() {
                false
            } else {
                app.export_to(&value);
                true
            }
        }
    };
    // Rejected input keeps the form open
    if done {
        close_form(app);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_keys::*;
    use super::super::{handle_key, handle_paste};
    use crate::tui::app::{Mode, Tab};
    use crate::tui::render::test_helpers::*;
    use crossterm::event::KeyCode;

    #[test]
    fn add_task_through_form() {
        let (mut app, saved) = app_with_tasks(&[]);
        handle_key(&mut app, ch('a'));
        type_text(&mut app, "Buy \"milk\", eggs");
        handle_key(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "from the shop");
        handle_key(&mut app, key(KeyCode::Enter));

        assert_eq!(app.mode, Mode::Navigate);
        let tasks = app.store.tasks_on("2024-01-01");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy \"milk\", eggs");
        assert_eq!(tasks[0].body, "from the shop");
        assert_eq!(saved.count(), 1);
    }

    #[test]
    fn blank_title_keeps_form_open() {
        let (mut app, saved) = app_with_tasks(&[]);
        handle_key(&mut app, ch('a'));
        type_text(&mut app, "   ");
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Form);
        assert!(app.store.is_empty());
        assert_eq!(saved.count(), 0);
        assert!(app.status.is_none());

        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.form.is_none());
    }

    #[test]
    fn edit_keeps_completion() {
        let (mut app, _) = app_with_tasks(&[("2024-01-01", "Old", "")]);
        handle_key(&mut app, ch('x'));
        handle_key(&mut app, ch('e'));
        handle_key(&mut app, ctrl('u'));
        type_text(&mut app, "New");
        handle_key(&mut app, key(KeyCode::Enter));
        let task = &app.store.tasks_on("2024-01-01")[0];
        assert_eq!(task.title, "New");
        assert!(task.completed);
    }

    #[test]
    fn paste_keeps_newlines_in_body_only() {
        let (mut app, _) = app_with_tasks(&[]);
        handle_key(&mut app, ch('a'));
        handle_paste(&mut app, "two\nlines");
        handle_key(&mut app, key(KeyCode::Tab));
        handle_paste(&mut app, "line 1\r\nline 2");
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.title.text(), "two lines");
        assert_eq!(form.body.text(), "line 1\nline 2");
    }

    #[test]
    fn go_to_date() {
        let (mut app, _) = app_with_tasks(&[]);
        handle_key(&mut app, ch('g'));
        handle_key(&mut app, ctrl('u'));
        type_text(&mut app, "2024-02-29");
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.selected_key(), "2024-02-29");
        assert_eq!(app.mode, Mode::Navigate);

        handle_key(&mut app, ch('g'));
        handle_key(&mut app, ctrl('u'));
        type_text(&mut app, "someday");
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Form);
        assert!(app.status.as_ref().unwrap().error);
    }

    #[test]
    fn export_then_import_doubles_tasks() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let path = path.to_str().unwrap();

        let (mut app, _) = app_with_tasks(&[("2024-01-01", "a", ""), ("2024-01-03", "b", "")]);
        app.tab = Tab::All;
        handle_key(&mut app, ch('X'));
        handle_key(&mut app, ctrl('u'));
        type_text(&mut app, path);
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(std::path::Path::new(path).exists());

        handle_key(&mut app, ch('I'));
        type_text(&mut app, path);
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.store.len(), 4);
        assert_eq!(app.store.tasks_on("2024-01-03").len(), 2);
    }
}
