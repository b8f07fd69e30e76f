use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

use chrono::NaiveDate;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::backend::{Backend, BackendKind, Gateway, StorageError};
use crate::model::config::Config;
use crate::model::store::{Store, TaskMap};
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

#[derive(Default)]
struct Saves {
    count: Cell<usize>,
    last: RefCell<TaskMap>,
    fail: Cell<bool>,
}

/// In-memory backend that records every save.
pub struct MemoryBackend {
    kind: BackendKind,
    saves: Rc<Saves>,
}

/// Test-side view of a [`MemoryBackend`]'s saves
#[derive(Clone)]
pub struct SaveProbe(Rc<Saves>);

impl SaveProbe {
    pub fn count(&self) -> usize {
        self.0.count.get()
    }

    /// The mapping passed to the latest successful save
    pub fn last(&self) -> TaskMap {
        self.0.last.borrow().clone()
    }

    /// Make later saves fail
    pub fn fail(&self, fail: bool) {
        self.0.fail.set(fail);
    }
}

impl MemoryBackend {
    pub fn new(kind: BackendKind) -> Self {
        MemoryBackend {
            kind,
            saves: Rc::new(Saves::default()),
        }
    }

    pub fn probe(&self) -> SaveProbe {
        SaveProbe(self.saves.clone())
    }
}

impl Backend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn save(&self, tasks: &TaskMap) -> Result<(), StorageError> {
        if self.saves.fail.get() {
            return Err(StorageError::Host("disk full".into()));
        }
        self.saves.count.set(self.saves.count.get() + 1);
        *self.saves.last.borrow_mut() = tasks.clone();
        Ok(())
    }

    fn load(&self) -> Result<TaskMap, StorageError> {
        Ok(self.saves.last.borrow().clone())
    }
}

/// The date every test app treats as today
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Build an App over `backend` holding `(date, title, body)` tasks, with
/// today and the day tab set to 2024-01-01.
pub fn app_with_backend(backend: MemoryBackend, tasks: &[(&str, &str, &str)]) -> (App, SaveProbe) {
    let probe = backend.probe();
    let mut store = Store::new();
    for (date, title, body) in tasks {
        store.create(date, title, body).unwrap();
    }
    let mut app = App::new(
        store,
        Gateway::new(Box::new(backend)),
        &Config::default(),
        PathBuf::from("/tmp/dayplan-test"),
    );
    app.today = test_today();
    app.selected_date = test_today();
    (app, probe)
}

/// Like [`app_with_backend`] with a key-value backend
pub fn app_with_tasks(tasks: &[(&str, &str, &str)]) -> (App, SaveProbe) {
    app_with_backend(MemoryBackend::new(BackendKind::KeyValue), tasks)
}
