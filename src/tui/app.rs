use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{Days, Local, NaiveDate};
use crossterm::event::{self, DisableFocusChange, EnableFocusChange, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use regex::Regex;

use crate::io::backend::{BackendKind, Gateway};
use crate::io::config_io;
use crate::io::host::{HostShell, ShellSignal};
use crate::io::state::{UiState, read_ui_state, write_ui_state};
use crate::io::storage::{self, Medium};
use crate::model::config::Config;
use crate::model::store::Store;
use crate::model::task::{Task, TaskId, date_key};
use crate::ops::summary::{StatusFilter, SummaryQuery, summarize};
use crate::ops::transfer;

use super::input;
use super::line_input::LineInput;
use super::render;
use super::theme::Theme;

/// How long a status message stays in the status row
pub const STATUS_TTL: Duration = Duration::from_secs(3);

/// Which tab is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// One date's tasks
    Day,
    /// Every task, filtered and paged
    All,
}

impl Tab {
    fn as_str(self) -> &'static str {
        match self {
            Tab::Day => "day",
            Tab::All => "all",
        }
    }
}

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing into the all-tasks search box
    Search,
    /// A form popup has the keyboard
    Form,
    /// Waiting for y/n
    Confirm,
}

/// What a form popup is collecting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    Add { date: String },
    Edit { date: String, id: TaskId },
    GoToDate,
    Import,
    Export,
}

impl FormKind {
    pub fn heading(&self) -> String {
        match self {
            FormKind::Add { date } => format!("New task for {}", date),
            FormKind::Edit { date, .. } => format!("Edit task on {}", date),
            FormKind::GoToDate => "Go to date".to_string(),
            FormKind::Import => "Import tasks from JSON".to_string(),
            FormKind::Export => "Export tasks to JSON".to_string(),
        }
    }

    /// Label of the first field
    pub fn first_label(&self) -> &'static str {
        match self {
            FormKind::Add { .. } | FormKind::Edit { .. } => "Title",
            FormKind::GoToDate => "Date (YYYY-MM-DD)",
            FormKind::Import | FormKind::Export => "Path",
        }
    }

    /// Whether the form has a description field
    pub fn has_body(&self) -> bool {
        matches!(self, FormKind::Add { .. } | FormKind::Edit { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Body,
}

/// State of the open form popup
#[derive(Debug, Clone)]
pub struct Form {
    pub kind: FormKind,
    pub title: LineInput,
    pub body: LineInput,
    pub field: FormField,
}

impl Form {
    pub fn new(kind: FormKind) -> Self {
        Form::with_values(kind, "", "")
    }

    pub fn with_values(kind: FormKind, title: &str, body: &str) -> Self {
        Form {
            kind,
            title: LineInput::new(title),
            body: LineInput::new(body),
            field: FormField::Title,
        }
    }

    pub fn focused_mut(&mut self) -> &mut LineInput {
        match self.field {
            FormField::Title => &mut self.title,
            FormField::Body => &mut self.body,
        }
    }

    /// Move focus to the other field, if there is one
    pub fn switch_field(&mut self) {
        if self.kind.has_body() {
            self.field = match self.field {
                FormField::Title => FormField::Body,
                FormField::Body => FormField::Title,
            };
        }
    }
}

/// A destructive action awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteTask {
        date: String,
        id: TaskId,
        title: String,
    },
    ClearAll,
}

/// Transient message in the status row
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub error: bool,
    shown_at: Instant,
}

impl StatusMessage {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= STATUS_TTL
    }
}

/// Main application state
pub struct App {
    pub store: Store,
    gateway: Gateway,
    pub data_dir: PathBuf,
    pub theme: Theme,
    pub tab: Tab,
    pub mode: Mode,
    pub should_quit: bool,
    /// Wall-clock date, refreshed every tick
    pub today: NaiveDate,
    /// Date shown on the day tab
    pub selected_date: NaiveDate,
    /// Cursor into the selected date's tasks
    pub day_cursor: usize,
    /// Cursor into the current page of the all-tasks tab
    pub all_cursor: usize,
    pub query: SummaryQuery,
    pub search_input: LineInput,
    /// Tasks whose description is unfolded
    pub expanded: HashSet<TaskId>,
    pub form: Option<Form>,
    pub confirm: Option<ConfirmAction>,
    pub status: Option<StatusMessage>,
    pub show_help: bool,
    /// Safety save interval; only set for the key-value store
    autosave_every: Option<Duration>,
    last_autosave: Instant,
}

impl App {
    pub fn new(store: Store, gateway: Gateway, config: &Config, data_dir: PathBuf) -> Self {
        let autosave_every = (gateway.kind() == BackendKind::KeyValue)
            .then(|| config.storage.autosave_interval());
        let today = Local::now().date_naive();
        App {
            store,
            gateway,
            data_dir,
            theme: Theme::from_config(&config.ui),
            tab: Tab::Day,
            mode: Mode::Navigate,
            should_quit: false,
            today,
            selected_date: today,
            day_cursor: 0,
            all_cursor: 0,
            query: SummaryQuery::new(config.ui.page_size),
            search_input: LineInput::default(),
            expanded: HashSet::new(),
            form: None,
            confirm: None,
            status: None,
            show_help: false,
            autosave_every,
            last_autosave: Instant::now(),
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.gateway.kind()
    }

    /// Date key of the day tab
    pub fn selected_key(&self) -> String {
        date_key(self.selected_date)
    }

    pub fn day_tasks(&self) -> &[Task] {
        self.store.tasks_on(&self.selected_key())
    }

    /// Rows matching the current filter and search, across all pages
    pub fn summary_total(&self) -> usize {
        summarize(&self.store, &self.query).rows.len()
    }

    /// Case-insensitive highlighter for the current search text
    pub fn active_search_re(&self) -> Option<Regex> {
        let needle = self.query.search();
        if needle.is_empty() {
            return None;
        }
        Regex::new(&format!("(?i){}", regex::escape(needle))).ok()
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Save the whole store and report the outcome in the status row
    pub fn persist(&mut self) -> bool {
        match self.gateway.save(&self.store) {
            Ok(()) => {
                let text = match self.backend_kind() {
                    BackendKind::File => "Data saved to file",
                    BackendKind::KeyValue => "Data saved locally",
                };
                self.notify(text, false);
                true
            }
            Err(_) => {
                self.notify("Error saving data", true);
                false
            }
        }
    }

    pub fn notify(&mut self, text: impl Into<String>, error: bool) {
        self.status = Some(StatusMessage {
            text: text.into(),
            error,
            shown_at: Instant::now(),
        });
    }

    /// React to a shell signal. Both kinds persist the store.
    pub fn handle_signal(&mut self, signal: ShellSignal) {
        tracing::debug!(?signal, "shell signal");
        match signal {
            ShellSignal::SaveRequested | ShellSignal::FinalSaveRequested => {
                self.persist();
            }
        }
    }

    /// Periodic housekeeping: clock, status expiry and the safety save
    pub fn tick(&mut self, now: Instant) {
        self.today = Local::now().date_naive();
        if self.status.as_ref().is_some_and(|s| s.is_expired(now)) {
            self.status = None;
        }
        if let Some(every) = self.autosave_every
            && now.duration_since(self.last_autosave) >= every
        {
            self.last_autosave = now;
            // Redundant save: failures are only logged
            match self.gateway.save(&self.store) {
                Ok(()) => tracing::debug!("safety save"),
                Err(e) => tracing::warn!(error = %e, "safety save failed"),
            }
        }
    }

    // -----------------------------------------------------------------------
    // Task operations
    // -----------------------------------------------------------------------

    /// Create a task and persist. Returns false when the store rejects it.
    pub fn add_task(&mut self, date: &str, title: &str, body: &str) -> bool {
        match self.store.create(date, title, body) {
            Ok(task) => {
                tracing::debug!(date, id = %task.id, "task added");
                if date == self.selected_key() {
                    self.day_cursor = self.day_tasks().len().saturating_sub(1);
                }
                self.persist();
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "task rejected");
                false
            }
        }
    }

    pub fn update_task(&mut self, date: &str, id: TaskId, title: &str, body: &str) -> bool {
        match self.store.update(date, id, title, body) {
            Ok(()) => {
                self.persist();
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "edit rejected");
                false
            }
        }
    }

    pub fn toggle_task(&mut self, date: &str, id: TaskId) {
        match self.store.toggle(date, id) {
            Ok(_) => {
                self.persist();
            }
            Err(e) => tracing::debug!(error = %e, "toggle ignored"),
        }
    }

    pub fn delete_task(&mut self, date: &str, id: TaskId) {
        match self.store.delete(date, id) {
            Ok(_) => {
                self.expanded.remove(&id);
                self.clamp_cursors();
                self.persist();
            }
            Err(e) => tracing::debug!(error = %e, "delete ignored"),
        }
    }

    pub fn clear_all(&mut self) {
        self.store.clear();
        self.expanded.clear();
        self.clamp_cursors();
        self.persist();
    }

    /// Merge a JSON export from `path`. Nothing changes if any of it is bad.
    pub fn import_from(&mut self, path: &str) {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                self.notify(format!("Could not read {}: {}", path, e), true);
                return;
            }
        };
        match transfer::import_json(&mut self.store, &text) {
            Ok(added) => {
                tracing::info!(path, added, "imported");
                self.clamp_cursors();
                if self.persist() {
                    self.notify(format!("Imported {} tasks", added), false);
                }
            }
            Err(e) => {
                tracing::warn!(path, error = %e, "import rejected");
                self.notify(e.to_string(), true);
            }
        }
    }

    pub fn export_to(&mut self, path: &str) {
        let result = transfer::export_json(&self.store)
            .map_err(io::Error::from)
            .and_then(|text| std::fs::write(path, text));
        match result {
            Ok(()) => self.notify(
                format!("Exported {} tasks to {}", self.store.len(), path),
                false,
            ),
            Err(e) => self.notify(format!("Could not write {}: {}", path, e), true),
        }
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Date and id of the task under the cursor on the current tab
    pub fn selected_task(&self) -> Option<(String, TaskId)> {
        match self.tab {
            Tab::Day => {
                let key = self.selected_key();
                let id = self.day_tasks().get(self.day_cursor)?.id;
                Some((key, id))
            }
            Tab::All => {
                let summary = summarize(&self.store, &self.query);
                let row = summary.page(&self.query).get(self.all_cursor)?;
                Some((row.date.to_string(), row.task.id))
            }
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let (cursor, len) = match self.tab {
            Tab::Day => (&mut self.day_cursor, self.store.tasks_on(&date_key(self.selected_date)).len()),
            Tab::All => {
                let summary = summarize(&self.store, &self.query);
                let len = summary.page(&self.query).len();
                (&mut self.all_cursor, len)
            }
        };
        if len == 0 {
            *cursor = 0;
            return;
        }
        *cursor = cursor.saturating_add_signed(delta).min(len - 1);
    }

    /// Keep cursors and the page inside their lists after a change
    pub fn clamp_cursors(&mut self) {
        let day_len = self.day_tasks().len();
        self.day_cursor = self.day_cursor.min(day_len.saturating_sub(1));

        let total = self.summary_total();
        self.query.pager_mut().clamp(total);
        let page_len = self.query.pager().bounds(total).len();
        self.all_cursor = self.all_cursor.min(page_len.saturating_sub(1));
    }

    pub fn toggle_expanded(&mut self) {
        if let Some((_, id)) = self.selected_task()
            && !self.expanded.remove(&id)
        {
            self.expanded.insert(id);
        }
    }

    // -----------------------------------------------------------------------
    // Day tab
    // -----------------------------------------------------------------------

    pub fn set_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
        self.day_cursor = 0;
    }

    pub fn shift_day(&mut self, forward: bool) {
        let next = if forward {
            self.selected_date.checked_add_days(Days::new(1))
        } else {
            self.selected_date.checked_sub_days(Days::new(1))
        };
        if let Some(date) = next {
            self.set_date(date);
        }
    }

    // -----------------------------------------------------------------------
    // All tab
    // -----------------------------------------------------------------------

    pub fn cycle_status(&mut self) {
        self.query.set_status(self.query.status().next());
        self.all_cursor = 0;
    }

    /// Apply the search box to the query
    pub fn apply_search(&mut self) {
        self.query.set_search(self.search_input.text());
        self.all_cursor = 0;
    }

    pub fn cycle_page_size(&mut self) {
        self.query.pager_mut().cycle_page_size();
        self.all_cursor = 0;
    }

    pub fn next_page(&mut self) {
        let total = self.summary_total();
        self.query.pager_mut().next(total);
        self.all_cursor = 0;
    }

    pub fn prev_page(&mut self) {
        let total = self.summary_total();
        self.query.pager_mut().prev(total);
        self.all_cursor = 0;
    }

    pub fn last_page(&mut self) {
        let total = self.summary_total();
        self.query.pager_mut().go_to(usize::MAX, total);
        self.all_cursor = 0;
    }

    pub fn first_page(&mut self) {
        self.query.pager_mut().reset();
        self.all_cursor = 0;
    }
}

/// Restore UI state from .state.json
pub fn restore_ui_state(app: &mut App) {
    let Some(ui_state) = read_ui_state(&app.data_dir) else {
        return;
    };

    if ui_state.tab == Tab::All.as_str() {
        app.tab = Tab::All;
    }
    if let Some(size) = ui_state.page_size {
        app.query.set_page_size(size);
    }
    if let Ok(status) = ui_state.status_filter.parse::<StatusFilter>() {
        app.query.set_status(status);
    }
    app.search_input = LineInput::new(ui_state.search);
    app.apply_search();
}

/// Save UI state to .state.json
pub fn save_ui_state(app: &App) {
    let ui_state = UiState {
        tab: app.tab.as_str().to_string(),
        status_filter: app.query.status().to_string(),
        search: app.query.search().to_string(),
        page_size: Some(app.query.pager().page_size()),
    };
    if let Err(e) = write_ui_state(&app.data_dir, &ui_state) {
        tracing::debug!(error = %e, "could not write ui state");
    }
}

/// Run the TUI application
pub fn run(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = config_io::load_config_or_default(data_dir);
    let medium = storage::detect_medium(&config.storage, data_dir);
    tracing::info!(?medium, "starting");

    // The file goes through the shell worker; the key-value store is local
    let (shell, gateway) = match &medium {
        Medium::File(path) => {
            let shell = HostShell::spawn(storage::file_backend_at(path, data_dir))?;
            let gateway = Gateway::new(Box::new(shell.client()));
            (Some(shell), gateway)
        }
        Medium::KeyValue(_) => (None, Gateway::new(storage::open_backend(&medium, data_dir))),
    };
    let store = Store::from_map(gateway.load());

    let mut app = App::new(store, gateway, &config, data_dir.to_path_buf());
    restore_ui_state(&mut app);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableFocusChange, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, shell.as_ref());

    final_save(&mut app, shell.as_ref(), config.storage.exit_grace());
    save_ui_state(&app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    shell: Option<&HostShell>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut save_counter = 0u32;
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key);
                    // Debounced state save: every ~5 key presses
                    save_counter += 1;
                    if save_counter >= 5 {
                        save_ui_state(app);
                        save_counter = 0;
                    }
                }
                Event::Paste(text) => input::handle_paste(app, &text),
                Event::FocusLost => match shell {
                    Some(shell) => shell.request_save(),
                    None => app.handle_signal(ShellSignal::SaveRequested),
                },
                _ => {}
            }
        }

        if let Some(shell) = shell {
            for signal in shell.poll_signals() {
                app.handle_signal(signal);
            }
        }
        app.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Exit hook: ask for one last save and wait at most `grace` for it
fn final_save(app: &mut App, shell: Option<&HostShell>, grace: Duration) {
    let Some(shell) = shell else {
        app.handle_signal(ShellSignal::FinalSaveRequested);
        return;
    };
    shell.request_exit();
    let deadline = Instant::now() + grace;
    while let Some(left) = deadline.checked_duration_since(Instant::now()) {
        let Some(signal) = shell.wait_signal(left) else {
            break;
        };
        app.handle_signal(signal);
        if signal == ShellSignal::FinalSaveRequested {
            return;
        }
    }
    tracing::warn!(grace_ms = grace.as_millis() as u64, "final save not confirmed in time");
}
