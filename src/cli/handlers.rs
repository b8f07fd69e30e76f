use std::path::{Path, PathBuf};

use chrono::Local;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::backend::Gateway;
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::recovery;
use crate::io::storage::{self, Medium};
use crate::model::config::Config;
use crate::model::store::Store;
use crate::model::task::{Task, date_key, parse_date_key, today_key};
use crate::ops::daily::daily_view;
use crate::ops::summary::{StatusFilter, SummaryQuery, summarize};
use crate::ops::transfer;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let data_dir = resolve_data_dir(cli.data_dir.as_deref());

    match cli.command {
        None => Err("no command given (run `dp` without arguments for the TUI)".into()),
        Some(cmd) => match cmd {
            // Read commands
            Commands::Day(args) => cmd_day(&data_dir, args, json),
            Commands::All(args) => cmd_all(&data_dir, args, json),
            Commands::Export(args) => cmd_export(&data_dir, args),

            // Write commands
            Commands::Add(args) => cmd_add(&data_dir, args, json),
            Commands::Edit(args) => cmd_edit(&data_dir, args),
            Commands::Toggle(args) => cmd_toggle(&data_dir, args),
            Commands::Rm(args) => cmd_rm(&data_dir, args),
            Commands::Clear(args) => cmd_clear(&data_dir, args),
            Commands::Import(args) => cmd_import(&data_dir, args),

            // Maintenance
            Commands::Config(args) => cmd_config(&data_dir, args),
            Commands::Recovery(args) => cmd_recovery(&data_dir, args, json),
        },
    }
}

/// `-C` when given, otherwise the default data directory
pub fn resolve_data_dir(flag: Option<&str>) -> PathBuf {
    match flag {
        Some(dir) => PathBuf::from(dir),
        None => storage::default_data_dir(),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// What a command works against: the config, the chosen medium and the
/// tasks loaded from it.
struct Session {
    config: Config,
    medium: Medium,
    gateway: Gateway,
    store: Store,
}

impl Session {
    fn open(data_dir: &Path) -> Self {
        let config = config_io::load_config_or_default(data_dir);
        let medium = storage::detect_medium(&config.storage, data_dir);
        let gateway = Gateway::new(storage::open_backend(&medium, data_dir));
        Session {
            config,
            medium,
            gateway,
            store: Store::new(),
        }
    }

    fn load(mut self) -> Self {
        self.store = Store::from_map(self.gateway.load());
        self
    }

    /// Directory the medium lives in, which is where writers lock
    fn lock_dir<'a>(&'a self, data_dir: &'a Path) -> &'a Path {
        match &self.medium {
            Medium::File(path) | Medium::KeyValue(path) => path.parent().unwrap_or(data_dir),
        }
    }

    fn save(&self) -> CmdResult {
        self.gateway.save(&self.store)?;
        Ok(())
    }
}

/// Validate a date key, defaulting to today. Returns the canonical key.
fn resolve_date(raw: Option<&str>) -> Result<String, String> {
    match raw {
        None => Ok(today_key()),
        Some(raw) => parse_date_key(raw)
            .map(date_key)
            .ok_or_else(|| format!("invalid date '{}' (expected YYYY-MM-DD)", raw)),
    }
}

/// The task a `DATE POSITION` pair points at
fn resolve_task(store: &Store, task: &TaskRef) -> Result<(String, Task), String> {
    let date = resolve_date(Some(&task.date))?;
    let found = store
        .task_at(&date, task.position)
        .cloned()
        .ok_or_else(|| format!("no task #{} on {}", task.position, date))?;
    Ok((date, found))
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_day(data_dir: &Path, args: DayArgs, json: bool) -> CmdResult {
    let key = resolve_date(args.date.as_deref())?;
    let session = Session::open(data_dir).load();
    let today = Local::now().date_naive();
    let date = parse_date_key(&key).unwrap_or(today);
    let view = daily_view(&session.store, date, today);

    if json {
        println!("{}", serde_json::to_string_pretty(&DayJson::new(&view))?);
    } else {
        for line in format_day(&view) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_all(data_dir: &Path, args: AllArgs, json: bool) -> CmdResult {
    let status: StatusFilter = args.status.parse()?;
    let session = Session::open(data_dir).load();

    let page_size = args.page_size.unwrap_or(session.config.ui.page_size);
    let mut query = SummaryQuery::new(page_size);
    query.set_status(status);
    if let Some(search) = args.search {
        query.set_search(search);
    }
    let total = summarize(&session.store, &query).rows.len();
    query.pager_mut().go_to(args.page, total);

    let summary = summarize(&session.store, &query);
    if json {
        let out = AllJson::new(&session.store, &summary, &query);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_summary(&session.store, &summary, &query) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_export(data_dir: &Path, args: ExportArgs) -> CmdResult {
    let session = Session::open(data_dir).load();
    let output = args
        .output
        .unwrap_or_else(|| transfer::default_export_name(Local::now().date_naive()));
    let text = transfer::export_json(&session.store)?;
    std::fs::write(&output, text).map_err(|e| format!("could not write {}: {}", output, e))?;
    println!("exported {} tasks to {}", session.store.len(), output);
    Ok(())
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_add(data_dir: &Path, args: AddArgs, json: bool) -> CmdResult {
    let date = resolve_date(args.date.as_deref())?;
    let session = Session::open(data_dir);
    let _lock = FileLock::acquire_default(session.lock_dir(data_dir))?;
    let mut session = session.load();

    let task = session
        .store
        .create(&date, &args.title, args.body.as_deref().unwrap_or(""))?;
    session.save()?;

    let position = session.store.tasks_on(&date).len();
    if json {
        let out = TaskJson::new(&date, position, &task);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("added {} #{}", date, position);
    }
    Ok(())
}

fn cmd_edit(data_dir: &Path, args: EditArgs) -> CmdResult {
    if args.title.is_none() && args.body.is_none() {
        return Err("nothing to change (pass --title and/or --body)".into());
    }
    let session = Session::open(data_dir);
    let _lock = FileLock::acquire_default(session.lock_dir(data_dir))?;
    let mut session = session.load();

    let (date, task) = resolve_task(&session.store, &args.task)?;
    let title = args.title.as_deref().unwrap_or(&task.title);
    let body = args.body.as_deref().unwrap_or(&task.body);
    session.store.update(&date, task.id, title, body)?;
    session.save()?;

    println!("updated {} #{}", date, args.task.position);
    Ok(())
}

fn cmd_toggle(data_dir: &Path, args: TaskRef) -> CmdResult {
    let session = Session::open(data_dir);
    let _lock = FileLock::acquire_default(session.lock_dir(data_dir))?;
    let mut session = session.load();

    let (date, task) = resolve_task(&session.store, &args)?;
    let completed = session.store.toggle(&date, task.id)?;
    session.save()?;

    let state = if completed { "completed" } else { "pending" };
    println!("{} #{} is now {}", date, args.position, state);
    Ok(())
}

fn cmd_rm(data_dir: &Path, args: TaskRef) -> CmdResult {
    let session = Session::open(data_dir);
    let _lock = FileLock::acquire_default(session.lock_dir(data_dir))?;
    let mut session = session.load();

    let (date, task) = resolve_task(&session.store, &args)?;
    let removed = session.store.delete(&date, task.id)?;
    session.save()?;

    println!("deleted {} #{}: {}", date, args.position, removed.title);
    Ok(())
}

fn cmd_clear(data_dir: &Path, args: ClearArgs) -> CmdResult {
    if !args.yes {
        return Err("refusing to delete every task without --yes".into());
    }
    let session = Session::open(data_dir);
    let _lock = FileLock::acquire_default(session.lock_dir(data_dir))?;
    let mut session = session.load();

    let count = session.store.len();
    session.store.clear();
    session.save()?;

    println!("deleted {} tasks", count);
    Ok(())
}

fn cmd_import(data_dir: &Path, args: ImportArgs) -> CmdResult {
    let text = std::fs::read_to_string(&args.file)
        .map_err(|e| format!("could not read {}: {}", args.file, e))?;
    let session = Session::open(data_dir);
    let _lock = FileLock::acquire_default(session.lock_dir(data_dir))?;
    let mut session = session.load();

    let added = transfer::import_json(&mut session.store, &text)?;
    session.save()?;

    println!("imported {} tasks", added);
    Ok(())
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

fn cmd_config(data_dir: &Path, args: ConfigArgs) -> CmdResult {
    let (config, mut doc) = config_io::read_config(data_dir)?;
    match (args.key, args.value) {
        (None, _) => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
        (Some(key), None) => match config_io::get_config_value(&doc, &key)? {
            Some(value) => println!("{}", value),
            None => return Err(format!("{} is not set", key).into()),
        },
        (Some(key), Some(value)) => {
            config_io::set_config_value(&mut doc, &key, &value)?;
            config_io::write_config(data_dir, &doc)?;
            println!("{} = {}", key, value);
        }
    }
    Ok(())
}

fn cmd_recovery(data_dir: &Path, args: RecoveryArgs, json: bool) -> CmdResult {
    if args.clear {
        let removed = recovery::clear_recovery(data_dir)?;
        println!("cleared {} recovery entries", removed);
        return Ok(());
    }

    let entries = recovery::read_recovery_entries(data_dir, Some(args.limit));
    if json {
        let out: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("recovery log is empty");
        return Ok(());
    }
    for entry in &entries {
        print!("{}", entry.to_markdown());
    }
    Ok(())
}
