use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dp", about = concat!("dayplan v", env!("CARGO_PKG_VERSION"), " - tasks by the day"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task to a date (default: today)
    Add(AddArgs),
    /// Show one date's tasks (default: today)
    Day(DayArgs),
    /// List tasks across all dates with filtering and paging
    All(AllArgs),
    /// Change a task's title or description
    Edit(EditArgs),
    /// Flip a task between pending and completed
    Toggle(TaskRef),
    /// Delete a task
    Rm(TaskRef),
    /// Delete every task
    Clear(ClearArgs),
    /// Write all tasks to a JSON file
    Export(ExportArgs),
    /// Merge tasks from a JSON export
    Import(ImportArgs),
    /// Read or change a config value
    Config(ConfigArgs),
    /// View or clear the recovery log
    Recovery(RecoveryArgs),
}

/// A task addressed by date and 1-based position
#[derive(Args)]
pub struct TaskRef {
    /// Date key (YYYY-MM-DD)
    pub date: String,
    /// Position within the date, starting at 1
    pub position: usize,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Date key (YYYY-MM-DD, default: today)
    #[arg(long, short)]
    pub date: Option<String>,
    /// Description text
    #[arg(long, short)]
    pub body: Option<String>,
}

#[derive(Args)]
pub struct DayArgs {
    /// Date key (YYYY-MM-DD, default: today)
    pub date: Option<String>,
}

#[derive(Args)]
pub struct AllArgs {
    /// Filter by status (all, completed, pending)
    #[arg(long, default_value = "all")]
    pub status: String,
    /// Only tasks whose title or description contains this text
    #[arg(long)]
    pub search: Option<String>,
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Rows per page (default: from config)
    #[arg(long)]
    pub page_size: Option<usize>,
}

#[derive(Args)]
pub struct EditArgs {
    #[command(flatten)]
    pub task: TaskRef,
    /// New title
    #[arg(long, short)]
    pub title: Option<String>,
    /// New description
    #[arg(long, short)]
    pub body: Option<String>,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Confirm deleting every task
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file (default: dayplan-tasks-<today>.json)
    #[arg(long, short)]
    pub output: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file produced by `dp export`
    pub file: String,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Dotted key, e.g. ui.page_size
    pub key: Option<String>,
    /// New value
    pub value: Option<String>,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Maximum number of entries to show
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
    /// Remove all entries
    #[arg(long)]
    pub clear: bool,
}
