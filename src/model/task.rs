use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// Format of a date key (`2024-01-31`)
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Session-local task identifier.
///
/// Identifiers are handed out from a process-wide counter and are never
/// read back from disk: every decoded or imported task gets a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// Allocate the next unused identifier
    pub fn fresh() -> Self {
        TaskId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single task filed under a date key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Assigned fresh on every construction and deserialization
    #[serde(skip_deserializing, default = "TaskId::fresh")]
    pub id: TaskId,
    pub title: String,
    /// Free-form description, may be empty or span several lines
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub completed: bool,
    /// Wall-clock time of creation as display text (`3:04:05 PM`)
    #[serde(default)]
    pub created_at: String,
}

impl Task {
    /// Create a pending task stamped with the current local time
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Task {
            id: TaskId::fresh(),
            title: title.into(),
            body: body.into(),
            completed: false,
            created_at: created_stamp(&Local::now()),
        }
    }

    /// Rebuild a task from persisted fields, with a fresh identifier
    pub fn restore(title: String, body: String, completed: bool, created_at: String) -> Self {
        Task {
            id: TaskId::fresh(),
            title,
            body,
            completed,
            created_at,
        }
    }
}

/// Content equality. Identifiers are session-local and not compared.
impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
            && self.body == other.body
            && self.completed == other.completed
            && self.created_at == other.created_at
    }
}

impl Eq for Task {}

/// Render a creation timestamp the way it is stored (`3:04:05 PM`)
pub fn created_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    at.format("%-I:%M:%S %p").to_string()
}

/// Parse a `YYYY-MM-DD` date key
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT).ok()
}

/// Format a date as a date key
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Today's date key in local time
pub fn today_key() -> String {
    date_key(Local::now().date_naive())
}
