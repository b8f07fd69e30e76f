use chrono::NaiveDate;

use crate::model::store::{Store, TaskMap};
use crate::model::task::date_key;

/// Error type for import payloads
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("invalid import file: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid import file: empty date key")]
    EmptyDate,
    #[error("invalid import file: task with empty title on {date}")]
    EmptyTitle { date: String },
}

/// Pretty-printed JSON of the whole store
pub fn export_json(store: &Store) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(store.tasks())
}

/// `dayplan-tasks-2024-01-31.json`
pub fn default_export_name(today: NaiveDate) -> String {
    format!("dayplan-tasks-{}.json", date_key(today))
}

/// Parse and validate a whole import payload.
///
/// Either every task is acceptable or nothing is returned.
pub fn parse_import(text: &str) -> Result<TaskMap, ImportError> {
    let tasks: TaskMap = serde_json::from_str(text)?;
    for (date, list) in &tasks {
        if date.trim().is_empty() {
            return Err(ImportError::EmptyDate);
        }
        if list.iter().any(|t| t.title.trim().is_empty()) {
            return Err(ImportError::EmptyTitle { date: date.clone() });
        }
    }
    Ok(tasks)
}

/// Validate `text` and merge it into the store. Returns the number of
/// tasks added; on error the store is untouched.
pub fn import_json(store: &mut Store, text: &str) -> Result<usize, ImportError> {
    let tasks = parse_import(text)?;
    Ok(store.merge(tasks))
}
