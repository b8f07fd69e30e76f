use crate::model::task::Task;

/// Header line of the task file
pub const HEADER: &str = "Date,Title,Description,Completed,CreatedAt";

/// Fields per record: date, title, body, completed, created-at
pub const FIELD_COUNT: usize = 5;

/// Error type for a single undecodable record
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected 5 fields, found {found}")]
    FieldCount { found: usize },
    #[error("record has no date")]
    MissingDate,
}

/// Encode one task as a record line.
///
/// The date key is written bare. Title, body and created-at are always
/// quoted with inner quotes doubled; newlines inside them are kept as-is.
pub fn encode_record(task: &Task, date: &str) -> String {
    format!(
        "{},{},{},{},{}",
        date,
        quote(&task.title),
        quote(&task.body),
        task.completed,
        quote(&task.created_at),
    )
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Decode one record into its date key and task.
///
/// The decoded task always gets a fresh identifier.
pub fn decode_record(record: &str) -> Result<(String, Task), DecodeError> {
    let fields = split_fields(record);
    if fields.len() != FIELD_COUNT {
        return Err(DecodeError::FieldCount {
            found: fields.len(),
        });
    }
    let mut fields = fields.into_iter();
    let mut next = || fields.next().unwrap_or_default();

    let date = next();
    if date.trim().is_empty() {
        return Err(DecodeError::MissingDate);
    }
    let title = next();
    let body = next();
    let completed = next() == "true";
    let created_at = next();

    Ok((date, Task::restore(title, body, completed, created_at)))
}

/// Split a record into fields.
///
/// A `"` toggles quoting, except that `""` inside a quoted span is one
/// literal quote. Commas separate fields only outside quotes.
pub fn split_fields(record: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = record.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
