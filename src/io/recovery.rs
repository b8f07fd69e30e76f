use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

/// Past this size the oldest entries are trimmed before the next append (1 MB).
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Written at the top of a new recovery log.
const FILE_HEADER: &str = "\
<!-- dayplan recovery log: append-only
     Records that could not be read and data that could not be written
     end up here. View with: dp recovery
     Safe to delete once reviewed. -->

---
";

/// Separator between timestamp and category in an entry header.
const HEADER_SEP: &str = " | ";

/// Category of a recovery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    /// A task file record that failed to decode
    Parser,
    /// Content of a save that failed to reach disk
    Write,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Parser => write!(f, "parser"),
            RecoveryCategory::Write => write!(f, "write"),
        }
    }
}

impl RecoveryCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "parser" => Some(RecoveryCategory::Parser),
            "write" => Some(RecoveryCategory::Write),
            _ => None,
        }
    }
}

/// A single entry in the recovery log.
#[derive(Debug, Clone)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub body: String,
}

impl RecoveryEntry {
    pub fn new(category: RecoveryCategory, description: impl Into<String>, body: impl Into<String>) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            body: body.into(),
        }
    }

    /// Format as a markdown block for the log.
    pub fn to_markdown(&self) -> String {
        let mut out = format!(
            "## {}{}{}: {}\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            HEADER_SEP,
            self.category,
            self.description,
        );
        if !self.body.is_empty() {
            out.push_str("\n```text\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }
        out.push('\n');
        out.push_str("---\n");
        out
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "category": self.category.to_string(),
            "description": self.description,
            "body": self.body,
        })
    }
}

pub fn recovery_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".recovery.log")
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Append an entry to the recovery log. Failures are logged and swallowed.
pub fn log_recovery(data_dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = log_recovery_inner(data_dir, &entry) {
        tracing::warn!(error = %e, category = %entry.category, "could not write to recovery log");
    }
}

/// Like [`log_recovery`], but skip the entry when the log already holds one
/// with the same category and body.
pub fn log_recovery_once(data_dir: &Path, entry: RecoveryEntry) {
    let already_logged = std::fs::read_to_string(recovery_log_path(data_dir))
        .map(|content| {
            parse_entries(&content)
                .iter()
                .any(|e| e.category == entry.category && e.body == entry.body)
        })
        .unwrap_or(false);
    if already_logged {
        tracing::debug!(category = %entry.category, "already in recovery log");
        return;
    }
    log_recovery(data_dir, entry);
}

fn log_recovery_inner(data_dir: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    let path = recovery_log_path(data_dir);

    if let Ok(meta) = std::fs::metadata(&path)
        && meta.len() > MAX_LOG_SIZE
    {
        try_inline_trim(&path);
    }

    let needs_header = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())?;
    Ok(())
}

/// Drop the oldest entries until the log is at most half of `MAX_LOG_SIZE`.
/// Skipped when another process holds the file lock.
fn try_inline_trim(path: &Path) {
    let Ok(mut file) = OpenOptions::new().read(true).write(true).open(path) else {
        return;
    };
    if crate::io::lock::try_lock(&file).is_err() {
        return;
    }

    let mut content = String::new();
    if file.read_to_string(&mut content).is_err() {
        return;
    }
    let trimmed = trim_oldest(&content, (MAX_LOG_SIZE / 2) as usize);
    if trimmed.len() < content.len()
        && let Err(e) = rewrite_in_place(&mut file, &trimmed)
    {
        tracing::warn!(error = %e, "could not trim recovery log");
    }
}

fn rewrite_in_place(file: &mut File, content: &str) -> io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(content.as_bytes())
}

/// Keep the file header and the newest entries that fit in `limit` bytes.
fn trim_oldest(content: &str, limit: usize) -> String {
    let mut header = String::new();
    let mut entries: Vec<String> = Vec::new();
    let mut in_header = true;

    for line in content.lines() {
        if in_header {
            header.push_str(line);
            header.push('\n');
            if line == "---" {
                in_header = false;
            }
            continue;
        }
        if line.starts_with("## ") || entries.is_empty() {
            entries.push(String::new());
        }
        if let Some(current) = entries.last_mut() {
            current.push_str(line);
            current.push('\n');
        }
    }

    let mut size = header.len() + entries.iter().map(String::len).sum::<usize>();
    let mut keep_from = 0;
    while size > limit && keep_from < entries.len() {
        size -= entries[keep_from].len();
        keep_from += 1;
    }

    let mut out = header;
    for entry in &entries[keep_from..] {
        out.push_str(entry);
    }
    out
}

/// Read entries, most recent first, keeping at most `limit`.
pub fn read_recovery_entries(data_dir: &Path, limit: Option<usize>) -> Vec<RecoveryEntry> {
    let content = match std::fs::read_to_string(recovery_log_path(data_dir)) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut entries = parse_entries(&content);
    if let Some(n) = limit {
        let skip = entries.len().saturating_sub(n);
        entries.drain(..skip);
    }
    entries.reverse();
    entries
}

/// Drop every entry, leaving only the file header. Returns the count removed.
pub fn clear_recovery(data_dir: &Path) -> io::Result<usize> {
    let path = recovery_log_path(data_dir);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    let count = parse_entries(&content).len();
    atomic_write(&path, FILE_HEADER.as_bytes())?;
    Ok(count)
}

fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some(header) = line.strip_prefix("## ") else {
            continue;
        };
        let Some((timestamp, category, description)) = parse_entry_header(header) else {
            continue;
        };

        let mut body_lines: Vec<&str> = Vec::new();
        let mut in_code_block = false;
        for line in lines.by_ref() {
            if in_code_block {
                if line == "```" {
                    in_code_block = false;
                } else {
                    body_lines.push(line);
                }
                continue;
            }
            if line == "---" {
                break;
            }
            if line.starts_with("```") {
                in_code_block = true;
            }
        }

        entries.push(RecoveryEntry {
            timestamp,
            category,
            description,
            body: body_lines.join("\n"),
        });
    }

    entries
}

/// Parse `<timestamp> | <category>: <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, RecoveryCategory, String)> {
    let (timestamp_str, rest) = header.split_once(HEADER_SEP)?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .ok()?
        .with_timezone(&Utc);
    let (category_str, description) = rest.split_once(": ")?;
    let category = RecoveryCategory::parse_category(category_str)?;
    Some((timestamp, category, description.to_string()))
}
