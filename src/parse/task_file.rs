use crate::model::store::TaskMap;
use crate::parse::record_codec::{DecodeError, HEADER, decode_record, encode_record};

/// A record that could not be decoded while reading a task file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRecord {
    /// 1-based line where the record starts
    pub line: usize,
    pub text: String,
    pub error: DecodeError,
}

/// Serialize every task to the task file format.
///
/// Header first, then one record per task in date-key insertion order and
/// list order, joined by `\n` with no trailing newline.
pub fn serialize_task_file(tasks: &TaskMap) -> String {
    let mut lines = Vec::with_capacity(1 + tasks.values().map(Vec::len).sum::<usize>());
    lines.push(HEADER.to_string());
    for (date, list) in tasks {
        for task in list {
            lines.push(encode_record(task, date));
        }
    }
    lines.join("\n")
}

/// Parse a task file.
///
/// The first line is the header and is always discarded. Blank records
/// are skipped. Records that fail to decode are returned alongside the
/// tasks that did decode; one bad record never aborts the rest.
///
/// A failed record that spans several lines is taken apart: its first line
/// is decoded alone and splitting starts over on the line after it. A stray
/// quote therefore costs one line, not the rest of the file.
pub fn parse_task_file(source: &str) -> (TaskMap, Vec<DroppedRecord>) {
    let mut tasks = TaskMap::new();
    let mut dropped = Vec::new();

    let mut rest = source.split_once('\n').map_or("", |(_, after_header)| after_header);
    let mut line = 2;

    while !rest.is_empty() {
        let end = record_end(rest);
        let raw = &rest[..end];
        let record = raw.strip_suffix('\r').unwrap_or(raw).trim();

        let consumed = if record.is_empty() {
            end
        } else {
            match decode_record(record) {
                Ok((date, task)) => {
                    tasks.entry(date).or_default().push(task);
                    end
                }
                Err(error) => match raw.find('\n') {
                    Some(first_end) => {
                        let first = raw[..first_end].trim();
                        match decode_record(first) {
                            Ok((date, task)) => tasks.entry(date).or_default().push(task),
                            Err(error) if !first.is_empty() => dropped.push(DroppedRecord {
                                line,
                                text: first.to_string(),
                                error,
                            }),
                            Err(_) => {}
                        }
                        first_end
                    }
                    None => {
                        dropped.push(DroppedRecord {
                            line,
                            text: record.to_string(),
                            error,
                        });
                        end
                    }
                },
            }
        };

        // Step past the line break that ended what was consumed
        let next = (consumed + 1).min(rest.len());
        line += rest[..next].matches('\n').count();
        rest = &rest[next..];
    }

    (tasks, dropped)
}

/// Byte offset of the newline that ends the first record of `source`, or
/// its length when the record runs to the end.
///
/// A newline ends a record only outside a quoted span, so quoted text may
/// carry its own newlines.
fn record_end(source: &str) -> usize {
    let mut in_quotes = false;
    for (i, c) in source.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\n' if !in_quotes => return i,
            _ => {}
        }
    }
    source.len()
}
