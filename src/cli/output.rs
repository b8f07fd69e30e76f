use serde::Serialize;

use crate::model::store::Store;
use crate::model::task::Task;
use crate::ops::daily::{DailyView, DayCounts, count_text};
use crate::ops::summary::{Summary, SummaryCounts, SummaryQuery, SummaryRow};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    pub date: String,
    /// 1-based position within the date
    pub position: usize,
    pub title: String,
    pub body: String,
    pub completed: bool,
    pub created_at: String,
}

impl TaskJson {
    pub fn new(date: &str, position: usize, task: &Task) -> Self {
        TaskJson {
            date: date.to_string(),
            position,
            title: task.title.clone(),
            body: task.body.clone(),
            completed: task.completed,
            created_at: task.created_at.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct DayJson {
    pub date: String,
    pub label: String,
    pub counts: DayCounts,
    pub tasks: Vec<TaskJson>,
}

impl DayJson {
    pub fn new(view: &DailyView) -> Self {
        DayJson {
            date: view.key.clone(),
            label: view.label.clone(),
            counts: view.counts,
            tasks: view
                .tasks
                .iter()
                .enumerate()
                .map(|(i, task)| TaskJson::new(&view.key, i + 1, task))
                .collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllJson {
    pub counts: SummaryCounts,
    pub status: String,
    pub search: String,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    /// Rows matching filter and search, across all pages
    pub matching: usize,
    pub tasks: Vec<TaskJson>,
}

impl AllJson {
    pub fn new(store: &Store, summary: &Summary, query: &SummaryQuery) -> Self {
        let pager = query.pager();
        AllJson {
            counts: summary.counts,
            status: query.status().to_string(),
            search: query.search().to_string(),
            page: pager.current_page(),
            page_size: pager.page_size(),
            total_pages: pager.total_pages(summary.rows.len()),
            matching: summary.rows.len(),
            tasks: summary
                .page(query)
                .iter()
                .map(|row| TaskJson::new(row.date, position_of(store, row), row.task))
                .collect(),
        }
    }
}

/// 1-based position of a row's task within its date
pub fn position_of(store: &Store, row: &SummaryRow) -> usize {
    store
        .tasks_on(row.date)
        .iter()
        .position(|t| t.id == row.task.id)
        .map_or(0, |i| i + 1)
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

fn checkbox(task: &Task) -> &'static str {
    if task.completed { "[x]" } else { "[ ]" }
}

/// `  2. [x] Title`, followed by indented description lines
pub fn format_task_lines(position: usize, task: &Task) -> Vec<String> {
    let mut lines = vec![format!("{:>3}. {} {}", position, checkbox(task), task.title)];
    for body_line in task.body.lines() {
        lines.push(format!("         {}", body_line));
    }
    lines
}

/// One date's listing with its label and counts
pub fn format_day(view: &DailyView) -> Vec<String> {
    let mut lines = vec![
        format!("== {} ({}) ==", view.label, view.key),
        format!(
            "{}: {} completed, {} remaining",
            view.count_text(),
            view.counts.completed,
            view.counts.remaining
        ),
    ];
    if view.tasks.is_empty() {
        lines.push(String::new());
        lines.push("No tasks for this day.".to_string());
        return lines;
    }
    lines.push(String::new());
    for (i, task) in view.tasks.iter().enumerate() {
        lines.extend(format_task_lines(i + 1, task));
    }
    lines
}

/// Global counts line for the all-tasks listing
pub fn format_counts(counts: &SummaryCounts) -> String {
    format!(
        "{}: {} completed, {} pending, {} {}",
        count_text(counts.all),
        counts.completed,
        counts.pending,
        counts.active_dates,
        if counts.active_dates == 1 { "date" } else { "dates" },
    )
}

/// The all-tasks listing for the query's current page
pub fn format_summary(store: &Store, summary: &Summary, query: &SummaryQuery) -> Vec<String> {
    let mut lines = vec![format_counts(&summary.counts)];
    let page = summary.page(query);
    lines.push(String::new());
    if page.is_empty() {
        lines.push("No tasks match.".to_string());
    }
    for row in page {
        lines.push(format!(
            "{}  #{:<3} {} {}  ({})",
            row.date,
            position_of(store, row),
            checkbox(row.task),
            row.task.title,
            row.task.created_at,
        ));
    }
    let pager = query.pager();
    let total = summary.rows.len();
    lines.push(String::new());
    lines.push(format!(
        "{} (page {}/{})",
        pager.range_text(total),
        pager.current_page(),
        pager.total_pages(total).max(1)
    ));
    lines
}
