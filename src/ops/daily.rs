use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::model::store::Store;
use crate::model::task::{Task, date_key};

/// Completion counts for a list of tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayCounts {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

impl DayCounts {
    pub fn of(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();
        DayCounts {
            total: tasks.len(),
            completed,
            remaining: tasks.len() - completed,
        }
    }
}

/// One date's tasks, ready to display
#[derive(Debug, Clone)]
pub struct DailyView<'a> {
    pub date: NaiveDate,
    pub key: String,
    pub label: String,
    pub tasks: &'a [Task],
    pub counts: DayCounts,
}

impl DailyView<'_> {
    pub fn count_text(&self) -> String {
        count_text(self.counts.total)
    }
}

/// Project the store onto one date, labelled relative to `today`
pub fn daily_view(store: &Store, date: NaiveDate, today: NaiveDate) -> DailyView<'_> {
    let key = date_key(date);
    let tasks = store.tasks_on(&key);
    DailyView {
        date,
        label: day_label(date, today),
        counts: DayCounts::of(tasks),
        tasks,
        key,
    }
}

/// "Today's Tasks", "Tomorrow's Tasks", or the long date
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today's Tasks".to_string()
    } else if today.checked_add_days(Days::new(1)) == Some(date) {
        "Tomorrow's Tasks".to_string()
    } else {
        long_date(date)
    }
}

/// `Monday, January 1, 2024`
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// `Jan 1, 2024`
pub fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// `1 task`, `3 tasks`
pub fn count_text(count: usize) -> String {
    if count == 1 {
        "1 task".to_string()
    } else {
        format!("{} tasks", count)
    }
}
