use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::model::store::Store;
use crate::model::task::Task;
use crate::ops::paginate::Pager;

/// Completion filter for the all-tasks view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => task.completed,
            StatusFilter::Pending => !task.completed,
        }
    }

    /// All -> Completed -> Pending -> All
    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::Pending,
            StatusFilter::Pending => StatusFilter::All,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Completed => write!(f, "completed"),
            StatusFilter::Pending => write!(f, "pending"),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "completed" | "done" => Ok(StatusFilter::Completed),
            "pending" | "todo" => Ok(StatusFilter::Pending),
            other => Err(format!(
                "unknown status '{}' (expected all, completed or pending)",
                other
            )),
        }
    }
}

/// Counts over the whole store, unaffected by filter and search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCounts {
    pub all: usize,
    pub completed: usize,
    pub pending: usize,
    /// Date keys holding at least one task
    pub active_dates: usize,
}

/// A task paired with its date key
#[derive(Debug, Clone, Copy)]
pub struct SummaryRow<'a> {
    pub date: &'a str,
    pub task: &'a Task,
}

/// Filter, search and paging parameters for the all-tasks view.
///
/// Every setter that changes what rows match sends the view back to page 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryQuery {
    status: StatusFilter,
    search: String,
    pager: Pager,
}

impl SummaryQuery {
    pub fn new(page_size: usize) -> Self {
        SummaryQuery {
            pager: Pager::new(page_size),
            ..Default::default()
        }
    }

    pub fn status(&self) -> StatusFilter {
        self.status
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut Pager {
        &mut self.pager
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        self.status = status;
        self.pager.reset();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.pager.reset();
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.pager.set_page_size(page_size);
    }

    /// Case-insensitive substring match on title or body. The search text is
    /// used as typed, surrounding spaces included.
    pub fn matches(&self, task: &Task) -> bool {
        if !self.status.matches(task) {
            return false;
        }
        let needle = self.search.to_lowercase();
        needle.is_empty()
            || task.title.to_lowercase().contains(&needle)
            || task.body.to_lowercase().contains(&needle)
    }
}

/// The all-tasks view: global counts plus matching rows sorted by date
#[derive(Debug, Clone)]
pub struct Summary<'a> {
    pub counts: SummaryCounts,
    pub rows: Vec<SummaryRow<'a>>,
}

impl<'a> Summary<'a> {
    /// Rows on the query's current page
    pub fn page(&self, query: &SummaryQuery) -> &[SummaryRow<'a>] {
        query.pager().slice(&self.rows)
    }
}

/// Count everything in the store
pub fn summary_counts(store: &Store) -> SummaryCounts {
    let all = store.len();
    let completed = store
        .tasks()
        .values()
        .flatten()
        .filter(|t| t.completed)
        .count();
    SummaryCounts {
        all,
        completed,
        pending: all - completed,
        active_dates: store.date_count(),
    }
}

/// Build the all-tasks view. Rows are sorted by date key ascending and keep
/// their list order within a date.
pub fn summarize<'a>(store: &'a Store, query: &SummaryQuery) -> Summary<'a> {
    let mut rows: Vec<SummaryRow<'a>> = store
        .tasks()
        .iter()
        .flat_map(|(date, tasks)| {
            tasks.iter().map(move |task| SummaryRow {
                date: date.as_str(),
                task,
            })
        })
        .filter(|row| query.matches(row.task))
        .collect();
    rows.sort_by(|a, b| a.date.cmp(b.date));

    Summary {
        counts: summary_counts(store),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Store {
        let mut store = Store::new();
        store.create("2024-01-03", "Pay rent", "").unwrap();
        let milk = store.create("2024-01-01", "Buy milk", "").unwrap();
        store.create("2024-01-01", "Call plumber", "about the MILK leak").unwrap();
        store.create("2024-01-02", "Gym", "").unwrap();
        store.toggle("2024-01-01", milk.id).unwrap();
        store
    }

    fn titles(summary: &Summary) -> Vec<String> {
        summary.rows.iter().map(|r| r.task.title.clone()).collect()
    }

    #[test]
    fn rows_sorted_by_date_then_list_order() {
        let store = sample();
        let summary = summarize(&store, &SummaryQuery::default());
        assert_eq!(
            titles(&summary),
            vec!["Buy milk", "Call plumber", "Gym", "Pay rent"]
        );
    }

    #[test]
    fn status_filters() {
        let store = sample();
        let mut query = SummaryQuery::default();
        query.set_status(StatusFilter::Completed);
        assert_eq!(titles(&summarize(&store, &query)), vec!["Buy milk"]);
        query.set_status(StatusFilter::Pending);
        assert_eq!(
            titles(&summarize(&store, &query)),
            vec!["Call plumber", "Gym", "Pay rent"]
        );
    }

    #[test]
    fn search_matches_title_or_body_case_insensitively() {
        let store = sample();
        let mut query = SummaryQuery::default();
        query.set_search("Milk");
        assert_eq!(
            titles(&summarize(&store, &query)),
            vec!["Buy milk", "Call plumber"]
        );
        query.set_status(StatusFilter::Pending);
        assert_eq!(titles(&summarize(&store, &query)), vec!["Call plumber"]);
    }

    #[test]
    fn search_keeps_surrounding_spaces() {
        let store = sample();
        let mut query = SummaryQuery::default();
        query.set_search("milk ");
        assert_eq!(titles(&summarize(&store, &query)), vec!["Call plumber"]);
        query.set_search(" milk");
        assert_eq!(
            titles(&summarize(&store, &query)),
            vec!["Buy milk", "Call plumber"]
        );
    }

    #[test]
    fn counts_ignore_filters() {
        let store = sample();
        let unfiltered = summarize(&store, &SummaryQuery::default()).counts;
        let mut query = SummaryQuery::default();
        query.set_status(StatusFilter::Completed);
        query.set_search("zzz");
        let filtered = summarize(&store, &query);
        assert!(filtered.rows.is_empty());
        assert_eq!(filtered.counts, unfiltered);
        assert_eq!(
            unfiltered,
            SummaryCounts {
                all: 4,
                completed: 1,
                pending: 3,
                active_dates: 3
            }
        );
    }

    #[test]
    fn parameter_changes_reset_page() {
        let mut query = SummaryQuery::new(10);
        query.pager_mut().go_to(3, 100);
        query.set_status(StatusFilter::Pending);
        assert_eq!(query.pager().current_page(), 1);

        query.pager_mut().go_to(3, 100);
        query.set_search("x");
        assert_eq!(query.pager().current_page(), 1);

        query.pager_mut().go_to(3, 100);
        query.set_page_size(50);
        assert_eq!(query.pager().current_page(), 1);
    }

    #[test]
    fn page_slices_rows() {
        let mut store = Store::new();
        for i in 0..30 {
            store.create("2024-01-01", &format!("task {}", i), "").unwrap();
        }
        let mut query = SummaryQuery::new(25);
        let summary = summarize(&store, &query);
        assert_eq!(summary.page(&query).len(), 25);
        query.pager_mut().next(summary.rows.len());
        let summary = summarize(&store, &query);
        let page = summary.page(&query);
        assert_eq!(page.len(), 5);
        assert_eq!(page[0].task.title, "task 25");
    }

    #[test]
    fn status_filter_parse_and_cycle() {
        assert_eq!("Completed".parse::<StatusFilter>(), Ok(StatusFilter::Completed));
        assert_eq!("pending".parse::<StatusFilter>(), Ok(StatusFilter::Pending));
        assert!("bogus".parse::<StatusFilter>().is_err());
        assert_eq!(StatusFilter::Pending.next(), StatusFilter::All);
    }
}
