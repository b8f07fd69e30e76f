use indexmap::IndexMap;

use super::task::{Task, TaskId};

/// Date key to ordered task list, in key insertion order
pub type TaskMap = IndexMap<String, Vec<Task>>;

/// Error type for store mutations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("a date is required")]
    MissingDate,
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("task not found: {date} #{id}")]
    NotFound { date: String, id: TaskId },
}

/// In-memory task store.
///
/// A date key present in the map always has at least one task.
#[derive(Debug, Clone, Default)]
pub struct Store {
    tasks: TaskMap,
}

impl Store {
    pub fn new() -> Self {
        Store::default()
    }

    /// Build a store from a loaded mapping, dropping empty lists
    pub fn from_map(map: TaskMap) -> Self {
        let mut store = Store::new();
        store.hydrate(map);
        store
    }

    /// Replace the contents with a loaded mapping
    pub fn hydrate(&mut self, map: TaskMap) {
        self.tasks = map
            .into_iter()
            .filter(|(date, tasks)| !date.trim().is_empty() && !tasks.is_empty())
            .collect();
    }

    pub fn tasks(&self) -> &TaskMap {
        &self.tasks
    }

    /// Tasks filed under a date, in insertion order
    pub fn tasks_on(&self, date: &str) -> &[Task] {
        self.tasks.get(date).map_or(&[], |tasks| tasks.as_slice())
    }

    pub fn find(&self, date: &str, id: TaskId) -> Option<&Task> {
        self.tasks_on(date).iter().find(|t| t.id == id)
    }

    /// Task at a 1-based position within a date
    pub fn task_at(&self, date: &str, position: usize) -> Option<&Task> {
        position
            .checked_sub(1)
            .and_then(|idx| self.tasks_on(date).get(idx))
    }

    /// Total number of tasks across all dates
    pub fn len(&self) -> usize {
        self.tasks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of date keys holding tasks
    pub fn date_count(&self) -> usize {
        self.tasks.len()
    }

    /// Append a new pending task to a date.
    ///
    /// Title and body are stored trimmed.
    pub fn create(&mut self, date: &str, title: &str, body: &str) -> Result<Task, TaskError> {
        let date = date.trim();
        if date.is_empty() {
            return Err(TaskError::MissingDate);
        }
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        let task = Task::new(title, body.trim());
        self.tasks
            .entry(date.to_string())
            .or_default()
            .push(task.clone());
        Ok(task)
    }

    /// Replace a task's title and body. Completion and creation time are kept.
    pub fn update(
        &mut self,
        date: &str,
        id: TaskId,
        title: &str,
        body: &str,
    ) -> Result<(), TaskError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        let task = self.find_mut(date, id)?;
        task.title = title.to_string();
        task.body = body.trim().to_string();
        Ok(())
    }

    /// Flip completion and return the new state
    pub fn toggle(&mut self, date: &str, id: TaskId) -> Result<bool, TaskError> {
        let task = self.find_mut(date, id)?;
        task.completed = !task.completed;
        Ok(task.completed)
    }

    /// Remove a task, dropping its date key when the list empties
    pub fn delete(&mut self, date: &str, id: TaskId) -> Result<Task, TaskError> {
        let not_found = || TaskError::NotFound {
            date: date.to_string(),
            id,
        };
        let tasks = self.tasks.get_mut(date).ok_or_else(not_found)?;
        let idx = tasks.iter().position(|t| t.id == id).ok_or_else(not_found)?;
        let removed = tasks.remove(idx);
        if tasks.is_empty() {
            self.tasks.shift_remove(date);
        }
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Append every imported task to its date, each with a fresh id.
    ///
    /// Existing tasks are never replaced or deduplicated. Returns the number
    /// of tasks added.
    pub fn merge(&mut self, imported: TaskMap) -> usize {
        let mut added = 0;
        for (date, tasks) in imported {
            if tasks.is_empty() || date.trim().is_empty() {
                continue;
            }
            let list = self.tasks.entry(date).or_default();
            for mut task in tasks {
                task.id = TaskId::fresh();
                list.push(task);
                added += 1;
            }
        }
        added
    }

    fn find_mut(&mut self, date: &str, id: TaskId) -> Result<&mut Task, TaskError> {
        self.tasks
            .get_mut(date)
            .and_then(|tasks| tasks.iter_mut().find(|t| t.id == id))
            .ok_or_else(|| TaskError::NotFound {
                date: date.to_string(),
                id,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: &str = "2024-01-01";

    #[test]
    fn create_appends_in_order() {
        let mut store = Store::new();
        store.create(DAY, "first", "").unwrap();
        store.create(DAY, "second", "details").unwrap();
        let titles: Vec<&str> = store.tasks_on(DAY).iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second"]);
        assert_eq!(store.tasks_on(DAY)[1].body, "details");
        assert!(!store.tasks_on(DAY)[0].completed);
    }

    #[test]
    fn create_trims_fields() {
        let mut store = Store::new();
        let task = store.create(DAY, "  padded  ", "  body \n").unwrap();
        assert_eq!(task.title, "padded");
        assert_eq!(task.body, "body");
    }

    #[test]
    fn create_rejects_missing_date() {
        let mut store = Store::new();
        assert_eq!(store.create("", "title", ""), Err(TaskError::MissingDate));
        assert!(store.is_empty());
    }

    #[test]
    fn create_rejects_blank_title() {
        let mut store = Store::new();
        assert_eq!(store.create(DAY, "   ", ""), Err(TaskError::EmptyTitle));
        assert!(store.is_empty());
        assert!(store.tasks().get(DAY).is_none());
    }

    #[test]
    fn update_keeps_state_and_timestamp() {
        let mut store = Store::new();
        let task = store.create(DAY, "old", "").unwrap();
        store.toggle(DAY, task.id).unwrap();
        store.update(DAY, task.id, "new", "more").unwrap();

        let updated = store.find(DAY, task.id).unwrap();
        assert_eq!(updated.title, "new");
        assert_eq!(updated.body, "more");
        assert!(updated.completed);
        assert_eq!(updated.created_at, task.created_at);
    }

    #[test]
    fn update_rejects_blank_title() {
        let mut store = Store::new();
        let task = store.create(DAY, "keep", "").unwrap();
        assert_eq!(
            store.update(DAY, task.id, " ", "x"),
            Err(TaskError::EmptyTitle)
        );
        assert_eq!(store.find(DAY, task.id).unwrap().title, "keep");
    }

    #[test]
    fn update_unknown_task() {
        let mut store = Store::new();
        let task = store.create(DAY, "a", "").unwrap();
        let err = store.update("2024-01-02", task.id, "b", "").unwrap_err();
        assert!(matches!(err, TaskError::NotFound { .. }));
    }

    #[test]
    fn toggle_flips_completion() {
        let mut store = Store::new();
        let task = store.create(DAY, "a", "").unwrap();
        assert_eq!(store.toggle(DAY, task.id), Ok(true));
        assert_eq!(store.toggle(DAY, task.id), Ok(false));
    }

    #[test]
    fn toggle_missing_is_reported() {
        let mut store = Store::new();
        assert!(store.toggle(DAY, TaskId::fresh()).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn delete_last_task_removes_date() {
        let mut store = Store::new();
        let task = store.create(DAY, "only", "").unwrap();
        store.delete(DAY, task.id).unwrap();
        assert!(!store.tasks().contains_key(DAY));
        assert!(store.is_empty());
    }

    #[test]
    fn delete_keeps_other_tasks_and_key_order() {
        let mut store = Store::new();
        store.create("2024-01-03", "c", "").unwrap();
        let a = store.create(DAY, "a", "").unwrap();
        store.create(DAY, "b", "").unwrap();
        store.create("2024-01-02", "d", "").unwrap();

        store.delete(DAY, a.id).unwrap();
        let keys: Vec<&String> = store.tasks().keys().collect();
        assert_eq!(keys, vec!["2024-01-03", DAY, "2024-01-02"]);
        assert_eq!(store.tasks_on(DAY).len(), 1);
    }

    #[test]
    fn clear_empties_everything() {
        let mut store = Store::new();
        store.create(DAY, "a", "").unwrap();
        store.create("2024-01-02", "b", "").unwrap();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn merge_appends_with_fresh_ids() {
        let mut store = Store::new();
        let existing = store.create(DAY, "existing", "").unwrap();

        let mut imported = TaskMap::new();
        let one = Task::restore("one".into(), String::new(), false, String::new());
        let two = Task::restore("two".into(), String::new(), true, String::new());
        let original_ids = [one.id, two.id];
        imported.insert(DAY.to_string(), vec![one, two]);

        assert_eq!(store.merge(imported), 2);
        let tasks = store.tasks_on(DAY);
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].id, existing.id);
        let mut ids: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
        assert!(!original_ids.contains(&tasks[1].id));
        assert!(!original_ids.contains(&tasks[2].id));
    }

    #[test]
    fn merge_skips_empty_lists() {
        let mut store = Store::new();
        let mut imported = TaskMap::new();
        imported.insert("2024-05-05".to_string(), Vec::new());
        assert_eq!(store.merge(imported), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn merge_does_not_deduplicate() {
        let mut store = Store::new();
        store.create(DAY, "same", "").unwrap();
        let mut imported = TaskMap::new();
        imported.insert(DAY.to_string(), store.tasks_on(DAY).to_vec());
        store.merge(imported);
        assert_eq!(store.tasks_on(DAY).len(), 2);
    }

    #[test]
    fn hydrate_drops_empty_lists() {
        let mut map = TaskMap::new();
        map.insert(DAY.to_string(), Vec::new());
        map.insert(
            "2024-01-02".to_string(),
            vec![Task::restore("x".into(), String::new(), false, String::new())],
        );
        let store = Store::from_map(map);
        assert_eq!(store.date_count(), 1);
        assert!(!store.tasks().contains_key(DAY));
    }

    #[test]
    fn task_at_is_one_based() {
        let mut store = Store::new();
        store.create(DAY, "a", "").unwrap();
        store.create(DAY, "b", "").unwrap();
        assert_eq!(store.task_at(DAY, 1).unwrap().title, "a");
        assert_eq!(store.task_at(DAY, 2).unwrap().title, "b");
        assert!(store.task_at(DAY, 0).is_none());
        assert!(store.task_at(DAY, 3).is_none());
    }
}
