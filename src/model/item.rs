// File: ./src/model/item.rs
// Core task/list types and the completion cascade
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown priority `{0}` (expected low, medium or high)")]
    Priority(String),
    #[error("unknown mode `{0}` (expected basic or advanced)")]
    Mode(String),
    #[error("unknown theme `{0}`")]
    Theme(String),
    #[error("unknown export format `{0}` (expected json, markdown, text or clipboard)")]
    ExportFormat(String),
    #[error("unknown status filter `{0}` (expected all, active or completed)")]
    StatusFilter(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// One step towards `High` (positive delta) or `Low` (negative), clamped.
    pub fn shifted(self, delta: i8) -> Self {
        match (self, delta.signum()) {
            (Priority::Low, 1) => Priority::Medium,
            (Priority::Medium, 1) => Priority::High,
            (Priority::High, -1) => Priority::Medium,
            (Priority::Medium, -1) => Priority::Low,
            (p, _) => p,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" => Ok(Priority::Low),
            "medium" | "m" => Ok(Priority::Medium),
            "high" | "h" => Ok(Priority::High),
            other => Err(ParseError::Priority(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Subtask {
    pub fn new(text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.trim().to_string(),
            completed: false,
            subtasks: Vec::new(),
        }
    }

    /// Sets this node and every descendant.
    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
        for child in &mut self.subtasks {
            child.set_completed(completed);
        }
    }

    fn recompute(&mut self) {
        if !self.subtasks.is_empty() {
            self.completed = self.subtasks.iter().all(|s| s.completed);
        }
    }

    fn normalize(&mut self) {
        for child in &mut self.subtasks {
            child.normalize();
        }
        self.recompute();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.trim().to_string(),
            completed: false,
            priority: Priority::default(),
            due_date: None,
            tag: None,
            subtasks: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
        for child in &mut self.subtasks {
            child.set_completed(completed);
        }
    }

    pub fn toggle(&mut self) {
        self.set_completed(!self.completed);
    }

    fn recompute(&mut self) {
        if !self.subtasks.is_empty() {
            self.completed = self.subtasks.iter().all(|s| s.completed);
        }
    }

    /// Recomputes every parent flag from the leaves up. Returns whether
    /// anything changed.
    pub fn normalize(&mut self) -> bool {
        let before = self.clone();
        for child in &mut self.subtasks {
            child.normalize();
        }
        self.recompute();
        *self != before
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|d| d < today)
    }

    pub fn subtask(&self, path: &[Uuid]) -> Option<&Subtask> {
        let (first, rest) = path.split_first()?;
        let mut node = self.subtasks.iter().find(|s| s.id == *first)?;
        for id in rest {
            node = node.subtasks.iter().find(|s| s.id == *id)?;
        }
        Some(node)
    }

    /// Appends a child under `parent_path` (empty path: directly under the task).
    pub fn add_subtask(&mut self, parent_path: &[Uuid], text: &str) -> Option<Uuid> {
        if text.trim().is_empty() {
            return None;
        }
        let sub = Subtask::new(text);
        let id = sub.id;
        with_children(&mut self.subtasks, parent_path, move |children| {
            children.push(sub)
        })?;
        self.recompute();
        Some(id)
    }

    pub fn toggle_subtask(&mut self, path: &[Uuid]) -> bool {
        let changed = with_siblings(&mut self.subtasks, path, |siblings, idx| {
            let target = &mut siblings[idx];
            let value = !target.completed;
            target.set_completed(value);
            Some(())
        })
        .is_some();
        if changed {
            self.recompute();
        }
        changed
    }

    pub fn edit_subtask(&mut self, path: &[Uuid], text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        with_siblings(&mut self.subtasks, path, |siblings, idx| {
            siblings[idx].text = text.to_string();
            Some(())
        })
        .is_some()
    }

    pub fn delete_subtask(&mut self, path: &[Uuid]) -> bool {
        let changed = with_siblings(&mut self.subtasks, path, |siblings, idx| {
            siblings.remove(idx);
            Some(())
        })
        .is_some();
        if changed {
            self.recompute();
        }
        changed
    }

    /// Moves a subtask among its siblings by `delta` positions, clamped.
    pub fn move_subtask(&mut self, path: &[Uuid], delta: isize) -> bool {
        with_siblings(&mut self.subtasks, path, |siblings, idx| {
            let to = offset_index(idx, delta, siblings.len());
            if to == idx {
                return None;
            }
            array_move(siblings, idx, to);
            Some(())
        })
        .is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl TaskList {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            tasks: Vec::new(),
        }
    }

    pub fn position(&self, task_id: Uuid) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    pub fn task(&self, task_id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    /// Distinct tags in first-seen order.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for tag in self.tasks.iter().filter_map(|t| t.tag.as_ref()) {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        tags
    }
}

/// Removes the item at `from` and re-inserts it at `to`.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() || to >= items.len() || from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

pub(crate) fn offset_index(idx: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    idx.saturating_add_signed(delta).min(len - 1)
}

// Runs `f` on the child vector of the node at `path`, recomputing each
// ancestor on the way back up.
fn with_children<R, F>(children: &mut Vec<Subtask>, path: &[Uuid], f: F) -> Option<R>
where
    F: FnOnce(&mut Vec<Subtask>) -> R,
{
    match path.split_first() {
        None => Some(f(children)),
        Some((first, rest)) => {
            let child = children.iter_mut().find(|s| s.id == *first)?;
            let out = with_children(&mut child.subtasks, rest, f)?;
            child.recompute();
            Some(out)
        }
    }
}

// Runs `f` on the sibling vector holding the node at `path` plus its index.
// Ancestors are recomputed only when `f` returns `Some`.
fn with_siblings<R, F>(children: &mut Vec<Subtask>, path: &[Uuid], f: F) -> Option<R>
where
    F: FnOnce(&mut Vec<Subtask>, usize) -> Option<R>,
{
    let (first, rest) = path.split_first()?;
    let idx = children.iter().position(|s| s.id == *first)?;
    if rest.is_empty() {
        return f(children, idx);
    }
    let child = &mut children[idx];
    let out = with_siblings(&mut child.subtasks, rest, f)?;
    child.recompute();
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_with_tree() -> (Task, Uuid, Uuid, Uuid) {
        let mut task = Task::new("Plan trip");
        let a = task.add_subtask(&[], "Book flights").unwrap();
        let b = task.add_subtask(&[], "Book hotel").unwrap();
        let a1 = task.add_subtask(&[a], "Compare prices").unwrap();
        (task, a, b, a1)
    }

    #[test]
    fn toggling_task_cascades_to_all_descendants() {
        let (mut task, a, b, a1) = task_with_tree();
        task.toggle();
        assert!(task.completed);
        assert!(task.subtask(&[a]).unwrap().completed);
        assert!(task.subtask(&[b]).unwrap().completed);
        assert!(task.subtask(&[a, a1]).unwrap().completed);

        task.toggle();
        assert!(!task.subtask(&[a, a1]).unwrap().completed);
    }

    #[test]
    fn completing_every_leaf_completes_ancestors() {
        let (mut task, a, b, a1) = task_with_tree();
        assert!(task.toggle_subtask(&[a, a1]));
        assert!(task.subtask(&[a]).unwrap().completed);
        assert!(!task.completed);

        assert!(task.toggle_subtask(&[b]));
        assert!(task.completed);

        // Uncompleting one leaf reopens the whole chain.
        assert!(task.toggle_subtask(&[a, a1]));
        assert!(!task.subtask(&[a]).unwrap().completed);
        assert!(!task.completed);
    }

    #[test]
    fn adding_open_child_reopens_completed_parent() {
        let (mut task, a, _, _) = task_with_tree();
        task.set_completed(true);
        task.add_subtask(&[a], "Check baggage rules").unwrap();
        assert!(!task.subtask(&[a]).unwrap().completed);
        assert!(!task.completed);
    }

    #[test]
    fn deleting_last_open_child_completes_parent() {
        let (mut task, a, b, a1) = task_with_tree();
        task.toggle_subtask(&[a, a1]);
        assert!(!task.completed);
        assert!(task.delete_subtask(&[b]));
        assert!(task.completed);
        assert!(task.subtask(&[b]).is_none());
    }

    #[test]
    fn unknown_paths_are_noops() {
        let (mut task, a, _, _) = task_with_tree();
        let before = task.clone();
        let ghost = Uuid::new_v4();
        assert!(!task.toggle_subtask(&[ghost]));
        assert!(!task.toggle_subtask(&[a, ghost]));
        assert!(!task.edit_subtask(&[ghost], "x"));
        assert!(!task.delete_subtask(&[]));
        assert!(task.add_subtask(&[ghost], "x").is_none());
        assert_eq!(task, before);
    }

    #[test]
    fn empty_text_is_rejected() {
        let (mut task, a, _, _) = task_with_tree();
        assert!(task.add_subtask(&[], "   ").is_none());
        assert!(!task.edit_subtask(&[a], ""));
        assert_eq!(task.subtask(&[a]).unwrap().text, "Book flights");
    }

    #[test]
    fn move_subtask_clamps_to_siblings() {
        let (mut task, a, b, _) = task_with_tree();
        assert!(task.move_subtask(&[a], 5));
        let order: Vec<Uuid> = task.subtasks.iter().map(|s| s.id).collect();
        assert_eq!(order, vec![b, a]);
        assert!(!task.move_subtask(&[a], 1));
    }

    #[test]
    fn array_move_matches_drag_semantics() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        array_move(&mut items, 0, 2);
        assert_eq!(items, vec!['b', 'c', 'a', 'd']);
        array_move(&mut items, 3, 0);
        assert_eq!(items, vec!['d', 'b', 'c', 'a']);
        array_move(&mut items, 1, 9);
        assert_eq!(items, vec!['d', 'b', 'c', 'a']);
    }

    #[test]
    fn priority_parses_and_shifts() {
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert_eq!("l".parse::<Priority>(), Ok(Priority::Low));
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::Medium.shifted(1), Priority::High);
        assert_eq!(Priority::High.shifted(1), Priority::High);
        assert_eq!(Priority::Low.shifted(-1), Priority::Low);
    }

    #[test]
    fn overdue_requires_past_due_and_open() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let mut task = Task::new("File taxes");
        assert!(!task.is_overdue(today));
        task.due_date = NaiveDate::from_ymd_opt(2026, 10, 18);
        assert!(task.is_overdue(today));
        task.due_date = Some(today);
        assert!(!task.is_overdue(today));
        task.due_date = NaiveDate::from_ymd_opt(2026, 10, 1);
        task.toggle();
        assert!(!task.is_overdue(today));
    }

    #[test]
    fn normalize_repairs_inconsistent_parents() {
        let mut task = Task::new("Plan trip");
        let a = task.add_subtask(&[], "Book flights").unwrap();
        let a1 = task.add_subtask(&[a], "Compare prices").unwrap();
        task.subtasks[0].subtasks[0].completed = true;
        assert!(!task.completed);

        assert!(task.normalize());
        assert!(task.subtask(&[a]).unwrap().completed);
        assert!(task.subtask(&[a, a1]).unwrap().completed);
        assert!(task.completed);
        assert!(!task.normalize());
    }

    #[test]
    fn deserializes_sparse_json_with_defaults() {
        let raw = r#"{"id":"6f1c1d8e-5b7a-4d6b-9a0e-2f0b5d6c7a11","text":"Water plants"}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.subtasks.is_empty());
        assert!(task.tag.is_none());
    }
}
