// File: ./src/model/filter.rs
// Filtered views and list statistics
use crate::model::item::{ParseError, Priority, Subtask, Task, TaskList};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn cycle(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Active,
            StatusFilter::Active => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        })
    }
}

impl FromStr for StatusFilter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" | "open" => Ok(StatusFilter::Active),
            "completed" | "done" => Ok(StatusFilter::Completed),
            other => Err(ParseError::StatusFilter(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub status: StatusFilter,
    pub tag: Option<String>,
    pub priority: Option<Priority>,
    pub query: Option<String>,
}

impl ViewFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if !self.status.matches(task) {
            return false;
        }
        if let Some(tag) = &self.tag
            && task.tag.as_deref() != Some(tag.as_str())
        {
            return false;
        }
        if let Some(p) = self.priority
            && task.priority != p
        {
            return false;
        }
        match self.query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => task_contains(task, &q.to_lowercase()),
            _ => true,
        }
    }

    /// Matching tasks of `list`, in list order.
    pub fn apply<'a>(&self, list: &'a TaskList) -> Vec<&'a Task> {
        list.tasks.iter().filter(|t| self.matches(t)).collect()
    }
}

fn task_contains(task: &Task, needle: &str) -> bool {
    task.text.to_lowercase().contains(needle) || task.subtasks.iter().any(|s| subtask_contains(s, needle))
}

fn subtask_contains(sub: &Subtask, needle: &str) -> bool {
    sub.text.to_lowercase().contains(needle) || sub.subtasks.iter().any(|s| subtask_contains(s, needle))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub overdue: usize,
    /// Rounded percentage, 0 for an empty list.
    pub completion: u8,
}

impl Stats {
    pub fn of(tasks: &[Task], today: NaiveDate) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let overdue = tasks.iter().filter(|t| t.is_overdue(today)).count();
        let completion = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u8
        };
        Self {
            total,
            active: total - completed,
            completed,
            overdue,
            completion,
        }
    }
}
