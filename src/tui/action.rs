use crate::model::{ExportFormat, Mode, TaskList, Theme, ViewFilter};
use uuid::Uuid;

/// A task (empty path) or a nested subtask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub task: Uuid,
    pub path: Vec<Uuid>,
}

impl ItemRef {
    pub fn task(task: Uuid) -> Self {
        Self { task, path: Vec::new() }
    }

    pub fn is_task(&self) -> bool {
        self.path.is_empty()
    }

    pub fn child(&self, id: Uuid) -> Self {
        let mut path = self.path.clone();
        path.push(id);
        Self { task: self.task, path }
    }
}

#[derive(Debug)]
pub enum Action {
    SelectList(Uuid),
    CreateList(String),
    RenameList(Uuid, String),
    DeleteList(Uuid),
    CreateTask(String),
    CreateSubtask(ItemRef, String),
    EditItem(ItemRef, String),
    ToggleItem(ItemRef),
    DeleteItem(ItemRef),
    ChangePriority(Uuid, i8),
    MoveItem(ItemRef, isize),
    ToggleMode,
    CycleTheme,
    CopyToClipboard(ViewFilter),
    ExportFile(ExportFormat, ViewFilter),
    Quit,
}

/// Everything the UI needs to redraw after a mutation.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub lists: Vec<TaskList>,
    pub active: Option<Uuid>,
    pub mode: Mode,
    pub theme: Theme,
}

#[derive(Debug)]
pub enum AppEvent {
    Snapshot(Snapshot),
    Error(String),
    Status(String),
}
