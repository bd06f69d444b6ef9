// File: ./src/store.rs
// In-memory list store; every successful mutation is written through to storage
use crate::model::{
    ExportFormat, Mode, NewTask, Priority, Stats, Task, TaskList, Theme, ViewFilter, array_move,
    render,
};
use crate::model::item::offset_index;
use crate::storage::LocalStorage;
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use uuid::Uuid;

pub mod keys {
    pub const LISTS: &str = "lists";
    pub const ACTIVE_LIST: &str = "active_list";
    pub const MODE: &str = "mode";
    pub const THEME: &str = "theme";
}

pub struct Store {
    lists: Vec<TaskList>,
    active: Option<Uuid>,
    mode: Mode,
    theme: Theme,
    storage: Option<LocalStorage>,
}

impl Store {
    /// A store that never touches disk.
    pub fn in_memory(default_list: &str) -> Self {
        let mut store = Self {
            lists: Vec::new(),
            active: None,
            mode: Mode::default(),
            theme: Theme::default(),
            storage: None,
        };
        store.ensure_list(default_list);
        store
    }

    /// Loads every key from `storage`, falling back to defaults for anything
    /// missing or unreadable.
    pub fn open(storage: LocalStorage, default_list: &str) -> Self {
        let mut lists: Vec<TaskList> = storage.load(keys::LISTS).unwrap_or_default();
        let mut repaired = 0;
        for task in lists.iter_mut().flat_map(|l| l.tasks.iter_mut()) {
            if task.normalize() {
                repaired += 1;
            }
        }
        let active = storage.load::<Option<Uuid>>(keys::ACTIVE_LIST).flatten();
        let mode: Mode = storage.load(keys::MODE).unwrap_or_default();
        let theme: Theme = storage.load(keys::THEME).unwrap_or_default();
        info!(
            "event=store_open dir={} lists={}",
            storage.dir().display(),
            lists.len()
        );

        let mut store = Self {
            lists,
            active,
            mode,
            theme,
            storage: Some(storage),
        };
        if repaired > 0 {
            warn!("event=store_repaired tasks={}", repaired);
        }
        if store.ensure_list(default_list) || repaired > 0 {
            store.persist_lists();
        }
        store
    }

    // Guarantees at least one list and a valid active id.
    fn ensure_list(&mut self, default_list: &str) -> bool {
        let mut created = false;
        if self.lists.is_empty() {
            self.lists.push(TaskList::new(default_list));
            created = true;
        }
        if !self.active.is_some_and(|id| self.list(id).is_some()) {
            self.active = self.lists.first().map(|l| l.id);
        }
        created
    }

    fn persist_lists(&self) {
        if let Some(storage) = &self.storage
            && let Err(e) = storage
                .save(keys::LISTS, &self.lists)
                .and_then(|_| storage.save(keys::ACTIVE_LIST, &self.active))
        {
            error!("event=persist_failed key={} error={:#}", keys::LISTS, e);
        }
    }

    fn persist_pref<T: serde::Serialize>(&self, key: &str, value: &T) {
        if let Some(storage) = &self.storage
            && let Err(e) = storage.save(key, value)
        {
            error!("event=persist_failed key={} error={:#}", key, e);
        }
    }

    fn commit(&self, changed: bool) -> bool {
        if changed {
            self.persist_lists();
        }
        changed
    }

    // --- Preferences ---

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.persist_pref(keys::MODE, &mode);
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.persist_pref(keys::THEME, &theme);
    }

    // --- Lists ---

    pub fn lists(&self) -> &[TaskList] {
        &self.lists
    }

    pub fn list(&self, id: Uuid) -> Option<&TaskList> {
        self.lists.iter().find(|l| l.id == id)
    }

    fn list_mut(&mut self, id: Uuid) -> Option<&mut TaskList> {
        self.lists.iter_mut().find(|l| l.id == id)
    }

    /// Case-insensitive lookup by display name.
    pub fn list_by_name(&self, name: &str) -> Option<&TaskList> {
        let name = name.trim().to_lowercase();
        self.lists.iter().find(|l| l.name.to_lowercase() == name)
    }

    pub fn active_list_id(&self) -> Option<Uuid> {
        self.active
    }

    pub fn active_list(&self) -> Option<&TaskList> {
        self.active.and_then(|id| self.list(id))
    }

    pub fn add_list(&mut self, name: &str) -> Option<Uuid> {
        if name.trim().is_empty() {
            return None;
        }
        let list = TaskList::new(name);
        let id = list.id;
        info!("event=list_added id={} name={:?}", id, list.name);
        self.lists.push(list);
        self.persist_lists();
        Some(id)
    }

    pub fn rename_list(&mut self, id: Uuid, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let changed = match self.list_mut(id) {
            Some(list) => {
                list.name = name.to_string();
                true
            }
            None => false,
        };
        self.commit(changed)
    }

    /// The last remaining list cannot be deleted.
    pub fn delete_list(&mut self, id: Uuid) -> bool {
        if self.lists.len() <= 1 {
            return false;
        }
        let Some(idx) = self.lists.iter().position(|l| l.id == id) else {
            return false;
        };
        self.lists.remove(idx);
        if self.active == Some(id) {
            self.active = self.lists.first().map(|l| l.id);
        }
        info!("event=list_deleted id={}", id);
        self.commit(true)
    }

    pub fn select_list(&mut self, id: Uuid) -> bool {
        if self.list(id).is_none() {
            return false;
        }
        self.active = Some(id);
        self.commit(true)
    }

    // --- Tasks ---

    pub fn find_task(&self, task_id: Uuid) -> Option<&Task> {
        self.lists.iter().find_map(|l| l.task(task_id))
    }

    fn task_mut(&mut self, task_id: Uuid) -> Option<&mut Task> {
        self.lists.iter_mut().find_map(|l| l.task_mut(task_id))
    }

    // Applies `f` to the task and persists when it reports a change.
    fn update_task<F>(&mut self, task_id: Uuid, f: F) -> bool
    where
        F: FnOnce(&mut Task) -> bool,
    {
        let changed = self.task_mut(task_id).is_some_and(f);
        self.commit(changed)
    }

    /// In basic mode priority, due date and tag are dropped.
    pub fn add_task(&mut self, list_id: Uuid, new: NewTask) -> Option<Uuid> {
        if new.text.trim().is_empty() {
            return None;
        }
        let mode = self.mode;
        let list = self.list_mut(list_id)?;
        let mut task = Task::new(&new.text);
        if mode == Mode::Advanced {
            task.priority = new.priority.unwrap_or_default();
            task.due_date = new.due_date;
            task.tag = new.tag.filter(|t| !t.trim().is_empty());
        }
        let id = task.id;
        list.tasks.push(task);
        info!("event=task_added list={} id={}", list_id, id);
        self.persist_lists();
        Some(id)
    }

    /// Basic mode keeps the whole input as text.
    pub fn add_task_smart(&mut self, list_id: Uuid, input: &str, today: NaiveDate) -> Option<Uuid> {
        let new = match self.mode {
            Mode::Basic => NewTask::plain(input),
            Mode::Advanced => NewTask::parse(input, today),
        };
        self.add_task(list_id, new)
    }

    pub fn toggle_task(&mut self, task_id: Uuid) -> bool {
        debug!("event=task_toggled id={}", task_id);
        self.update_task(task_id, |t| {
            t.toggle();
            true
        })
    }

    pub fn edit_task(&mut self, task_id: Uuid, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.update_task(task_id, |t| {
            t.text = text.to_string();
            true
        })
    }

    /// Replaces text and metadata from smart input (advanced mode only).
    pub fn edit_task_smart(&mut self, task_id: Uuid, input: &str, today: NaiveDate) -> bool {
        if self.mode == Mode::Basic {
            return self.edit_task(task_id, input);
        }
        let parsed = NewTask::parse(input, today);
        if parsed.text.is_empty() {
            return false;
        }
        self.update_task(task_id, |t| {
            t.text = parsed.text;
            t.priority = parsed.priority.unwrap_or_default();
            t.due_date = parsed.due_date;
            t.tag = parsed.tag;
            true
        })
    }

    pub fn set_priority(&mut self, task_id: Uuid, priority: Priority) -> bool {
        self.update_task(task_id, |t| {
            t.priority = priority;
            true
        })
    }

    pub fn shift_priority(&mut self, task_id: Uuid, delta: i8) -> bool {
        self.update_task(task_id, |t| {
            let next = t.priority.shifted(delta);
            let changed = next != t.priority;
            t.priority = next;
            changed
        })
    }

    pub fn set_due_date(&mut self, task_id: Uuid, due: Option<NaiveDate>) -> bool {
        self.update_task(task_id, |t| {
            t.due_date = due;
            true
        })
    }

    /// An empty tag clears it.
    pub fn set_tag(&mut self, task_id: Uuid, tag: Option<&str>) -> bool {
        let tag = tag
            .map(|t| t.trim().trim_start_matches('#').to_string())
            .filter(|t| !t.is_empty());
        self.update_task(task_id, |t| {
            t.tag = tag;
            true
        })
    }

    pub fn delete_task(&mut self, task_id: Uuid) -> bool {
        let mut changed = false;
        for list in &mut self.lists {
            if let Some(idx) = list.position(task_id) {
                list.tasks.remove(idx);
                changed = true;
                break;
            }
        }
        if changed {
            info!("event=task_deleted id={}", task_id);
        }
        self.commit(changed)
    }

    /// Drag-and-drop reorder: `from` takes the slot `to` occupied.
    pub fn move_task(&mut self, list_id: Uuid, from_id: Uuid, to_id: Uuid) -> bool {
        if from_id == to_id {
            return false;
        }
        let changed = match self.list_mut(list_id) {
            Some(list) => match (list.position(from_id), list.position(to_id)) {
                (Some(from), Some(to)) => {
                    array_move(&mut list.tasks, from, to);
                    true
                }
                _ => false,
            },
            None => false,
        };
        self.commit(changed)
    }

    /// Keyboard reorder by a relative offset, clamped to the list.
    pub fn move_task_by(&mut self, task_id: Uuid, delta: isize) -> bool {
        let mut changed = false;
        for list in &mut self.lists {
            if let Some(from) = list.position(task_id) {
                let to = offset_index(from, delta, list.tasks.len());
                if to != from {
                    array_move(&mut list.tasks, from, to);
                    changed = true;
                }
                break;
            }
        }
        self.commit(changed)
    }

    // --- Subtasks ---

    pub fn add_subtask(&mut self, task_id: Uuid, parent_path: &[Uuid], text: &str) -> Option<Uuid> {
        let id = self.task_mut(task_id)?.add_subtask(parent_path, text)?;
        debug!("event=subtask_added task={} id={}", task_id, id);
        self.persist_lists();
        Some(id)
    }

    pub fn toggle_subtask(&mut self, task_id: Uuid, path: &[Uuid]) -> bool {
        self.update_task(task_id, |t| t.toggle_subtask(path))
    }

    pub fn edit_subtask(&mut self, task_id: Uuid, path: &[Uuid], text: &str) -> bool {
        self.update_task(task_id, |t| t.edit_subtask(path, text))
    }

    pub fn delete_subtask(&mut self, task_id: Uuid, path: &[Uuid]) -> bool {
        self.update_task(task_id, |t| t.delete_subtask(path))
    }

    pub fn move_subtask(&mut self, task_id: Uuid, path: &[Uuid], delta: isize) -> bool {
        self.update_task(task_id, |t| t.move_subtask(path, delta))
    }

    // --- Views ---

    pub fn view(&self, list_id: Uuid, filter: &ViewFilter) -> Vec<&Task> {
        self.list(list_id)
            .map(|l| filter.apply(l))
            .unwrap_or_default()
    }

    pub fn stats(&self, list_id: Uuid, today: NaiveDate) -> Option<Stats> {
        self.list(list_id).map(|l| Stats::of(&l.tasks, today))
    }

    pub fn export(&self, list_id: Uuid, filter: &ViewFilter, format: ExportFormat) -> Result<String> {
        let list = self
            .list(list_id)
            .ok_or_else(|| anyhow!("no list with id {}", list_id))?;
        render(&list.name, &filter.apply(list), format)
    }
}
