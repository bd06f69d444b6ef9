use crate::model::{Mode, Priority, Subtask, TaskList, Theme, ViewFilter};
use crate::tui::action::{ItemRef, Snapshot};
use chrono::{Local, NaiveDate};
use ratatui::widgets::ListState;
use uuid::Uuid;

#[derive(PartialEq, Clone, Copy)]
pub enum Focus {
    Sidebar,
    Main,
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum InputMode {
    Normal,
    Creating,
    CreatingSubtask,
    Editing,
    Searching,
    TagFilter,
    CreatingList,
    RenamingList,
}

/// One visible line of the flattened task tree.
#[derive(Debug, Clone)]
pub struct Row {
    pub item: ItemRef,
    pub depth: usize,
    pub text: String,
    pub completed: bool,
    pub child_count: usize,
    /// Task-only metadata; `None` for subtasks.
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub overdue: bool,
    pub tag: Option<String>,
}

pub struct AppState {
    pub lists: Vec<TaskList>,
    pub active_list: Option<Uuid>,
    pub mode: Mode,
    pub theme: Theme,
    pub filter: ViewFilter,
    pub rows: Vec<Row>,
    pub list_state: ListState,
    pub sidebar_state: ListState,
    pub active_focus: Focus,
    pub message: String,
    pub loading: bool,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub cursor_position: usize,
    pub input_target: Option<ItemRef>,
    /// Re-selected after the next snapshot (reorders move the row).
    pub follow: Option<ItemRef>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        let mut l_state = ListState::default();
        l_state.select(Some(0));
        let mut s_state = ListState::default();
        s_state.select(Some(0));
        Self {
            lists: vec![],
            active_list: None,
            mode: Mode::default(),
            theme: Theme::default(),
            filter: ViewFilter::default(),
            rows: vec![],
            list_state: l_state,
            sidebar_state: s_state,
            active_focus: Focus::Main,
            message: "Tab: Lists | a: Add | A: Subtask | e: Edit | /: Search".to_string(),
            loading: true,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            cursor_position: 0,
            input_target: None,
            follow: None,
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.lists = snapshot.lists;
        self.active_list = snapshot.active;
        self.mode = snapshot.mode;
        self.theme = snapshot.theme;
        self.loading = false;
        if let Some(idx) = self
            .active_list
            .and_then(|id| self.lists.iter().position(|l| l.id == id))
        {
            self.sidebar_state.select(Some(idx));
        }
        self.recalculate_view();
        if let Some(item) = self.follow.take() {
            self.select_item(&item);
        }
    }

    pub fn active_list(&self) -> Option<&TaskList> {
        self.active_list
            .and_then(|id| self.lists.iter().find(|l| l.id == id))
    }

    // --- Input buffer ---

    pub fn start_input(&mut self, mode: InputMode, prefill: &str, target: Option<ItemRef>) {
        self.input_mode = mode;
        self.input_buffer = prefill.to_string();
        self.cursor_position = prefill.chars().count();
        self.input_target = target;
    }

    pub fn move_cursor_left(&mut self) {
        let cursor_moved_left = self.cursor_position.saturating_sub(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_left);
    }
    pub fn move_cursor_right(&mut self) {
        let cursor_moved_right = self.cursor_position.saturating_add(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_right);
    }
    pub fn enter_char(&mut self, new_char: char) {
        let byte_idx = self.byte_index();
        self.input_buffer.insert(byte_idx, new_char);
        self.move_cursor_right();
    }
    pub fn delete_char(&mut self) {
        if self.cursor_position != 0 {
            let current_index = self.cursor_position;
            let from_left_to_current_index = current_index - 1;
            let before_char_to_delete = self.input_buffer.chars().take(from_left_to_current_index);
            let after_char_to_delete = self.input_buffer.chars().skip(current_index);
            self.input_buffer = before_char_to_delete.chain(after_char_to_delete).collect();
            self.move_cursor_left();
        }
    }
    pub fn reset_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.cursor_position = 0;
        self.input_target = None;
    }
    fn byte_index(&self) -> usize {
        self.input_buffer
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.cursor_position)
            .unwrap_or(self.input_buffer.len())
    }
    fn clamp_cursor(&self, new_cursor_pos: usize) -> usize {
        new_cursor_pos.clamp(0, self.input_buffer.chars().count())
    }

    // --- View ---

    /// Rebuilds the flattened rows from the active list and the filter.
    /// Live search reads the input buffer while searching.
    pub fn recalculate_view(&mut self) {
        self.recalculate_view_at(Local::now().date_naive());
    }

    fn recalculate_view_at(&mut self, today: NaiveDate) {
        let mut filter = self.filter.clone();
        if self.input_mode == InputMode::Searching {
            filter.query = Some(self.input_buffer.clone()).filter(|q| !q.trim().is_empty());
        }

        let mut rows = Vec::new();
        if let Some(list) = self.active_list() {
            for task in filter.apply(list) {
                let item = ItemRef::task(task.id);
                rows.push(Row {
                    item: item.clone(),
                    depth: 0,
                    text: task.text.clone(),
                    completed: task.completed,
                    child_count: task.subtasks.len(),
                    priority: Some(task.priority),
                    due_date: task.due_date,
                    overdue: task.is_overdue(today),
                    tag: task.tag.clone(),
                });
                push_subtasks(&mut rows, &item, &task.subtasks, 1);
            }
        }
        self.rows = rows;

        let sel = self.list_state.selected().unwrap_or(0);
        if self.rows.is_empty() {
            self.list_state.select(Some(0));
        } else if sel >= self.rows.len() {
            self.list_state.select(Some(self.rows.len() - 1));
        }
    }

    pub fn selected_row(&self) -> Option<&Row> {
        self.list_state.selected().and_then(|i| self.rows.get(i))
    }

    pub fn selected_item(&self) -> Option<ItemRef> {
        self.selected_row().map(|r| r.item.clone())
    }

    /// Keeps the cursor on `item` after a reorder, if it is still visible.
    pub fn select_item(&mut self, item: &ItemRef) {
        if let Some(idx) = self.rows.iter().position(|r| r.item == *item) {
            self.list_state.select(Some(idx));
        }
    }

    pub fn selected_list_id(&self) -> Option<Uuid> {
        self.sidebar_state
            .selected()
            .and_then(|i| self.lists.get(i))
            .map(|l| l.id)
    }

    fn focused_len(&self) -> usize {
        match self.active_focus {
            Focus::Main => self.rows.len(),
            Focus::Sidebar => self.lists.len(),
        }
    }

    fn focused_state(&mut self) -> &mut ListState {
        match self.active_focus {
            Focus::Main => &mut self.list_state,
            Focus::Sidebar => &mut self.sidebar_state,
        }
    }

    pub fn next(&mut self) {
        let len = self.focused_len();
        if len == 0 {
            return;
        }
        let state = self.focused_state();
        let i = match state.selected() {
            Some(i) if i < len - 1 => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.focused_len();
        if len == 0 {
            return;
        }
        let state = self.focused_state();
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    pub fn jump_forward(&mut self, step: usize) {
        let len = self.focused_len();
        if len == 0 {
            return;
        }
        let state = self.focused_state();
        let current = state.selected().unwrap_or(0);
        state.select(Some((current + step).min(len - 1)));
    }

    pub fn jump_backward(&mut self, step: usize) {
        if self.focused_len() == 0 {
            return;
        }
        let state = self.focused_state();
        let current = state.selected().unwrap_or(0);
        state.select(Some(current.saturating_sub(step)));
    }

    pub fn toggle_focus(&mut self) {
        self.active_focus = match self.active_focus {
            Focus::Main => Focus::Sidebar,
            Focus::Sidebar => Focus::Main,
        }
    }
}

fn push_subtasks(rows: &mut Vec<Row>, parent: &ItemRef, subs: &[Subtask], depth: usize) {
    for sub in subs {
        let item = parent.child(sub.id);
        rows.push(Row {
            item: item.clone(),
            depth,
            text: sub.text.clone(),
            completed: sub.completed,
            child_count: sub.subtasks.len(),
            priority: None,
            due_date: None,
            overdue: false,
            tag: None,
        });
        push_subtasks(rows, &item, &sub.subtasks, depth + 1);
    }
}
