// File: ./src/tui/mod.rs
pub mod action;
pub mod state;
pub mod view;

use crate::clipboard;
use crate::model::{ExportFormat, StatusFilter};
use crate::store::Store;
use crate::tui::action::{Action, AppEvent, ItemRef, Snapshot};
use crate::tui::state::{AppState, Focus, InputMode};
use crate::tui::view::draw;
use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{io, time::Duration};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

fn snapshot(store: &Store) -> Snapshot {
    Snapshot {
        lists: store.lists().to_vec(),
        active: store.active_list_id(),
        mode: store.mode(),
        theme: store.theme(),
    }
}

fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        "tasks".to_string()
    } else {
        stem.to_string()
    }
}

/// Applies one action to the store. Returns a status line, or `None` for
/// no-ops that changed nothing.
pub fn apply_action(store: &mut Store, action: Action) -> Result<Option<String>> {
    let today = Local::now().date_naive();
    let status = match action {
        Action::Quit => None,
        Action::SelectList(id) => store.select_list(id).then(String::new),
        Action::CreateList(name) => store.add_list(&name).map(|_| "List created.".to_string()),
        Action::RenameList(id, name) => store
            .rename_list(id, &name)
            .then(|| "List renamed.".to_string()),
        Action::DeleteList(id) => {
            if store.delete_list(id) {
                Some("List deleted.".to_string())
            } else if store.list(id).is_some() && store.lists().len() <= 1 {
                Some("The last list cannot be deleted.".to_string())
            } else {
                None
            }
        }
        Action::CreateTask(input) => {
            let Some(list) = store.active_list_id() else {
                return Ok(None);
            };
            store
                .add_task_smart(list, &input, today)
                .map(|_| "Created.".to_string())
        }
        Action::CreateSubtask(parent, text) => store
            .add_subtask(parent.task, &parent.path, &text)
            .map(|_| "Subtask added.".to_string()),
        Action::EditItem(item, text) => {
            let changed = if item.is_task() {
                store.edit_task_smart(item.task, &text, today)
            } else {
                store.edit_subtask(item.task, &item.path, &text)
            };
            changed.then(|| "Updated.".to_string())
        }
        Action::ToggleItem(item) => {
            let changed = if item.is_task() {
                store.toggle_task(item.task)
            } else {
                store.toggle_subtask(item.task, &item.path)
            };
            changed.then(String::new)
        }
        Action::DeleteItem(item) => {
            let changed = if item.is_task() {
                store.delete_task(item.task)
            } else {
                store.delete_subtask(item.task, &item.path)
            };
            changed.then(|| "Deleted.".to_string())
        }
        Action::ChangePriority(task, delta) => store
            .shift_priority(task, delta)
            .then(|| "Priority updated.".to_string()),
        Action::MoveItem(item, delta) => {
            let changed = if item.is_task() {
                store.move_task_by(item.task, delta)
            } else {
                store.move_subtask(item.task, &item.path, delta)
            };
            changed.then(String::new)
        }
        Action::ToggleMode => {
            let mode = store.mode().toggled();
            store.set_mode(mode);
            Some(format!("Mode: {}", mode))
        }
        Action::CycleTheme => {
            let theme = store.theme().next();
            store.set_theme(theme);
            Some(format!("Theme: {}", theme.name()))
        }
        Action::CopyToClipboard(filter) => {
            let Some(list) = store.active_list_id() else {
                return Ok(None);
            };
            let text = store.export(list, &filter, ExportFormat::Clipboard)?;
            clipboard::copy(&text)?;
            Some("Copied to clipboard.".to_string())
        }
        Action::ExportFile(format, filter) => {
            let Some(list) = store.active_list() else {
                return Ok(None);
            };
            let path = format!("{}.{}", file_stem(&list.name), format.extension());
            let text = store.export(list.id, &filter, format)?;
            std::fs::write(&path, text)?;
            Some(format!("Exported to {}", path))
        }
    };
    Ok(status)
}

/// Owns the store on a background task; the UI only ever sees snapshots.
pub fn spawn_store_actor(
    mut store: Store,
    mut action_rx: mpsc::Receiver<Action>,
    event_tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let _ = event_tx.send(AppEvent::Snapshot(snapshot(&store))).await;

        while let Some(action) = action_rx.recv().await {
            if matches!(action, Action::Quit) {
                break;
            }
            match apply_action(&mut store, action) {
                Ok(Some(status)) => {
                    let _ = event_tx.send(AppEvent::Snapshot(snapshot(&store))).await;
                    if !status.is_empty() {
                        let _ = event_tx.send(AppEvent::Status(status)).await;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("event=action_failed error={:#}", e);
                    let _ = event_tx.send(AppEvent::Error(format!("{:#}", e))).await;
                }
            }
        }
    })
}

/// Closes the event side first so a backlog of actions cannot block the
/// actor on a full channel, then waits for it to drain and exit.
async fn stop_store_actor(
    action_tx: &mpsc::Sender<Action>,
    event_rx: mpsc::Receiver<AppEvent>,
    actor: JoinHandle<()>,
) {
    drop(event_rx);
    let _ = action_tx.send(Action::Quit).await;
    if let Err(e) = actor.await {
        log::error!("event=actor_join_failed error={}", e);
    }
}

pub async fn run(store: Store) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new();
    let (action_tx, action_rx) = mpsc::channel(10);
    let (event_tx, mut event_rx) = mpsc::channel(10);
    let actor = spawn_store_actor(store, action_rx, event_tx);

    let result = ui_loop(&mut terminal, &mut app_state, &action_tx, &mut event_rx).await;

    stop_store_actor(&action_tx, event_rx, actor).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    result
}

async fn ui_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
    action_tx: &mpsc::Sender<Action>,
    event_rx: &mut mpsc::Receiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app_state))?;

        while let Ok(event) = event_rx.try_recv() {
            match event {
                AppEvent::Snapshot(snapshot) => app_state.apply_snapshot(snapshot),
                AppEvent::Error(msg) => app_state.message = format!("Error: {}", msg),
                AppEvent::Status(msg) => app_state.message = msg,
            }
        }

        if !crossterm::event::poll(Duration::from_millis(50))? {
            continue;
        }
        match event::read()? {
            Event::Mouse(mouse_event) => match mouse_event.kind {
                MouseEventKind::ScrollDown => app_state.next(),
                MouseEventKind::ScrollUp => app_state.previous(),
                _ => {}
            },
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if app_state.input_mode == InputMode::Normal {
                    if !handle_normal_key(app_state, key.code, action_tx).await {
                        return Ok(());
                    }
                } else {
                    handle_input_key(app_state, key.code, action_tx).await;
                }
            }
            _ => {}
        }
    }
}

async fn handle_input_key(app_state: &mut AppState, code: KeyCode, action_tx: &mpsc::Sender<Action>) {
    match code {
        KeyCode::Enter => {
            let input = app_state.input_buffer.trim().to_string();
            let target = app_state.input_target.clone();
            let action = match app_state.input_mode {
                InputMode::Creating => Some(Action::CreateTask(input)),
                InputMode::CreatingSubtask => target.map(|t| Action::CreateSubtask(t, input)),
                InputMode::Editing => target.map(|t| Action::EditItem(t, input)),
                InputMode::CreatingList => Some(Action::CreateList(input)),
                InputMode::RenamingList => target.map(|t| Action::RenameList(t.task, input)),
                InputMode::Searching => {
                    app_state.filter.query = Some(input).filter(|q| !q.is_empty());
                    None
                }
                InputMode::TagFilter => {
                    app_state.filter.tag = Some(input.trim_start_matches('#').to_string())
                        .filter(|t| !t.is_empty());
                    None
                }
                InputMode::Normal => None,
            };
            if let Some(action) = action {
                let _ = action_tx.send(action).await;
            }
            app_state.reset_input();
            app_state.recalculate_view();
        }
        KeyCode::Esc => {
            if app_state.input_mode == InputMode::Searching {
                app_state.filter.query = None;
            }
            app_state.reset_input();
            app_state.recalculate_view();
        }
        KeyCode::Char(c) => {
            app_state.enter_char(c);
            if app_state.input_mode == InputMode::Searching {
                app_state.recalculate_view();
            }
        }
        KeyCode::Backspace => {
            app_state.delete_char();
            if app_state.input_mode == InputMode::Searching {
                app_state.recalculate_view();
            }
        }
        KeyCode::Left => app_state.move_cursor_left(),
        KeyCode::Right => app_state.move_cursor_right(),
        _ => {}
    }
}

/// Returns `false` when the user quits.
async fn handle_normal_key(
    app_state: &mut AppState,
    code: KeyCode,
    action_tx: &mpsc::Sender<Action>,
) -> bool {
    let selected = app_state.selected_item();
    let action = match code {
        KeyCode::Char('q') => return false,
        KeyCode::Tab => {
            app_state.toggle_focus();
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app_state.next();
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app_state.previous();
            None
        }
        KeyCode::PageDown => {
            app_state.jump_forward(10);
            None
        }
        KeyCode::PageUp => {
            app_state.jump_backward(10);
            None
        }
        KeyCode::Enter if app_state.active_focus == Focus::Sidebar => {
            app_state.active_focus = Focus::Main;
            app_state.selected_list_id().map(Action::SelectList)
        }
        KeyCode::Char('n') => {
            app_state.start_input(InputMode::CreatingList, "", None);
            None
        }
        KeyCode::Char('r') => {
            if let Some(list) = app_state.active_list() {
                let prefill = list.name.clone();
                let target = Some(ItemRef::task(list.id));
                app_state.start_input(InputMode::RenamingList, &prefill, target);
            }
            None
        }
        KeyCode::Char('d') if app_state.active_focus == Focus::Sidebar => {
            app_state.selected_list_id().map(Action::DeleteList)
        }
        KeyCode::Char('a') => {
            app_state.start_input(InputMode::Creating, "", None);
            None
        }
        KeyCode::Char('A') => {
            if selected.is_some() {
                app_state.start_input(InputMode::CreatingSubtask, "", selected);
            }
            None
        }
        KeyCode::Char('e') => {
            if let Some(item) = selected {
                let prefill = edit_prefill(app_state, &item);
                app_state.start_input(InputMode::Editing, &prefill, Some(item));
            }
            None
        }
        KeyCode::Char('/') => {
            let prefill = app_state.filter.query.clone().unwrap_or_default();
            app_state.start_input(InputMode::Searching, &prefill, None);
            None
        }
        KeyCode::Char('#') => {
            let prefill = app_state.filter.tag.clone().unwrap_or_default();
            app_state.start_input(InputMode::TagFilter, &prefill, None);
            None
        }
        KeyCode::Char('f') => {
            app_state.filter.status = app_state.filter.status.cycle();
            app_state.message = match app_state.filter.status {
                StatusFilter::All => "Showing all tasks".to_string(),
                other => format!("Showing {} tasks", other),
            };
            app_state.recalculate_view();
            None
        }
        KeyCode::Char(' ') => selected.map(Action::ToggleItem),
        KeyCode::Char('d') => selected.map(Action::DeleteItem),
        KeyCode::Char('+') => selected
            .filter(ItemRef::is_task)
            .map(|i| Action::ChangePriority(i.task, 1)),
        KeyCode::Char('-') => selected
            .filter(ItemRef::is_task)
            .map(|i| Action::ChangePriority(i.task, -1)),
        KeyCode::Char('J') | KeyCode::Char('K') => selected.map(|i| {
            let delta = if code == KeyCode::Char('J') { 1 } else { -1 };
            app_state.follow = Some(i.clone());
            Action::MoveItem(i, delta)
        }),
        KeyCode::Char('m') => Some(Action::ToggleMode),
        KeyCode::Char('T') => Some(Action::CycleTheme),
        KeyCode::Char('y') => Some(Action::CopyToClipboard(app_state.filter.clone())),
        KeyCode::Char('x') => Some(Action::ExportFile(
            ExportFormat::Markdown,
            app_state.filter.clone(),
        )),
        _ => None,
    };

    if let Some(action) = action {
        let _ = action_tx.send(action).await;
    }
    true
}

fn edit_prefill(app_state: &AppState, item: &ItemRef) -> String {
    let Some(task) = app_state.active_list().and_then(|l| l.task(item.task)) else {
        return String::new();
    };
    if item.is_task() {
        match app_state.mode {
            crate::model::Mode::Advanced => task.to_smart_string(),
            crate::model::Mode::Basic => task.text.clone(),
        }
    } else {
        task.subtask(&item.path)
            .map(|s| s.text.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;

    #[tokio::test]
    async fn actor_applies_actions_and_publishes_snapshots() {
        let store = Store::in_memory("My Tasks");
        let (action_tx, action_rx) = mpsc::channel(10);
        let (event_tx, mut event_rx) = mpsc::channel(10);
        let actor = spawn_store_actor(store, action_rx, event_tx);

        let Some(AppEvent::Snapshot(initial)) = event_rx.recv().await else {
            panic!("expected initial snapshot");
        };
        assert_eq!(initial.lists.len(), 1);

        action_tx
            .send(Action::CreateTask("Water plants".to_string()))
            .await
            .unwrap();
        let Some(AppEvent::Snapshot(after)) = event_rx.recv().await else {
            panic!("expected snapshot after create");
        };
        assert_eq!(after.lists[0].tasks[0].text, "Water plants");
        assert!(matches!(event_rx.recv().await, Some(AppEvent::Status(_))));

        action_tx.send(Action::Quit).await.unwrap();
        actor.await.unwrap();
    }

    #[tokio::test]
    async fn quit_with_queued_actions_does_not_block() {
        let store = Store::in_memory("My Tasks");
        let (action_tx, action_rx) = mpsc::channel(10);
        let (event_tx, event_rx) = mpsc::channel(10);
        let actor = spawn_store_actor(store, action_rx, event_tx);

        for i in 0..8 {
            action_tx
                .send(Action::CreateTask(format!("Chore {}", i)))
                .await
                .unwrap();
        }
        tokio::time::timeout(
            Duration::from_secs(2),
            stop_store_actor(&action_tx, event_rx, actor),
        )
        .await
        .expect("actor should stop once the UI stops listening");
    }

    #[test]
    fn subtask_actions_route_by_path() {
        let mut store = Store::in_memory("My Tasks");
        let list = store.active_list_id().unwrap();
        let task = store.add_task(list, NewTask::plain("Plan trip")).unwrap();
        let root = ItemRef::task(task);

        apply_action(&mut store, Action::CreateSubtask(root.clone(), "Book flights".into())).unwrap();
        let sub = store.find_task(task).unwrap().subtasks[0].id;
        let sub_ref = root.child(sub);

        apply_action(&mut store, Action::ToggleItem(sub_ref.clone())).unwrap();
        assert!(store.find_task(task).unwrap().completed);

        apply_action(&mut store, Action::EditItem(sub_ref.clone(), "Book trains".into())).unwrap();
        assert_eq!(store.find_task(task).unwrap().subtasks[0].text, "Book trains");

        apply_action(&mut store, Action::DeleteItem(sub_ref)).unwrap();
        assert!(store.find_task(task).unwrap().subtasks.is_empty());
    }

    #[test]
    fn noop_actions_report_nothing() {
        let mut store = Store::in_memory("My Tasks");
        let status = apply_action(&mut store, Action::CreateTask("   ".into())).unwrap();
        assert!(status.is_none());
        let ghost = ItemRef::task(uuid::Uuid::new_v4());
        assert!(apply_action(&mut store, Action::ToggleItem(ghost)).unwrap().is_none());
    }

    #[test]
    fn delete_list_reports_only_real_refusals() {
        let mut store = Store::in_memory("My Tasks");
        let only = store.active_list_id().unwrap();
        let status = apply_action(&mut store, Action::DeleteList(only)).unwrap();
        assert_eq!(status.as_deref(), Some("The last list cannot be deleted."));

        let ghost = uuid::Uuid::new_v4();
        assert!(apply_action(&mut store, Action::DeleteList(ghost)).unwrap().is_none());

        let work = store.add_list("Work").unwrap();
        let status = apply_action(&mut store, Action::DeleteList(work)).unwrap();
        assert_eq!(status.as_deref(), Some("List deleted."));
    }

    #[test]
    fn file_stem_is_filesystem_safe() {
        assert_eq!(file_stem("My Tasks"), "my-tasks");
        assert_eq!(file_stem("!!!"), "tasks");
    }
}
