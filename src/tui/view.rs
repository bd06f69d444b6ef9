use crate::color_utils::tag_color;
use crate::model::{Mode, Priority, Stats, StatusFilter, Theme};
use crate::tui::state::{AppState, Focus, InputMode, Row};
use chrono::Local;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

/// Accent colors per theme.
struct Palette {
    accent: Color,
    highlight_bg: Color,
    text: Color,
    muted: Color,
}

fn palette(theme: Theme) -> Palette {
    let (accent, highlight_bg) = match theme {
        Theme::Light => (Color::Blue, Color::Gray),
        Theme::Midnight => (Color::LightBlue, Color::DarkGray),
        Theme::Sunset => (Color::LightRed, Color::Rgb(255, 228, 230)),
        Theme::Forest => (Color::Green, Color::Rgb(220, 252, 231)),
        Theme::Ocean => (Color::Cyan, Color::Rgb(30, 58, 138)),
        Theme::Aurora => (Color::LightMagenta, Color::Rgb(88, 28, 135)),
    };
    let (text, muted) = if theme.is_dark() {
        (Color::White, Color::DarkGray)
    } else {
        (Color::Black, Color::Gray)
    };
    Palette {
        accent,
        highlight_bg,
        text,
        muted,
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Blue,
    }
}

fn row_line(row: &Row, state: &AppState, pal: &Palette) -> Line<'static> {
    let indent = "  ".repeat(row.depth);
    let checkbox = if row.completed { "[x] " } else { "[ ] " };
    let mut text_style = Style::default().fg(pal.text);
    if row.completed {
        text_style = text_style
            .fg(pal.muted)
            .add_modifier(Modifier::CROSSED_OUT);
    }

    let marker_style = match (state.mode, row.priority) {
        (Mode::Advanced, Some(p)) => Style::default().fg(priority_color(p)),
        _ => Style::default().fg(pal.accent),
    };

    let mut spans = vec![
        Span::raw(indent),
        Span::styled(checkbox, marker_style),
        Span::styled(row.text.clone(), text_style),
    ];
    if row.child_count > 0 {
        spans.push(Span::styled(
            format!(" ({})", row.child_count),
            Style::default().fg(pal.muted),
        ));
    }
    if state.mode == Mode::Advanced {
        if let Some(due) = row.due_date {
            let overdue = row.overdue;
            let label = if overdue {
                format!(" {} • Overdue", due.format("%b %-d"))
            } else {
                format!(" {}", due.format("%b %-d"))
            };
            let style = if overdue {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(pal.muted)
            };
            spans.push(Span::styled(label, style));
        }
        if let Some(p) = row.priority
            && p != Priority::Medium
        {
            spans.push(Span::styled(
                format!(" !{}", p),
                Style::default().fg(priority_color(p)),
            ));
        }
    }
    if let Some(tag) = &row.tag {
        let (r, g, b) = tag_color(tag, state.theme.is_dark());
        spans.push(Span::styled(
            format!(" #{}", tag),
            Style::default().fg(Color::Rgb(r, g, b)),
        ));
    }
    Line::from(spans)
}

fn stats_line(stats: &Stats) -> String {
    let mut s = format!(
        "Total {} | Active {} | Completed {} | Progress {}%",
        stats.total, stats.active, stats.completed, stats.completion
    );
    if stats.overdue > 0 {
        s.push_str(&format!(" | Overdue {}", stats.overdue));
    }
    s
}

pub fn draw(f: &mut Frame, state: &mut AppState) {
    let pal = palette(state.theme);
    let today = Local::now().date_naive();

    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(v_chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(h_chunks[1]);

    // --- Sidebar ---
    let list_items: Vec<ListItem> = state
        .lists
        .iter()
        .map(|l| {
            let open = l.tasks.iter().filter(|t| !t.completed).count();
            let style = if Some(l.id) == state.active_list {
                Style::default().fg(pal.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(pal.text)
            };
            ListItem::new(Line::from(vec![
                Span::styled(l.name.clone(), style),
                Span::styled(format!(" ({})", open), Style::default().fg(pal.muted)),
            ]))
        })
        .collect();
    let sidebar_style = if state.active_focus == Focus::Sidebar {
        Style::default().fg(pal.accent)
    } else {
        Style::default()
    };
    let sidebar = List::new(list_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Lists ")
                .border_style(sidebar_style),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(pal.highlight_bg),
        );
    f.render_stateful_widget(sidebar, h_chunks[0], &mut state.sidebar_state);

    // --- Task Tree ---
    let task_items: Vec<ListItem> = state
        .rows
        .iter()
        .map(|row| ListItem::new(row_line(row, state, &pal)))
        .collect();

    let main_style = if state.active_focus == Focus::Main {
        Style::default().fg(pal.accent)
    } else {
        Style::default()
    };
    let list_name = state
        .active_list()
        .map(|l| l.name.clone())
        .unwrap_or_default();
    let mut title = if state.loading {
        " Tasks (Loading...) ".to_string()
    } else {
        format!(" {} ", list_name)
    };
    if state.filter.status != StatusFilter::All {
        title.push_str(&format!("[{}] ", state.filter.status));
    }
    if let Some(tag) = &state.filter.tag {
        title.push_str(&format!("[#{}] ", tag));
    }
    let task_list = List::new(task_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(main_style),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(pal.highlight_bg),
        );
    f.render_stateful_widget(task_list, main_chunks[0], &mut state.list_state);

    // --- Details Pane ---
    let mut details = Vec::new();
    if let Some(list) = state.active_list() {
        details.push(Line::from(Span::styled(
            stats_line(&Stats::of(&list.tasks, today)),
            Style::default().fg(pal.accent),
        )));
    }
    if let Some(row) = state.selected_row() {
        let task = state
            .active_list()
            .and_then(|l| l.task(row.item.task));
        if let Some(task) = task {
            details.push(Line::from(""));
            if row.item.is_task() {
                details.push(Line::from(format!("Priority: {}", task.priority)));
                if let Some(due) = task.due_date {
                    details.push(Line::from(format!("Due: {}", due.format("%Y-%m-%d"))));
                }
                if let Some(tag) = &task.tag {
                    details.push(Line::from(format!("Tag: #{}", tag)));
                }
                details.push(Line::from(format!(
                    "Created: {}",
                    task.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                )));
            } else {
                details.push(Line::from(format!("Subtask of: {}", task.text)));
            }
        }
    }
    let details = Paragraph::new(details)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Details ({} / {}) ",
            state.mode,
            state.theme.name()
        )));
    f.render_widget(details, main_chunks[1]);

    // --- Footer / Input ---
    let footer_area = v_chunks[1];
    if state.input_mode == InputMode::Normal {
        let f_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(footer_area);
        let status_color = if state.message.starts_with("Error") {
            Color::Red
        } else {
            Color::Cyan
        };
        let status = Paragraph::new(state.message.clone())
            .style(Style::default().fg(status_color))
            .block(
                Block::default()
                    .borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)
                    .title(" Status "),
            );
        let help_text = "Spc:Done | J/K:Move | f:Filter | #:Tag | m:Mode | T:Theme | y:Copy | x:Export";
        let help = Paragraph::new(help_text)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Right)
            .block(
                Block::default()
                    .borders(Borders::RIGHT | Borders::TOP | Borders::BOTTOM)
                    .title(" Actions "),
            );
        f.render_widget(status, f_chunks[0]);
        f.render_widget(help, f_chunks[1]);
        return;
    }

    let (title, prefix, color) = match state.input_mode {
        InputMode::Searching => (" Search ", "/ ", Color::Green),
        InputMode::TagFilter => (" Filter by Tag (empty clears) ", "# ", Color::Green),
        InputMode::Editing => (" Edit ", "> ", Color::Magenta),
        InputMode::CreatingSubtask => (" Add Subtask ", "> ", Color::Yellow),
        InputMode::CreatingList => (" New List ", "> ", Color::Blue),
        InputMode::RenamingList => (" Rename List ", "> ", Color::Blue),
        InputMode::Creating if state.mode == Mode::Advanced => {
            (" Add Task (!high @tomorrow #tag) ", "> ", Color::Yellow)
        }
        _ => (" Add Task ", "> ", Color::Yellow),
    };
    let input = Paragraph::new(format!("{}{}", prefix, state.input_buffer))
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(input, footer_area);
    let cursor_x = footer_area.x + 1 + prefix.chars().count() as u16 + state.cursor_position as u16;
    let cursor_y = footer_area.y + 1;
    f.set_cursor_position((cursor_x, cursor_y));
}
