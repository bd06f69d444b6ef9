// File: ./src/model/export.rs
// Renders a (filtered) task tree into the export formats
use crate::model::item::{ParseError, Priority, Subtask, Task};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    #[default]
    Markdown,
    Text,
    Clipboard,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
            ExportFormat::Text | ExportFormat::Clipboard => "txt",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Text => "text",
            ExportFormat::Clipboard => "clipboard",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "text" | "txt" => Ok(ExportFormat::Text),
            "clipboard" => Ok(ExportFormat::Clipboard),
            other => Err(ParseError::ExportFormat(other.to_string())),
        }
    }
}

#[derive(Serialize)]
struct ExportDoc<'a> {
    list: &'a str,
    tasks: &'a [&'a Task],
}

// Per-format line shape shared by the tree walk
struct LineStyle {
    indent: &'static str,
    open: &'static str,
    done: &'static str,
    metadata: fn(&Task) -> String,
}

const MARKDOWN: LineStyle = LineStyle {
    indent: "  ",
    open: "- [ ] ",
    done: "- [x] ",
    metadata: markdown_metadata,
};

const TEXT: LineStyle = LineStyle {
    indent: "    ",
    open: "[ ] ",
    done: "[x] ",
    metadata: text_metadata,
};

const CLIPBOARD: LineStyle = LineStyle {
    indent: "  ",
    open: "☐ ",
    done: "☑ ",
    metadata: clipboard_metadata,
};

/// Renders `tasks` under the heading `list_name`.
pub fn render(list_name: &str, tasks: &[&Task], format: ExportFormat) -> Result<String> {
    let mut out = String::new();
    match format {
        ExportFormat::Json => {
            let doc = ExportDoc {
                list: list_name,
                tasks,
            };
            out = serde_json::to_string_pretty(&doc)?;
            out.push('\n');
        }
        ExportFormat::Markdown => {
            writeln!(out, "# {}\n", list_name)?;
            if tasks.is_empty() {
                out.push_str("_No tasks_\n");
            }
            write_tree(&mut out, tasks, &MARKDOWN)?;
        }
        ExportFormat::Text => {
            writeln!(out, "{}", list_name)?;
            writeln!(out, "{}\n", "=".repeat(list_name.chars().count()))?;
            if tasks.is_empty() {
                out.push_str("(no tasks)\n");
            }
            write_tree(&mut out, tasks, &TEXT)?;
        }
        ExportFormat::Clipboard => {
            writeln!(out, "{}", list_name)?;
            write_tree(&mut out, tasks, &CLIPBOARD)?;
        }
    }
    Ok(out)
}

fn write_tree(out: &mut String, tasks: &[&Task], style: &LineStyle) -> fmt::Result {
    for task in tasks {
        let mark = if task.completed { style.done } else { style.open };
        writeln!(out, "{}{}{}", mark, task.text, (style.metadata)(task))?;
        write_subtasks(out, &task.subtasks, 1, style)?;
    }
    Ok(())
}

fn write_subtasks(out: &mut String, subs: &[Subtask], depth: usize, style: &LineStyle) -> fmt::Result {
    for sub in subs {
        let mark = if sub.completed { style.done } else { style.open };
        writeln!(out, "{}{}{}", style.indent.repeat(depth), mark, sub.text)?;
        write_subtasks(out, &sub.subtasks, depth + 1, style)?;
    }
    Ok(())
}

fn metadata(task: &Task, priority: impl Fn(Priority) -> String) -> String {
    let mut s = String::new();
    if task.priority != Priority::Medium {
        s.push(' ');
        s.push_str(&priority(task.priority));
    }
    if let Some(due) = task.due_date {
        s.push_str(&format!(" (due {})", due.format("%Y-%m-%d")));
    }
    s.push_str(&clipboard_metadata(task));
    s
}

fn markdown_metadata(task: &Task) -> String {
    metadata(task, |p| format!("`{}`", p))
}

fn text_metadata(task: &Task) -> String {
    metadata(task, |p| format!("[{}]", p))
}

fn clipboard_metadata(task: &Task) -> String {
    match &task.tag {
        Some(tag) => format!(" #{}", tag),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tree() -> Vec<Task> {
        let mut trip = Task::new("Plan trip");
        trip.priority = Priority::High;
        trip.due_date = NaiveDate::from_ymd_opt(2026, 11, 2);
        trip.tag = Some("travel".to_string());
        let flights = trip.add_subtask(&[], "Book flights").unwrap();
        trip.add_subtask(&[flights], "Compare prices").unwrap();
        trip.add_subtask(&[], "Book hotel").unwrap();
        trip.toggle_subtask(&[flights]);

        let mut mail = Task::new("Reply to mail");
        mail.priority = Priority::Low;
        vec![trip, mail]
    }

    #[test]
    fn markdown_nests_with_metadata() {
        let tasks = tree();
        let refs: Vec<&Task> = tasks.iter().collect();
        let md = render("Weekend", &refs, ExportFormat::Markdown).unwrap();
        let expected = "\
# Weekend

- [ ] Plan trip `high` (due 2026-11-02) #travel
  - [x] Book flights
    - [x] Compare prices
  - [ ] Book hotel
- [ ] Reply to mail `low`
";
        assert_eq!(md, expected);
    }

    #[test]
    fn text_underlines_heading() {
        let tasks = tree();
        let refs: Vec<&Task> = tasks.iter().collect();
        let txt = render("Weekend", &refs, ExportFormat::Text).unwrap();
        let expected = "\
Weekend
=======

[ ] Plan trip [high] (due 2026-11-02) #travel
    [x] Book flights
        [x] Compare prices
    [ ] Book hotel
[ ] Reply to mail [low]
";
        assert_eq!(txt, expected);
    }

    #[test]
    fn clipboard_keeps_only_tags() {
        let tasks = tree();
        let refs: Vec<&Task> = tasks.iter().collect();
        let clip = render("Weekend", &refs, ExportFormat::Clipboard).unwrap();
        assert_eq!(
            clip,
            "Weekend\n☐ Plan trip #travel\n  ☑ Book flights\n    ☑ Compare prices\n  ☐ Book hotel\n☐ Reply to mail\n"
        );
    }

    #[test]
    fn json_uses_persisted_field_names() {
        let tasks = tree();
        let refs: Vec<&Task> = tasks.iter().collect();
        let json = render("Weekend", &refs, ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["list"], "Weekend");
        assert_eq!(value["tasks"][0]["dueDate"], "2026-11-02");
        assert_eq!(value["tasks"][0]["priority"], "high");
        assert_eq!(value["tasks"][0]["subtasks"][0]["subtasks"][0]["completed"], true);
    }

    #[test]
    fn empty_views_render_placeholders() {
        assert_eq!(
            render("Inbox", &[], ExportFormat::Markdown).unwrap(),
            "# Inbox\n\n_No tasks_\n"
        );
        assert_eq!(
            render("Inbox", &[], ExportFormat::Text).unwrap(),
            "Inbox\n=====\n\n(no tasks)\n"
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let tasks = tree();
        let refs: Vec<&Task> = tasks.iter().collect();
        for format in [
            ExportFormat::Json,
            ExportFormat::Markdown,
            ExportFormat::Text,
            ExportFormat::Clipboard,
        ] {
            assert_eq!(
                render("Weekend", &refs, format).unwrap(),
                render("Weekend", &refs, format).unwrap()
            );
        }
    }
}
