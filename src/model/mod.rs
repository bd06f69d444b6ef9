// File: ./src/model/mod.rs
// Aggregates the split model files
pub mod export;
pub mod filter;
pub mod item;
pub mod parser;
pub mod prefs;

pub use export::{ExportFormat, render};
pub use filter::{Stats, StatusFilter, ViewFilter};
pub use item::{ParseError, Priority, Subtask, Task, TaskList, array_move};
pub use parser::NewTask;
pub use prefs::{Mode, Theme};
