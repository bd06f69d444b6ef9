pub mod clipboard;
pub mod color_utils;
pub mod config;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;

#[cfg(feature = "tui")]
pub mod tui;
