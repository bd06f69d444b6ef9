// File: ./src/logging.rs
//! Rolling file logs.
//!
//! The terminal belongs to the TUI, so nothing is ever logged to stdout.
//! Init is idempotent per process and never panics.

use anyhow::{Result, anyhow};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const LOG_FILE_BASENAME: &str = "dusted";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

struct LoggingState {
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

static LOGGING: OnceLock<LoggingState> = OnceLock::new();

/// Starts file logging under `log_dir` at `level` (`error`..`trace`).
///
/// A second call with the same directory is a no-op; a different directory
/// is rejected.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<()> {
    if let Some(state) = LOGGING.get() {
        if state.log_dir == log_dir {
            return Ok(());
        }
        return Err(anyhow!(
            "logging already initialized at {}",
            state.log_dir.display()
        ));
    }

    std::fs::create_dir_all(log_dir)?;
    let handle = Logger::try_with_str(level)
        .map_err(|e| anyhow!("invalid log level `{}`: {}", level, e))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|e| anyhow!("failed to start logger: {}", e))?;

    let _ = LOGGING.set(LoggingState {
        log_dir: log_dir.to_path_buf(),
        _handle: handle,
    });
    info!(
        "event=app_start version={} platform={}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    );
    Ok(())
}

/// Appends panics to `<dir>/panic.log` before running the default hook.
pub fn install_panic_hook(dir: &Path) {
    let path = dir.join("panic.log");
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        use std::io::Write;
        if let Ok(mut file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            let _ = writeln!(file, "PANIC: {:?}", info);
        }
        log::error!("event=panic info={}", info);
        default_hook(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // The logger is process-global, so every init case lives in one test.
    #[test]
    fn init_is_idempotent_per_directory() {
        let tmp = TempDir::new().unwrap();
        let logs = tmp.path().join("logs");
        init_logging("info", &logs).unwrap();
        assert!(logs.is_dir());
        assert!(init_logging("debug", &logs).is_ok());

        let other = tmp.path().join("elsewhere");
        let err = init_logging("info", &other).unwrap_err();
        assert!(err.to_string().contains("already initialized"));
    }
}
