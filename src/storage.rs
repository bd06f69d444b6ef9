// File: ./src/storage.rs
// Key/value JSON persistence, one file per key
use anyhow::{Context, Result};
use directories::ProjectDirs;
use fs2::FileExt;
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Overrides every other data directory source. Used for test isolation.
pub const DATA_DIR_ENV: &str = "DUSTED_DATA_DIR";

pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create data directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Env var first, then the configured directory, then the platform data dir.
    pub fn resolve_dir(configured: Option<&Path>) -> Option<PathBuf> {
        if let Ok(dir) = env::var(DATA_DIR_ENV)
            && !dir.is_empty()
        {
            return Some(PathBuf::from(dir));
        }
        if let Some(dir) = configured {
            return Some(dir.to_path_buf());
        }
        ProjectDirs::from("com", "dusted", "dusted").map(|proj| proj.data_dir().to_path_buf())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Runs `f` while holding an exclusive advisory lock next to `path`.
    pub fn with_lock<T, F>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("failed to open lock file {}", lock_path.display()))?;
        FileExt::lock_exclusive(&lock_file)?;
        let result = f();
        let _ = FileExt::unlock(&lock_file);
        result
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.path_for(key);
        let json = serde_json::to_string_pretty(value)?;
        Self::with_lock(&path, || Self::atomic_write(&path, &json))
    }

    /// Missing or corrupt files yield `None`; corruption is logged.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);
        let json = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(
                    "event=storage_corrupt key={} path={} error={}",
                    key,
                    path.display(),
                    e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path()).unwrap();
        storage.save("mode", "advanced").unwrap();
        assert_eq!(storage.load::<String>("mode").as_deref(), Some("advanced"));
        assert!(!storage.path_for("mode").with_extension("tmp").exists());
    }

    #[test]
    fn corrupt_and_missing_files_load_as_none() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path()).unwrap();
        assert!(storage.load::<Vec<u32>>("lists").is_none());
        fs::write(storage.path_for("lists"), "{not json").unwrap();
        assert!(storage.load::<Vec<u32>>("lists").is_none());
    }

    #[test]
    fn new_creates_nested_directory() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a").join("b");
        let storage = LocalStorage::new(&nested).unwrap();
        assert!(storage.dir().is_dir());
    }
}
