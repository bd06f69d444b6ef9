// File: ./src/config.rs
use crate::model::ExportFormat;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub log_level: String,
    pub default_list: String,
    pub export_format: ExportFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: "info".to_string(),
            default_list: "My Tasks".to_string(),
            export_format: ExportFormat::Markdown,
        }
    }
}

impl Config {
    pub fn get_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dusted", "dusted").map(|p| p.config_dir().join("config.toml"))
    }

    /// Missing file: defaults. Unreadable or invalid TOML: error.
    pub fn load() -> Result<Self> {
        match Self::get_path() {
            Some(path) if path.exists() => {
                let raw = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Self::from_toml(&raw).with_context(|| format!("invalid config {}", path.display()))
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg = Config::from_toml("log_level = \"debug\"\nexport_format = \"json\"\n").unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.export_format, ExportFormat::Json);
        assert_eq!(cfg.default_list, "My Tasks");
        assert!(cfg.data_dir.is_none());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(Config::from_toml("log_level = ").is_err());
        assert!(Config::from_toml("export_format = \"pdf\"").is_err());
    }
}
