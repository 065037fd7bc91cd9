use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const API_URL_ENV: &str = "DONORTRAIL_API_URL";
pub const BIND_ENV: &str = "DONORTRAIL_BIND";
pub const DATA_DIR_ENV: &str = "DONORTRAIL_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default)]
    pub allowed_origin: Option<String>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_api_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            api_base_url: default_api_base_url(),
            bind_addr: default_bind_addr(),
            allowed_origin: None,
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Apply `DONORTRAIL_*` environment overrides on top of the file values.
    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
        if let Ok(bind) = std::env::var(BIND_ENV) {
            if !bind.trim().is_empty() {
                self.bind_addr = bind.trim().to_string();
            }
        }
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.data_dir = dir.trim().to_string();
            }
        }
        self
    }

    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("donortrail.db")
    }

    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("donortrail.log")
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("donortrail")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("donortrail")
}

/// Settings as stored on disk, without environment overrides.
pub fn load_file_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn load_settings() -> Settings {
    load_file_settings().with_env_overrides()
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn get_db_path() -> PathBuf {
    load_settings().db_path()
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/test"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.data_dir, "/tmp/test");
        assert_eq!(s.api_base_url, "http://localhost:5000");
        assert_eq!(s.bind_addr, "127.0.0.1:5000");
        assert_eq!(s.log_filter, "info");
        assert!(s.allowed_origin.is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/test".to_string(),
            api_base_url: "https://api.example.org".to_string(),
            bind_addr: "0.0.0.0:8080".to_string(),
            allowed_origin: Some("https://example.org".to_string()),
            log_filter: "debug".to_string(),
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let loaded: Settings = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.api_base_url, "https://api.example.org");
        assert_eq!(loaded.allowed_origin.as_deref(), Some("https://example.org"));
    }

    #[test]
    fn test_paths_live_under_data_dir() {
        let s = Settings {
            data_dir: "/srv/trail".to_string(),
            ..Settings::default()
        };
        assert_eq!(s.db_path(), PathBuf::from("/srv/trail/donortrail.db"));
        assert_eq!(s.log_path(), PathBuf::from("/srv/trail/donortrail.log"));
    }

    #[test]
    fn test_defaults_are_populated() {
        let s = Settings::default();
        assert!(!s.data_dir.is_empty());
        assert_eq!(s.api_base_url, "http://localhost:5000");
    }
}
