use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpendError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Most recently opened CSV, used when no file is given.
    #[serde(default)]
    pub last_file: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Chart slices below this share get no percentage label.
    #[serde(default = "default_label_threshold")]
    pub label_threshold_pct: f64,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_label_threshold() -> f64 {
    3.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_file: None,
            log_level: default_log_level(),
            label_threshold_pct: default_label_threshold(),
        }
    }
}

pub const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

impl Settings {
    /// Apply a `config set KEY VALUE` change.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "log_level" => {
                let level = value.to_ascii_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(SpendError::Settings(format!(
                        "log_level must be one of: {}",
                        LOG_LEVELS.join(", ")
                    )));
                }
                self.log_level = level;
            }
            "label_threshold_pct" => {
                let v: f64 = value.parse().map_err(|_| {
                    SpendError::Settings(format!("label_threshold_pct must be a number, got '{value}'"))
                })?;
                if !(0.0..=100.0).contains(&v) {
                    return Err(SpendError::Settings(
                        "label_threshold_pct must be between 0 and 100".to_string(),
                    ));
                }
                self.label_threshold_pct = v;
            }
            "last_file" => {
                self.last_file = if value.is_empty() {
                    None
                } else {
                    Some(shellexpand_path(value))
                };
            }
            other => return Err(SpendError::Settings(format!("unknown setting '{other}'"))),
        }
        Ok(())
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("spendview")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn log_file_path() -> PathBuf {
    config_dir().join("spendview.log")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| SpendError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

/// Remember `path` as the last opened file.
pub fn remember_file(path: &std::path::Path) -> Result<()> {
    let mut settings = load_settings();
    settings.last_file = Some(shellexpand_path(&path.to_string_lossy()));
    save_settings(&settings)
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
