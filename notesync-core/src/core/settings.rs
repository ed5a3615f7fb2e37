//! Persisted sync settings.
//!
//! Stores the sync account, the time of the last successful pass and the next
//! outbound action id in a JSON file at an OS-appropriate location.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted sync state of one installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncSettings {
    /// Remote account the notes are synced against.
    pub sync_account: Option<String>,
    /// Epoch millis of the last successful pass; 0 if never synced.
    pub last_sync_time: i64,
    /// Next id to tag an outbound create or update record with.
    pub next_action_id: i64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            sync_account: None,
            last_sync_time: 0,
            next_action_id: 1,
        }
    }
}

impl SyncSettings {
    /// Hands out the next action id.
    pub fn take_action_id(&mut self) -> i64 {
        let id = self.next_action_id;
        self.next_action_id += 1;
        id
    }

    /// Stamps a successful pass that finished at `timestamp` (epoch millis).
    pub fn record_sync(&mut self, timestamp: i64) {
        self.last_sync_time = timestamp;
    }
}

/// Returns the path to the settings JSON file.
///
/// - macOS / Linux: `~/.config/notesync/settings.json`
/// - Windows: `%APPDATA%/NoteSync/settings.json`
pub fn default_settings_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("NoteSync").join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("notesync").join("settings.json")
    }
}

/// Loads settings from `path`; returns defaults if the file is missing or corrupt.
pub fn load_settings(path: &Path) -> SyncSettings {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring corrupt settings file {}: {e}", path.display());
            SyncSettings::default()
        }),
        Err(_) => SyncSettings::default(),
    }
}

/// Saves settings to `path`, creating parent directories as needed.
pub fn save_settings(path: &Path, settings: &SyncSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings(&dir.path().join("settings.json"));
        assert_eq!(settings, SyncSettings::default());
        assert_eq!(settings.next_action_id, 1);
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), SyncSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = SyncSettings {
            sync_account: Some("someone@example.com".to_string()),
            ..SyncSettings::default()
        };
        assert_eq!(settings.take_action_id(), 1);
        assert_eq!(settings.take_action_id(), 2);
        settings.record_sync(1_700_000_000_000);
        save_settings(&path, &settings).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"lastSyncTime\""));
        assert!(content.contains("\"nextActionId\": 3"));
        assert_eq!(load_settings(&path), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "syncAccount": "a" }"#).unwrap();

        let settings = load_settings(&path);
        assert_eq!(settings.sync_account.as_deref(), Some("a"));
        assert_eq!(settings.next_action_id, 1);
    }

    #[test]
    fn test_default_path_is_json_file() {
        assert!(default_settings_path().ends_with("settings.json"));
    }
}
