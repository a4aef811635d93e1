//! User settings persistence and UI configuration.
//!
//! This module handles loading and saving user preferences for the editor
//! window, such as the selection accent color and the export format.

use crate::editor::DEFAULT_ACCENT;
use crate::error::Result;
use crate::image_processing::ExportFormat;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Accent colors offered in the settings panel.
pub const ACCENT_PRESETS: &[(&str, [u8; 4])] = &[
    ("Blue", DEFAULT_ACCENT),
    ("Magenta", [217, 70, 239, 255]),
    ("Orange", [249, 115, 22, 255]),
    ("Black", [17, 24, 39, 255]),
];

/// User-configurable settings persisted between sessions.
///
/// Settings are stored as JSON in the user's config directory
/// (e.g., `~/.config/mockup-canvas/settings.json` on Linux).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Color of the selection frame and handles.
    pub accent: [u8; 4],
    /// Format used by the export button.
    #[serde(default)]
    pub export_format: ExportFormat,
    /// Where the last placement record was written.
    #[serde(default)]
    pub last_placement_path: Option<PathBuf>,
}

impl Settings {
    /// Returns the path to the settings file.
    ///
    /// Creates the config directory if it doesn't exist.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "mockup-canvas").map(|dirs| {
            let config_dir = dirs.config_dir();
            if !config_dir.exists() {
                let _ = fs::create_dir_all(config_dir);
            }
            config_dir.join("settings.json")
        })
    }

    /// Loads settings from disk, falling back to defaults if not found.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| fs::read_to_string(&path).ok())
            .and_then(|content| Self::from_json(&content))
            .unwrap_or_default()
    }

    fn from_json(content: &str) -> Option<Self> {
        match serde_json::from_str(content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                log::warn!("Ignoring unreadable settings file: {}", e);
                None
            }
        }
    }

    /// Persists settings to disk.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            let json = serde_json::to_string_pretty(self)?;
            fs::write(path, json)?;
        }
        Ok(())
    }

    /// Name of the preset matching the current accent, if any.
    pub fn accent_name(&self) -> &'static str {
        ACCENT_PRESETS
            .iter()
            .find(|(_, color)| *color == self.accent)
            .map(|(name, _)| *name)
            .unwrap_or("Custom")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            accent: DEFAULT_ACCENT,
            export_format: ExportFormat::Png,
            last_placement_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings = Settings::from_json(r#"{"accent":[1,2,3,255]}"#).unwrap();
        assert_eq!(settings.accent, [1, 2, 3, 255]);
        assert_eq!(settings.export_format, ExportFormat::Png);
        assert!(settings.last_placement_path.is_none());
    }

    #[test]
    fn test_garbage_is_ignored() {
        assert!(Settings::from_json("not json").is_none());
    }

    #[test]
    fn test_accent_name() {
        let mut settings = Settings::default();
        assert_eq!(settings.accent_name(), "Blue");
        settings.accent = [1, 1, 1, 1];
        assert_eq!(settings.accent_name(), "Custom");
    }
}
