//! Application settings
//!
//! Settings are read from a JSON file at the platform-appropriate config location:
//! - macOS: ~/Library/Application Support/bytediff/settings.json
//! - Windows: %APPDATA%/bytediff/settings.json
//! - Linux: ~/.config/bytediff/settings.json
//!
//! The file is never written by bytediff; histories and display state are
//! kept for the lifetime of the process only.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::editor::history::MAX_HISTORY_SIZE;
use crate::editor::search::DEFAULT_BLOCK_SIZE;

/// Smallest search block accepted from the settings file
const MIN_SEARCH_BLOCK_SIZE: usize = 16;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Window width in logical pixels
    pub window_width: f32,

    /// Window height in logical pixels
    pub window_height: f32,

    /// Monospace font size in points
    pub font_size: f32,

    /// Block size used by the pattern searcher
    pub search_block_size: usize,

    /// Maximum entries kept in each input history
    pub history_limit: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            window_width: 1000.0,
            window_height: 760.0,
            font_size: 14.0,
            search_block_size: DEFAULT_BLOCK_SIZE,
            history_limit: MAX_HISTORY_SIZE,
        }
    }
}

impl AppSettings {
    /// Get the path to the settings file
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("bytediff");
            path.push("settings.json");
            path
        })
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            log::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Failed to parse settings file: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to read settings file: {}", e);
                }
                Self::default()
            }
        }
    }

    /// Parse settings JSON; missing fields take their defaults
    fn parse(contents: &str) -> serde_json::Result<Self> {
        let settings: Self = serde_json::from_str(contents)?;
        Ok(settings.sanitized())
    }

    fn sanitized(mut self) -> Self {
        self.search_block_size = self.search_block_size.max(MIN_SEARCH_BLOCK_SIZE);
        self.history_limit = self.history_limit.max(1);
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            self.font_size = Self::default().font_size;
        }
        self
    }
}
