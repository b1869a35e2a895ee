//! Editor configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! The config file is TOML, read with serde. Every section is
//! `#[serde(default)]`, so a file that names only `tab_size` still loads
//! and the rest falls back to [`Config::default`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tessel_buffer::BufferConfig;

/// Main editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Editing behavior
    pub editor: EditorConfig,

    /// File and session handling
    pub files: FileConfig,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("tessel").join("config.toml"))
    }

    /// Saves the config to a file, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The explicit settings handed to the buffer, cursor and history.
    pub fn buffer_config(&self) -> BufferConfig {
        BufferConfig {
            tab_width: self.editor.tab_size.max(1),
            page_size: self.editor.page_size.max(1),
            max_history: self.editor.undo_limit,
        }
    }
}

/// Editor behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Columns a tab occupies
    pub tab_size: usize,

    /// Lines moved by page up/down
    pub page_size: usize,

    /// Undo history limit (0 = unbounded)
    pub undo_limit: usize,

    /// Inserted by indent, removed by unindent
    pub indent: String,

    /// Line comment marker toggled by comment commands
    pub comment_prefix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_size: 4,
            page_size: 8,
            undo_limit: 1000,
            indent: "\t".to_string(),
            comment_prefix: "//".to_string(),
        }
    }
}

/// File handling configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Reopen files at the last cursor position
    pub restore_cursor: bool,

    /// Where session data lives (defaults to the platform data dir)
    pub session_dir: Option<PathBuf>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            restore_cursor: true,
            session_dir: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.editor.tab_size, 4);
        assert_eq!(config.editor.page_size, 8);
        assert!(config.files.restore_cursor);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str("[editor]\ntab_size = 8\n").unwrap();
        assert_eq!(parsed.editor.tab_size, 8);
        assert_eq!(parsed.editor.page_size, 8);
        assert_eq!(parsed.editor.comment_prefix, "//");
        assert_eq!(parsed.buffer_config().tab_width, 8);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.editor.page_size = 20;
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_zero_widths_are_clamped() {
        let mut config = Config::default();
        config.editor.tab_size = 0;
        config.editor.page_size = 0;
        let buffer = config.buffer_config();
        assert_eq!(buffer.tab_width, 1);
        assert_eq!(buffer.page_size, 1);
    }
}
