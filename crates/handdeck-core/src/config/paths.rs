//! Path utilities for the HandDeck config file and stem library.

use std::path::PathBuf;

/// Default directory holding the stem library (`<root>/<song_name>/{bass,...}.<ext>`).
pub fn default_library_path() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join("Music").join("handdeck-library")
}

/// Path to the app config file, under the platform config directory
/// (`~/.config/handdeck/config.yaml` on Linux).
pub fn default_config_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("handdeck").join("config.yaml")
}
