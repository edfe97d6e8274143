//! Platform-specific default directories.
//!
//! - Linux: `~/.local/share/huddle` (or `$XDG_DATA_HOME/huddle`)
//! - macOS: `~/Library/Application Support/huddle`
//! - Windows: `%APPDATA%\huddle`
use std::path::PathBuf;

/// Default data directory, `./huddle_data` when no home directory is known.
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "huddle")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./huddle_data"))
}
