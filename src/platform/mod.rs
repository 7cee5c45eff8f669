// markshelf platform abstraction
// Resolves where settings and the local database live on each OS.
//
// Uses `cfg(target_os)` to pick the implementation at compile time.

use std::env;
use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Overrides the data directory (database file location).
pub const DATA_DIR_ENV: &str = "MARKSHELF_DATA_DIR";

/// Returns the platform-specific configuration directory for markshelf.
///
/// - **Linux**: `~/.config/markshelf` (or `$XDG_CONFIG_HOME/markshelf`)
/// - **macOS**: `~/Library/Application Support/Markshelf`
/// - **Windows**: `%APPDATA%/Markshelf`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the data directory, honoring `MARKSHELF_DATA_DIR` first.
///
/// - **Linux**: `~/.local/share/markshelf` (or `$XDG_DATA_HOME/markshelf`)
/// - **macOS**: `~/Library/Application Support/Markshelf`
/// - **Windows**: `%APPDATA%/Markshelf`
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}

/// Default location of the SQLite database file.
pub fn default_database_path() -> PathBuf {
    get_data_dir().join("markshelf.db")
}
