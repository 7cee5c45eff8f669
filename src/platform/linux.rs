// markshelf platform paths for Linux
// Config: ~/.config/markshelf
// Data:   ~/.local/share/markshelf

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Uses `$XDG_CONFIG_HOME/markshelf` if set, otherwise `~/.config/markshelf`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("markshelf"),
        _ => home_dir().join(".config").join("markshelf"),
    }
}

/// Uses `$XDG_DATA_HOME/markshelf` if set, otherwise `~/.local/share/markshelf`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("markshelf"),
        _ => home_dir().join(".local").join("share").join("markshelf"),
    }
}
