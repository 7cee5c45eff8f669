use serde::{Deserialize, Serialize};

use super::folder::DEFAULT_FOLDER_COLOR;
use super::tag::DEFAULT_TAG_COLOR;

/// Top-level settings for a markshelf library.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LibrarySettings {
    pub storage: StorageBackend,
    /// SQLite file path; the platform data directory is used when unset.
    pub database_path: Option<String>,
    pub remote: RemoteSettings,
    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub log_level: String,
    pub default_folder_color: String,
    pub default_tag_color: String,
    pub recent_limit: usize,
    pub popular_limit: usize,
    pub popular_tags_limit: usize,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            storage: StorageBackend::Sqlite,
            database_path: None,
            remote: RemoteSettings::default(),
            log_level: "info".to_string(),
            default_folder_color: DEFAULT_FOLDER_COLOR.to_string(),
            default_tag_color: DEFAULT_TAG_COLOR.to_string(),
            recent_limit: 10,
            popular_limit: 10,
            popular_tags_limit: 20,
        }
    }
}

/// Which repository implementation backs the stores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Sqlite,
    Remote,
}

/// Connection parameters for the HTTP-backed repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api/".to_string(),
            timeout_secs: 10,
        }
    }
}
