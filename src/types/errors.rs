use thiserror::Error;

// === StoreError ===

/// Errors raised by the bookmark, folder and tag stores and their backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },
    /// Input was malformed (bad URL, empty required field, unknown parent).
    #[error("Validation failed: {0}")]
    Validation(String),
    /// Reparenting the folder would make it its own ancestor.
    #[error("Moving folder {folder_id} under folder {parent_id} would create a cycle")]
    Cycle { folder_id: i64, parent_id: i64 },
    /// A folder cannot be deleted while it has subfolders.
    #[error("Folder {folder_id} still has {children} subfolder(s)")]
    HasChildren { folder_id: i64, children: usize },
    /// The backing storage or transport failed or timed out.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        StoreError::NotFound { entity, id }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "not_found",
            StoreError::Validation(_) => "validation",
            StoreError::Cycle { .. } => "cycle",
            StoreError::HasChildren { .. } => "has_children",
            StoreError::Unavailable(_) => "unavailable",
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Unavailable(format!("database error: {}", e))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StoreError::Unavailable(format!("request timed out: {}", e))
        } else {
            StoreError::Unavailable(format!("transport error: {}", e))
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Unavailable(format!("malformed stored data: {}", e))
    }
}

/// Result alias used throughout the stores.
pub type StoreResult<T> = Result<T, StoreError>;

// === SettingsError ===

/// Errors related to settings persistence and updates.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading or writing the settings file failed.
    #[error("Settings I/O error: {0}")]
    Io(String),
    /// The settings file could not be parsed or written as JSON.
    #[error("Settings serialization error: {0}")]
    Serialization(String),
    /// The dot-path key does not name a setting.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The value has the wrong shape for the key.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
