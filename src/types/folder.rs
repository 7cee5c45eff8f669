use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::double_option;

/// Display color used when a folder is created without one.
pub const DEFAULT_FOLDER_COLOR: &str = "#64748b";

/// A node in the folder forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: i64,
    pub name: String,
    /// `None` marks a root folder.
    pub parent_id: Option<i64>,
    pub color: String,
    pub created_at: DateTime<Utc>,
    /// Cached number of bookmarks filed directly in this folder. Maintained by
    /// the caller, never recomputed by the folder store on its own.
    #[serde(default)]
    pub bookmark_count: u64,
}

impl Folder {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Input for creating a folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderDraft {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub color: Option<String>,
}

impl FolderDraft {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn child_of(name: impl Into<String>, parent_id: i64) -> Self {
        Self {
            name: name.into(),
            parent_id: Some(parent_id),
            color: None,
        }
    }
}

/// Partial update of a folder. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `Some(None)` turns the folder into a root folder.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl FolderPatch {
    pub fn reparent(parent_id: Option<i64>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}
