use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::double_option;

/// A saved link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub favicon_url: String,
    /// Free-form icon name chosen in the UI, empty when unset.
    #[serde(default)]
    pub icon: String,
    /// `None` means the bookmark is unfiled (root level).
    pub folder_id: Option<i64>,
    /// Normalized tag names, lower-cased and unique within the bookmark.
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub access_count: u64,
}

impl Bookmark {
    /// Returns true if `needle` (already lower-cased) occurs in the title,
    /// description, URL or any tag.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.url.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

/// Input for creating a bookmark.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookmarkDraft {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub favicon_url: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub folder_id: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl BookmarkDraft {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn in_folder(mut self, folder_id: i64) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update of a bookmark. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookmarkPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// An empty string re-derives the favicon from the URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// `Some(None)` moves the bookmark back to the root level.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub folder_id: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl BookmarkPatch {
    /// Moves the bookmark into `folder_id` (`None` = root level).
    pub fn move_to(folder_id: Option<i64>) -> Self {
        Self {
            folder_id: Some(folder_id),
            ..Self::default()
        }
    }

    /// Every editable field of `bookmark`, used to put a record back as it was.
    pub fn restoring(bookmark: &Bookmark) -> Self {
        Self {
            url: Some(bookmark.url.clone()),
            title: Some(bookmark.title.clone()),
            description: Some(bookmark.description.clone()),
            favicon_url: Some(bookmark.favicon_url.clone()),
            icon: Some(bookmark.icon.clone()),
            folder_id: Some(bookmark.folder_id),
            tags: Some(bookmark.tags.clone()),
        }
    }
}
