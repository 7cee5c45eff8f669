use serde::{Deserialize, Serialize};

/// Display color used when a tag is created without one.
pub const DEFAULT_TAG_COLOR: &str = "#64748b";

/// A normalized tag with its usage counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    /// Always lower-case.
    pub name: String,
    pub color: String,
    pub usage_count: u64,
}

/// Input for creating a tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagDraft {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl TagDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
        }
    }
}
