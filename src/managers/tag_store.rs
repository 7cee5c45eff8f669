//! Tag Store for markshelf.
//!
//! Tags are unique by lower-cased name. `create` is idempotent by name and
//! `usage_count` only ever grows.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::repository::Repository;
use crate::services::tags::normalize_tag;
use crate::types::errors::{StoreError, StoreResult};
use crate::types::tag::{Tag, TagDraft, DEFAULT_TAG_COLOR};

pub struct TagStore {
    repo: Arc<dyn Repository<Tag>>,
    write_lock: Mutex<()>,
    default_color: String,
}

impl TagStore {
    pub fn new(repo: Arc<dyn Repository<Tag>>) -> Self {
        Self::with_default_color(repo, DEFAULT_TAG_COLOR)
    }

    pub fn with_default_color(repo: Arc<dyn Repository<Tag>>, color: &str) -> Self {
        Self {
            repo,
            write_lock: Mutex::new(()),
            default_color: color.to_string(),
        }
    }

    /// `name` must already be normalized.
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Tag>> {
        Ok(self
            .repo
            .list()
            .await?
            .into_iter()
            .find(|t| t.name.to_lowercase() == name))
    }
}

#[async_trait]
pub trait TagStoreTrait: Send + Sync {
    async fn get_all(&self) -> StoreResult<Vec<Tag>>;
    async fn get_popular(&self, limit: usize) -> StoreResult<Vec<Tag>>;
    async fn search(&self, query: &str) -> StoreResult<Vec<Tag>>;
    async fn create(&self, draft: TagDraft) -> StoreResult<Tag>;
    async fn increment_usage(&self, name: &str) -> StoreResult<Option<Tag>>;
}

#[async_trait]
impl TagStoreTrait for TagStore {
    /// All tags sorted by name.
    async fn get_all(&self) -> StoreResult<Vec<Tag>> {
        let mut all = self.repo.list().await?;
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    /// Highest `usage_count` first, ties by name.
    async fn get_popular(&self, limit: usize) -> StoreResult<Vec<Tag>> {
        let mut all = self.repo.list().await?;
        all.sort_by(|a, b| b.usage_count.cmp(&a.usage_count).then(a.name.cmp(&b.name)));
        all.truncate(limit);
        Ok(all)
    }

    /// Tags whose name contains `query` (case-insensitive). A blank query
    /// returns every tag.
    async fn search(&self, query: &str) -> StoreResult<Vec<Tag>> {
        if query.trim().is_empty() {
            return self.get_all().await;
        }
        let needle = query.to_lowercase();
        let hits: Vec<Tag> = self
            .get_all()
            .await?
            .into_iter()
            .filter(|t| t.name.to_lowercase().contains(&needle))
            .collect();
        debug!(query, hits = hits.len(), "searched tags");
        Ok(hits)
    }

    /// Returns the existing tag with this name (any case) unchanged, or
    /// creates it lower-cased with `usage_count = 1`.
    async fn create(&self, draft: TagDraft) -> StoreResult<Tag> {
        let name = normalize_tag(&draft.name)
            .ok_or_else(|| StoreError::validation("tag name must not be empty"))?;

        let _guard = self.write_lock.lock().await;
        if let Some(existing) = self.find_by_name(&name).await? {
            debug!(id = existing.id, name = %existing.name, "tag already exists");
            return Ok(existing);
        }

        let tag = Tag {
            id: 0,
            name,
            color: draft
                .color
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| self.default_color.clone()),
            usage_count: 1,
        };
        let created = self.repo.insert(tag).await?;
        info!(id = created.id, name = %created.name, "created tag");
        Ok(created)
    }

    /// Bumps the usage counter of the named tag. Returns `None` if there is
    /// no such tag.
    async fn increment_usage(&self, name: &str) -> StoreResult<Option<Tag>> {
        let Some(name) = normalize_tag(name) else {
            return Ok(None);
        };

        let _guard = self.write_lock.lock().await;
        let Some(mut tag) = self.find_by_name(&name).await? else {
            return Ok(None);
        };
        tag.usage_count = tag.usage_count.saturating_add(1);
        if !self.repo.update(&tag).await? {
            return Ok(None);
        }
        debug!(id = tag.id, usage = tag.usage_count, "incremented tag usage");
        Ok(Some(tag))
    }
}
