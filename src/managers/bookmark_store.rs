//! Bookmark Store for markshelf.
//!
//! Owns bookmark records behind an injected [`Repository`]: CRUD, folder-scoped
//! listing, multi-field search, access tracking and bulk delete.
//!
//! The store never looks at folders. Keeping `Folder::bookmark_count` in step
//! with bookmark changes is the caller's job (see [`crate::app::Library`]).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::repository::{Entity, Repository};
use crate::services::tags::normalize_tags;
use crate::services::urls::{favicon_for, parse_absolute};
use crate::types::bookmark::{Bookmark, BookmarkDraft, BookmarkPatch};
use crate::types::errors::{StoreError, StoreResult};

/// Bookmark store over any repository backend.
pub struct BookmarkStore {
    repo: Arc<dyn Repository<Bookmark>>,
    /// Serializes mutations so read-modify-write sequences are atomic.
    write_lock: Mutex<()>,
}

impl BookmarkStore {
    pub fn new(repo: Arc<dyn Repository<Bookmark>>) -> Self {
        Self {
            repo,
            write_lock: Mutex::new(()),
        }
    }

    fn validated_title(title: &str) -> StoreResult<String> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::validation("title must not be empty"));
        }
        Ok(title.to_string())
    }

    /// Newest first; ties broken by id so the order is total.
    fn sort_newest_first(bookmarks: &mut [Bookmark]) {
        bookmarks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    }
}

/// Bookmark operations offered to the presentation layer.
#[async_trait]
pub trait BookmarkStoreTrait: Send + Sync {
    async fn get_all(&self) -> StoreResult<Vec<Bookmark>>;
    async fn get_by_id(&self, id: i64) -> StoreResult<Bookmark>;
    async fn get_by_folder(&self, folder_id: Option<i64>) -> StoreResult<Vec<Bookmark>>;
    async fn search(&self, query: &str) -> StoreResult<Vec<Bookmark>>;
    async fn create(&self, draft: BookmarkDraft) -> StoreResult<Bookmark>;
    async fn update(&self, id: i64, patch: BookmarkPatch) -> StoreResult<Bookmark>;
    async fn delete(&self, id: i64) -> StoreResult<()>;
    async fn bulk_delete(&self, ids: &[i64]) -> StoreResult<usize>;
    async fn increment_access(&self, id: i64) -> StoreResult<Option<Bookmark>>;
    async fn get_recent(&self, limit: usize) -> StoreResult<Vec<Bookmark>>;
    async fn get_popular(&self, limit: usize) -> StoreResult<Vec<Bookmark>>;
}

#[async_trait]
impl BookmarkStoreTrait for BookmarkStore {
    /// All bookmarks, newest first.
    async fn get_all(&self) -> StoreResult<Vec<Bookmark>> {
        let mut all = self.repo.list().await?;
        Self::sort_newest_first(&mut all);
        debug!(count = all.len(), "listed bookmarks");
        Ok(all)
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<Bookmark> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::not_found(Bookmark::NAME, id))
    }

    /// Bookmarks filed directly in `folder_id` (`None` = unfiled). Subfolders
    /// are not descended into.
    async fn get_by_folder(&self, folder_id: Option<i64>) -> StoreResult<Vec<Bookmark>> {
        let mut matching: Vec<Bookmark> = self
            .repo
            .list()
            .await?
            .into_iter()
            .filter(|b| b.folder_id == folder_id)
            .collect();
        Self::sort_newest_first(&mut matching);
        Ok(matching)
    }

    /// Case-insensitive substring search over title, description, URL and
    /// tags. A blank query means "no filter" and returns everything.
    async fn search(&self, query: &str) -> StoreResult<Vec<Bookmark>> {
        if query.trim().is_empty() {
            return self.get_all().await;
        }
        let needle = query.to_lowercase();
        let mut hits: Vec<Bookmark> = self
            .repo
            .list()
            .await?
            .into_iter()
            .filter(|b| b.matches(&needle))
            .collect();
        Self::sort_newest_first(&mut hits);
        debug!(query, hits = hits.len(), "searched bookmarks");
        Ok(hits)
    }

    /// Creates a bookmark, filling defaults and deriving the favicon from the
    /// URL's origin when none is given.
    async fn create(&self, draft: BookmarkDraft) -> StoreResult<Bookmark> {
        let url = parse_absolute(&draft.url)?;
        let title = Self::validated_title(&draft.title)?;
        let favicon_url = draft
            .favicon_url
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| favicon_for(&url));
        let now = Utc::now();

        let bookmark = Bookmark {
            id: 0,
            url: draft.url.trim().to_string(),
            title,
            description: draft.description.unwrap_or_default(),
            favicon_url,
            icon: draft.icon.unwrap_or_default(),
            folder_id: draft.folder_id,
            tags: normalize_tags(&draft.tags),
            created_at: now,
            last_accessed_at: now,
            access_count: 0,
        };

        let _guard = self.write_lock.lock().await;
        let created = self.repo.insert(bookmark).await?;
        info!(id = created.id, url = %created.url, "created bookmark");
        Ok(created)
    }

    /// Merges `patch` onto the stored record. `id`, `created_at`,
    /// `access_count` and `last_accessed_at` are never touched here.
    async fn update(&self, id: i64, patch: BookmarkPatch) -> StoreResult<Bookmark> {
        let _guard = self.write_lock.lock().await;
        let mut bookmark = self.get_by_id(id).await?;

        if let Some(raw) = patch.url {
            parse_absolute(&raw)?;
            bookmark.url = raw.trim().to_string();
        }
        if let Some(title) = patch.title {
            bookmark.title = Self::validated_title(&title)?;
        }
        if let Some(description) = patch.description {
            bookmark.description = description;
        }
        if let Some(icon) = patch.icon {
            bookmark.icon = icon;
        }
        if let Some(folder_id) = patch.folder_id {
            bookmark.folder_id = folder_id;
        }
        if let Some(tags) = patch.tags {
            bookmark.tags = normalize_tags(&tags);
        }
        if let Some(favicon) = patch.favicon_url {
            bookmark.favicon_url = if favicon.trim().is_empty() {
                favicon_for(&parse_absolute(&bookmark.url)?)
            } else {
                favicon
            };
        }

        if !self.repo.update(&bookmark).await? {
            return Err(StoreError::not_found(Bookmark::NAME, id));
        }
        info!(id, "updated bookmark");
        Ok(bookmark)
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        if !self.repo.delete(id).await? {
            return Err(StoreError::not_found(Bookmark::NAME, id));
        }
        info!(id, "deleted bookmark");
        Ok(())
    }

    /// Deletes every listed bookmark that exists and returns how many were
    /// removed. Unknown (or repeated) ids are skipped.
    async fn bulk_delete(&self, ids: &[i64]) -> StoreResult<usize> {
        let _guard = self.write_lock.lock().await;
        let mut deleted = 0;
        for &id in ids {
            if self.repo.delete(id).await? {
                deleted += 1;
            }
        }
        if deleted < ids.len() {
            warn!(requested = ids.len(), deleted, "bulk delete skipped missing bookmarks");
        } else {
            info!(deleted, "bulk deleted bookmarks");
        }
        Ok(deleted)
    }

    /// Records one "open": bumps `access_count` and stamps `last_accessed_at`.
    ///
    /// Returns `None` when the bookmark no longer exists; that case is
    /// expected and not an error.
    async fn increment_access(&self, id: i64) -> StoreResult<Option<Bookmark>> {
        let _guard = self.write_lock.lock().await;
        let Some(mut bookmark) = self.repo.find_by_id(id).await? else {
            debug!(id, "access on missing bookmark ignored");
            return Ok(None);
        };

        bookmark.access_count = bookmark.access_count.saturating_add(1);
        bookmark.last_accessed_at = bookmark.last_accessed_at.max(Utc::now());

        if !self.repo.update(&bookmark).await? {
            return Ok(None);
        }
        debug!(id, count = bookmark.access_count, "recorded bookmark access");
        Ok(Some(bookmark))
    }

    /// Most recently accessed first.
    async fn get_recent(&self, limit: usize) -> StoreResult<Vec<Bookmark>> {
        let mut all = self.repo.list().await?;
        all.sort_by(|a, b| {
            b.last_accessed_at
                .cmp(&a.last_accessed_at)
                .then(b.id.cmp(&a.id))
        });
        all.truncate(limit);
        Ok(all)
    }

    /// Most frequently accessed first.
    async fn get_popular(&self, limit: usize) -> StoreResult<Vec<Bookmark>> {
        let mut all = self.repo.list().await?;
        all.sort_by(|a, b| {
            b.access_count
                .cmp(&a.access_count)
                .then(b.last_accessed_at.cmp(&a.last_accessed_at))
                .then(a.id.cmp(&b.id))
        });
        all.truncate(limit);
        Ok(all)
    }
}
