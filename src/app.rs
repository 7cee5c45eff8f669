//! Library: the orchestration layer for markshelf.
//!
//! Composes the three stores and the session selection. The stores never call
//! each other; everything that spans them lives here:
//!
//! - keeping `Folder::bookmark_count` in step with bookmark create/move/delete
//! - creating or counting tags as bookmarks pick them up
//! - moving bookmarks to the root level when their folder is removed
//! - bulk-deleting the current selection

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::database::Database;
use crate::managers::bookmark_store::{BookmarkStore, BookmarkStoreTrait};
use crate::managers::folder_store::{FolderStore, FolderStoreTrait};
use crate::managers::selection::Selection;
use crate::managers::tag_store::{TagStore, TagStoreTrait};
use crate::platform;
use crate::repository::{MemoryRepository, RemoteRepository, Repository, SqliteRepository};
use crate::services::folder_tree::TreeEntry;
use crate::services::urls::title_from_url;
use crate::types::bookmark::{Bookmark, BookmarkDraft, BookmarkPatch};
use crate::types::errors::{StoreError, StoreResult};
use crate::types::folder::Folder;
use crate::types::settings::{LibrarySettings, StorageBackend};
use crate::types::tag::{Tag, TagDraft};

/// Central struct holding the stores and the current selection.
pub struct Library {
    pub bookmarks: BookmarkStore,
    pub folders: FolderStore,
    pub tags: TagStore,
    pub selection: Selection,
    settings: LibrarySettings,
}

impl Library {
    /// Builds a library over explicit repositories.
    pub fn new(
        bookmarks: Arc<dyn Repository<Bookmark>>,
        folders: Arc<dyn Repository<Folder>>,
        tags: Arc<dyn Repository<Tag>>,
        settings: LibrarySettings,
    ) -> Self {
        Self {
            bookmarks: BookmarkStore::new(bookmarks),
            folders: FolderStore::with_default_color(folders, &settings.default_folder_color),
            tags: TagStore::with_default_color(tags, &settings.default_tag_color),
            selection: Selection::new(),
            settings,
        }
    }

    /// An empty library kept entirely in memory.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryRepository::new()),
            Arc::new(MemoryRepository::new()),
            Arc::new(MemoryRepository::new()),
            LibrarySettings {
                storage: StorageBackend::Memory,
                ..LibrarySettings::default()
            },
        )
    }

    /// Opens the backend named by `settings.storage`.
    pub fn open(settings: &LibrarySettings) -> StoreResult<Self> {
        match settings.storage {
            StorageBackend::Memory => Ok(Self::new(
                Arc::new(MemoryRepository::new()),
                Arc::new(MemoryRepository::new()),
                Arc::new(MemoryRepository::new()),
                settings.clone(),
            )),
            StorageBackend::Sqlite => {
                let path = settings
                    .database_path
                    .as_ref()
                    .map(PathBuf::from)
                    .unwrap_or_else(platform::default_database_path);
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(|e| {
                        StoreError::Unavailable(format!(
                            "cannot create data directory {}: {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
                let db = Database::open_shared(&path)?;
                info!(path = %path.display(), "opened sqlite library");
                Ok(Self::new(
                    Arc::new(SqliteRepository::<Bookmark>::new(db.clone())),
                    Arc::new(SqliteRepository::<Folder>::new(db.clone())),
                    Arc::new(SqliteRepository::<Tag>::new(db)),
                    settings.clone(),
                ))
            }
            StorageBackend::Remote => {
                let base = &settings.remote.base_url;
                let timeout = Duration::from_secs(settings.remote.timeout_secs.max(1));
                info!(base = %base, "using remote library");
                Ok(Self::new(
                    Arc::new(RemoteRepository::<Bookmark>::new(base, timeout)?),
                    Arc::new(RemoteRepository::<Folder>::new(base, timeout)?),
                    Arc::new(RemoteRepository::<Tag>::new(base, timeout)?),
                    settings.clone(),
                ))
            }
        }
    }

    pub fn settings(&self) -> &LibrarySettings {
        &self.settings
    }

    async fn ensure_folder(&self, folder_id: i64) -> StoreResult<()> {
        match self.folders.get_by_id(folder_id).await {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound { .. }) => Err(StoreError::validation(format!(
                "folder {} does not exist",
                folder_id
            ))),
            Err(e) => Err(e),
        }
    }

    /// Creates missing tags and bumps the usage of existing ones.
    async fn attach_tags(&self, names: &[String]) -> StoreResult<()> {
        for name in names {
            if self.tags.increment_usage(name).await?.is_none() {
                self.tags.create(TagDraft::named(name.clone())).await?;
            }
        }
        Ok(())
    }

    /// Re-counts the bookmarks filed directly in `folder_id`.
    async fn refresh_folder_count(&self, folder_id: Option<i64>) -> StoreResult<()> {
        let Some(folder_id) = folder_id else {
            return Ok(());
        };
        let count = self.bookmarks.get_by_folder(Some(folder_id)).await?.len() as u64;
        match self.folders.update_bookmark_count(folder_id, count).await {
            Ok(_) | Err(StoreError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Count refresh after a bookmark write that already landed. A failure
    /// leaves the cached count stale until the next recompute.
    async fn refresh_after_write(&self, folder_id: Option<i64>) {
        if let Err(e) = self.refresh_folder_count(folder_id).await {
            warn!(folder = ?folder_id, error = %e, "folder bookmark count left stale");
        }
    }

    /// Saves a bookmark. A blank title falls back to the URL's host; the
    /// target folder must exist.
    ///
    /// If the tags cannot be recorded the new bookmark is deleted again and
    /// the error is returned.
    pub async fn add_bookmark(&self, mut draft: BookmarkDraft) -> StoreResult<Bookmark> {
        if draft.title.trim().is_empty() {
            if let Some(title) = title_from_url(&draft.url) {
                draft.title = title;
            }
        }
        if let Some(folder_id) = draft.folder_id {
            self.ensure_folder(folder_id).await?;
        }

        let created = self.bookmarks.create(draft).await?;
        if let Err(e) = self.attach_tags(&created.tags).await {
            if let Err(undo) = self.bookmarks.delete(created.id).await {
                warn!(id = created.id, error = %undo, "could not roll back bookmark");
            }
            return Err(e);
        }
        self.refresh_after_write(created.folder_id).await;
        Ok(created)
    }

    /// Edits a bookmark, re-counting both folders on a move and counting
    /// newly attached tags. A tag failure restores the previous record.
    pub async fn edit_bookmark(&self, id: i64, patch: BookmarkPatch) -> StoreResult<Bookmark> {
        let before = self.bookmarks.get_by_id(id).await?;
        if let Some(Some(folder_id)) = patch.folder_id {
            self.ensure_folder(folder_id).await?;
        }

        let after = self.bookmarks.update(id, patch).await?;

        let added: Vec<String> = after
            .tags
            .iter()
            .filter(|t| !before.tags.contains(t))
            .cloned()
            .collect();
        if let Err(e) = self.attach_tags(&added).await {
            if let Err(undo) = self.bookmarks.update(id, BookmarkPatch::restoring(&before)).await {
                warn!(id, error = %undo, "could not restore bookmark");
            }
            return Err(e);
        }

        if before.folder_id != after.folder_id {
            self.refresh_after_write(before.folder_id).await;
            self.refresh_after_write(after.folder_id).await;
        }
        Ok(after)
    }

    pub async fn remove_bookmark(&self, id: i64) -> StoreResult<()> {
        let before = self.bookmarks.get_by_id(id).await?;
        self.bookmarks.delete(id).await?;
        self.refresh_after_write(before.folder_id).await;
        Ok(())
    }

    /// The "open" action. `None` if the bookmark is already gone.
    pub async fn open_bookmark(&self, id: i64) -> StoreResult<Option<Bookmark>> {
        self.bookmarks.increment_access(id).await
    }

    pub async fn recent_bookmarks(&self) -> StoreResult<Vec<Bookmark>> {
        self.bookmarks.get_recent(self.settings.recent_limit).await
    }

    pub async fn popular_bookmarks(&self) -> StoreResult<Vec<Bookmark>> {
        self.bookmarks.get_popular(self.settings.popular_limit).await
    }

    pub async fn popular_tags(&self) -> StoreResult<Vec<Tag>> {
        self.tags.get_popular(self.settings.popular_tags_limit).await
    }

    /// Bulk-deletes `ids` and re-counts folders. Returns how many were removed.
    pub async fn delete_bookmarks(&self, ids: &[i64]) -> StoreResult<usize> {
        let deleted = self.bookmarks.bulk_delete(ids).await?;
        if deleted > 0 {
            if let Err(e) = self.recompute_bookmark_counts().await {
                warn!(deleted, error = %e, "folder bookmark counts left stale");
            }
        }
        Ok(deleted)
    }

    /// Toggles `id` in the selection. Returns whether it is now selected.
    pub fn toggle_selection(&mut self, id: i64) -> bool {
        self.selection.toggle(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Deletes every selected bookmark and leaves selection mode.
    pub async fn delete_selected(&mut self) -> StoreResult<usize> {
        if self.selection.is_empty() {
            return Ok(0);
        }
        let ids = self.selection.ids().to_vec();
        let deleted = self.delete_bookmarks(&ids).await?;
        self.selection.clear();
        info!(requested = ids.len(), deleted, "deleted selected bookmarks");
        Ok(deleted)
    }

    /// Removes a folder that has no subfolders and moves its bookmarks to the
    /// root level. Returns how many bookmarks were moved.
    ///
    /// Bookmarks are moved before the folder goes; if either step fails the
    /// moved bookmarks are filed back and the folder stays.
    pub async fn remove_folder(&self, id: i64) -> StoreResult<usize> {
        self.folders.get_by_id(id).await?;
        let children = self.folders.get_subfolders(id).await?.len();
        if children > 0 {
            return Err(StoreError::HasChildren {
                folder_id: id,
                children,
            });
        }

        let orphans = self.bookmarks.get_by_folder(Some(id)).await?;
        let mut moved = Vec::with_capacity(orphans.len());
        for bookmark in &orphans {
            if let Err(e) = self.bookmarks.update(bookmark.id, BookmarkPatch::move_to(None)).await {
                self.refile(&moved, id).await;
                return Err(e);
            }
            moved.push(bookmark.id);
        }

        if let Err(e) = self.folders.delete(id).await {
            self.refile(&moved, id).await;
            return Err(e);
        }
        debug!(id, moved = moved.len(), "moved bookmarks out of deleted folder");
        Ok(moved.len())
    }

    /// Puts `ids` back into `folder_id` after an aborted folder removal.
    async fn refile(&self, ids: &[i64], folder_id: i64) {
        for &bookmark_id in ids {
            if let Err(e) = self
                .bookmarks
                .update(bookmark_id, BookmarkPatch::move_to(Some(folder_id)))
                .await
            {
                warn!(bookmark_id, folder_id, error = %e, "could not refile bookmark");
            }
        }
    }

    /// Rebuilds every folder's cached count from the bookmarks. Returns how
    /// many folders had drifted.
    pub async fn recompute_bookmark_counts(&self) -> StoreResult<usize> {
        let all = self.bookmarks.get_all().await?;
        self.folders.recompute_all(&all).await
    }

    pub async fn folder_tree(&self, root: Option<i64>) -> StoreResult<Vec<TreeEntry>> {
        self.folders.tree(root).await
    }
}
