//! Folder Store for markshelf.
//!
//! Owns folder records organized as a forest. Every reparent runs cycle
//! detection against a fresh [`FolderIndex`], and a folder with subfolders
//! cannot be deleted. Bookmarks are never touched from here.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::repository::{Entity, Repository};
use crate::services::folder_tree::{flatten, AncestorWalk, FolderIndex, TreeEntry};
use crate::types::bookmark::Bookmark;
use crate::types::errors::{StoreError, StoreResult};
use crate::types::folder::{Folder, FolderDraft, FolderPatch, DEFAULT_FOLDER_COLOR};

pub struct FolderStore {
    repo: Arc<dyn Repository<Folder>>,
    write_lock: Mutex<()>,
    default_color: String,
}

impl FolderStore {
    pub fn new(repo: Arc<dyn Repository<Folder>>) -> Self {
        Self::with_default_color(repo, DEFAULT_FOLDER_COLOR)
    }

    pub fn with_default_color(repo: Arc<dyn Repository<Folder>>, color: &str) -> Self {
        Self {
            repo,
            write_lock: Mutex::new(()),
            default_color: color.to_string(),
        }
    }

    fn validated_name(name: &str) -> StoreResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::validation("folder name must not be empty"));
        }
        Ok(name.to_string())
    }

    fn color_or_default(&self, color: Option<String>) -> String {
        color
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| self.default_color.clone())
    }
}

/// Folder operations, including the tree queries.
#[async_trait]
pub trait FolderStoreTrait: Send + Sync {
    async fn get_all(&self) -> StoreResult<Vec<Folder>>;
    async fn get_by_id(&self, id: i64) -> StoreResult<Folder>;
    async fn get_root_folders(&self) -> StoreResult<Vec<Folder>>;
    async fn get_subfolders(&self, parent_id: i64) -> StoreResult<Vec<Folder>>;
    async fn create(&self, draft: FolderDraft) -> StoreResult<Folder>;
    async fn update(&self, id: i64, patch: FolderPatch) -> StoreResult<Folder>;
    async fn delete(&self, id: i64) -> StoreResult<()>;
    async fn update_bookmark_count(&self, id: i64, count: u64) -> StoreResult<Folder>;
    async fn recompute_all(&self, bookmarks: &[Bookmark]) -> StoreResult<usize>;
    async fn ancestors(&self, id: i64) -> StoreResult<Vec<Folder>>;
    async fn tree(&self, root: Option<i64>) -> StoreResult<Vec<TreeEntry>>;
}

#[async_trait]
impl FolderStoreTrait for FolderStore {
    /// All folders in creation order.
    async fn get_all(&self) -> StoreResult<Vec<Folder>> {
        let mut all = self.repo.list().await?;
        all.sort_by_key(|f| f.id);
        Ok(all)
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<Folder> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::not_found(Folder::NAME, id))
    }

    async fn get_root_folders(&self) -> StoreResult<Vec<Folder>> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter(Folder::is_root)
            .collect())
    }

    /// Direct children of `parent_id`, one level only.
    async fn get_subfolders(&self, parent_id: i64) -> StoreResult<Vec<Folder>> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter(|f| f.parent_id == Some(parent_id))
            .collect())
    }

    async fn create(&self, draft: FolderDraft) -> StoreResult<Folder> {
        let name = Self::validated_name(&draft.name)?;
        let color = self.color_or_default(draft.color);

        let _guard = self.write_lock.lock().await;
        if let Some(parent_id) = draft.parent_id {
            if self.repo.find_by_id(parent_id).await?.is_none() {
                return Err(StoreError::validation(format!(
                    "parent folder {} does not exist",
                    parent_id
                )));
            }
        }

        let folder = Folder {
            id: 0,
            name,
            parent_id: draft.parent_id,
            color,
            created_at: Utc::now(),
            bookmark_count: 0,
        };
        let created = self.repo.insert(folder).await?;
        info!(id = created.id, parent = ?created.parent_id, "created folder");
        Ok(created)
    }

    /// Applies `patch`. A changed parent is checked against the current forest
    /// first; on `Cycle` nothing is written.
    async fn update(&self, id: i64, patch: FolderPatch) -> StoreResult<Folder> {
        let _guard = self.write_lock.lock().await;
        let all = self.repo.list().await?;
        let index = FolderIndex::new(&all);
        let mut folder = index
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Folder::NAME, id))?;

        if let Some(name) = patch.name {
            folder.name = Self::validated_name(&name)?;
        }
        if let Some(color) = patch.color {
            folder.color = self.color_or_default(Some(color));
        }
        if let Some(new_parent) = patch.parent_id {
            if new_parent != folder.parent_id {
                if let Some(parent_id) = new_parent {
                    if index.would_create_cycle(id, parent_id) {
                        warn!(id, parent_id, "rejected folder move: cycle");
                        return Err(StoreError::Cycle {
                            folder_id: id,
                            parent_id,
                        });
                    }
                    if !index.contains(parent_id) {
                        return Err(StoreError::validation(format!(
                            "parent folder {} does not exist",
                            parent_id
                        )));
                    }
                }
                folder.parent_id = new_parent;
            }
        }

        if !self.repo.update(&folder).await? {
            return Err(StoreError::not_found(Folder::NAME, id));
        }
        info!(id, parent = ?folder.parent_id, "updated folder");
        Ok(folder)
    }

    /// Deletes a folder that has no subfolders. Bookmarks still pointing at it
    /// are left alone.
    async fn delete(&self, id: i64) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let all = self.repo.list().await?;
        if !all.iter().any(|f| f.id == id) {
            return Err(StoreError::not_found(Folder::NAME, id));
        }
        let children = all.iter().filter(|f| f.parent_id == Some(id)).count();
        if children > 0 {
            warn!(id, children, "rejected folder delete: has subfolders");
            return Err(StoreError::HasChildren {
                folder_id: id,
                children,
            });
        }
        if !self.repo.delete(id).await? {
            return Err(StoreError::not_found(Folder::NAME, id));
        }
        info!(id, "deleted folder");
        Ok(())
    }

    /// Overwrites the cached bookmark count. No recomputation happens here.
    async fn update_bookmark_count(&self, id: i64, count: u64) -> StoreResult<Folder> {
        let _guard = self.write_lock.lock().await;
        let mut folder = self.get_by_id(id).await?;
        folder.bookmark_count = count;
        if !self.repo.update(&folder).await? {
            return Err(StoreError::not_found(Folder::NAME, id));
        }
        debug!(id, count, "set folder bookmark count");
        Ok(folder)
    }

    /// Resets every folder's `bookmark_count` from `bookmarks`, correcting any
    /// drift. Returns the number of folders whose count changed.
    async fn recompute_all(&self, bookmarks: &[Bookmark]) -> StoreResult<usize> {
        let mut counts: HashMap<i64, u64> = HashMap::new();
        for folder_id in bookmarks.iter().filter_map(|b| b.folder_id) {
            *counts.entry(folder_id).or_default() += 1;
        }

        let _guard = self.write_lock.lock().await;
        let mut corrected = 0;
        for mut folder in self.repo.list().await? {
            let actual = counts.get(&folder.id).copied().unwrap_or(0);
            if folder.bookmark_count != actual {
                folder.bookmark_count = actual;
                if self.repo.update(&folder).await? {
                    corrected += 1;
                }
            }
        }
        if corrected > 0 {
            info!(corrected, "recomputed folder bookmark counts");
        }
        Ok(corrected)
    }

    /// Ancestors of `id` from its parent up to the root.
    async fn ancestors(&self, id: i64) -> StoreResult<Vec<Folder>> {
        let all = self.repo.list().await?;
        let index = FolderIndex::new(&all);
        if !index.contains(id) {
            return Err(StoreError::not_found(Folder::NAME, id));
        }
        match index.ancestors(id) {
            AncestorWalk::Chain(chain) => Ok(chain
                .into_iter()
                .filter_map(|a| index.get(a).cloned())
                .collect()),
            AncestorWalk::Cyclic => Err(StoreError::Unavailable(format!(
                "stored folder data holds a cycle through folder {}",
                id
            ))),
        }
    }

    /// Depth-first `(folder, depth)` rows below `root` (`None` = all roots).
    async fn tree(&self, root: Option<i64>) -> StoreResult<Vec<TreeEntry>> {
        let all = self.repo.list().await?;
        Ok(flatten(&all, root))
    }
}
