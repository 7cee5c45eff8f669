//! Folder forest traversal.
//!
//! Pure functions over a flat folder list. [`FolderIndex`] builds the
//! `parent -> children` adjacency once; every query then walks that map
//! instead of rescanning the list per level.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::types::folder::Folder;

/// One row of a flattened tree: the folder and its depth below the root of
/// the walk (direct children of the walk's root are at depth 0).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeEntry {
    pub folder: Folder,
    pub depth: usize,
}

/// Outcome of walking a folder's ancestor chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AncestorWalk {
    /// Ids from the parent upward, ending at a root (or at a dangling parent
    /// reference).
    Chain(Vec<i64>),
    /// The chain revisited a folder: the stored data already holds a cycle.
    Cyclic,
}

/// Id-keyed view of a folder list with a prebuilt adjacency map.
pub struct FolderIndex<'a> {
    by_id: HashMap<i64, &'a Folder>,
    children: HashMap<Option<i64>, Vec<&'a Folder>>,
}

impl<'a> FolderIndex<'a> {
    /// Children are kept in creation order (ascending id).
    pub fn new(folders: &'a [Folder]) -> Self {
        let mut ordered: Vec<&Folder> = folders.iter().collect();
        ordered.sort_by_key(|f| f.id);

        let mut by_id = HashMap::with_capacity(ordered.len());
        let mut children: HashMap<Option<i64>, Vec<&Folder>> = HashMap::new();
        for folder in ordered {
            by_id.insert(folder.id, folder);
            children.entry(folder.parent_id).or_default().push(folder);
        }
        Self { by_id, children }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&'a Folder> {
        self.by_id.get(&id).copied()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Direct children of `parent` (`None` = root folders).
    pub fn children_of(&self, parent: Option<i64>) -> &[&'a Folder] {
        self.children.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Walks `parent_id` links upward from `id`. Terminates within
    /// `len()` steps even on corrupted data.
    pub fn ancestors(&self, id: i64) -> AncestorWalk {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.get(id).and_then(|f| f.parent_id);

        while let Some(parent) = current {
            if !seen.insert(parent) || chain.len() > self.len() {
                return AncestorWalk::Cyclic;
            }
            chain.push(parent);
            current = self.get(parent).and_then(|f| f.parent_id);
        }
        AncestorWalk::Chain(chain)
    }

    /// True if making `new_parent` the parent of `folder_id` would close a
    /// loop: the new parent is the folder itself or one of its descendants.
    pub fn would_create_cycle(&self, folder_id: i64, new_parent: i64) -> bool {
        if folder_id == new_parent {
            return true;
        }
        match self.ancestors(new_parent) {
            AncestorWalk::Chain(chain) => chain.contains(&folder_id),
            AncestorWalk::Cyclic => true,
        }
    }

    /// Pre-order depth-first walk below `root` (`None` = every root folder),
    /// siblings in creation order.
    pub fn walk(&self, root: Option<i64>) -> Vec<TreeEntry> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        if let Some(id) = root {
            visited.insert(id);
        }

        // Reverse push so the first sibling is popped first.
        let mut stack: Vec<(&Folder, usize)> = self
            .children_of(root)
            .iter()
            .rev()
            .map(|f| (*f, 0))
            .collect();

        while let Some((folder, depth)) = stack.pop() {
            if !visited.insert(folder.id) {
                continue;
            }
            out.push(TreeEntry {
                folder: folder.clone(),
                depth,
            });
            for child in self.children_of(Some(folder.id)).iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        out
    }
}

/// Flattens `folders` into `(folder, depth)` rows in pre-order below `root`.
pub fn flatten(folders: &[Folder], root: Option<i64>) -> Vec<TreeEntry> {
    FolderIndex::new(folders).walk(root)
}
