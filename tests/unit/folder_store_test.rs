//! Unit tests for the FolderStore public API.
//!
//! Covers forest queries, cycle-safe reparenting, the delete-with-children
//! guard and cached bookmark counts.

use std::sync::Arc;

use chrono::Utc;
use rstest::rstest;

use markshelf::managers::folder_store::{FolderStore, FolderStoreTrait};
use markshelf::repository::MemoryRepository;
use markshelf::types::bookmark::Bookmark;
use markshelf::types::errors::StoreError;
use markshelf::types::folder::{Folder, FolderDraft, FolderPatch, DEFAULT_FOLDER_COLOR};

fn setup() -> FolderStore {
    FolderStore::new(Arc::new(MemoryRepository::new()))
}

/// Helper: root -> mid -> leaf chain. Returns `(store, root, mid, leaf)` ids.
async fn chain() -> (FolderStore, i64, i64, i64) {
    let store = setup();
    let root = store.create(FolderDraft::root("Root")).await.unwrap();
    let mid = store.create(FolderDraft::child_of("Mid", root.id)).await.unwrap();
    let leaf = store.create(FolderDraft::child_of("Leaf", mid.id)).await.unwrap();
    (store, root.id, mid.id, leaf.id)
}

fn bookmark_in(id: i64, folder_id: Option<i64>) -> Bookmark {
    let now = Utc::now();
    Bookmark {
        id,
        url: format!("https://b{}.example", id),
        title: format!("B{}", id),
        description: String::new(),
        favicon_url: String::new(),
        icon: String::new(),
        folder_id,
        tags: Vec::new(),
        created_at: now,
        last_accessed_at: now,
        access_count: 0,
    }
}

/// The full lifecycle: nest, reject a cycle, guard delete, then unwind.
#[tokio::test]
async fn test_folder_lifecycle_scenario() {
    let store = setup();
    let a = store.create(FolderDraft::root("A")).await.unwrap();
    let b = store.create(FolderDraft::child_of("B", a.id)).await.unwrap();

    let subs = store.get_subfolders(a.id).await.unwrap();
    assert_eq!(subs, vec![b.clone()]);

    let err = store
        .update(a.id, FolderPatch::reparent(Some(b.id)))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Cycle { folder_id, parent_id } if folder_id == a.id && parent_id == b.id));
    assert_eq!(store.get_by_id(a.id).await.unwrap().parent_id, None);

    let err = store.delete(a.id).await.unwrap_err();
    assert!(matches!(err, StoreError::HasChildren { children: 1, .. }));

    store.delete(b.id).await.unwrap();
    store.delete(a.id).await.unwrap();
    assert!(store.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_defaults_color_and_count() {
    let store = setup();
    let f = store.create(FolderDraft::root("Work")).await.unwrap();
    assert_eq!(f.id, 1);
    assert_eq!(f.color, DEFAULT_FOLDER_COLOR);
    assert_eq!(f.bookmark_count, 0);
    assert!(f.is_root());
}

#[tokio::test]
async fn test_create_custom_default_color() {
    let store = FolderStore::with_default_color(Arc::new(MemoryRepository::new()), "#ff0000");
    let f = store.create(FolderDraft::root("Red")).await.unwrap();
    assert_eq!(f.color, "#ff0000");
}

#[tokio::test]
async fn test_create_rejects_blank_name_and_missing_parent() {
    let store = setup();
    assert!(matches!(
        store.create(FolderDraft::root("  ")).await,
        Err(StoreError::Validation(_))
    ));
    assert!(matches!(
        store.create(FolderDraft::child_of("Orphan", 42)).await,
        Err(StoreError::Validation(_))
    ));
    assert!(store.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_roots_and_subfolders() {
    let (store, root, mid, leaf) = chain().await;
    let other = store.create(FolderDraft::root("Other")).await.unwrap();

    let roots: Vec<i64> = store
        .get_root_folders()
        .await
        .unwrap()
        .iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(roots, vec![root, other.id]);

    let subs: Vec<i64> = store
        .get_subfolders(root)
        .await
        .unwrap()
        .iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(subs, vec![mid], "only direct children are returned");
    assert!(store.get_subfolders(leaf).await.unwrap().is_empty());
}

#[rstest]
#[case::onto_itself(0)]
#[case::onto_child(1)]
#[case::onto_grandchild(2)]
#[tokio::test]
async fn test_reparent_onto_own_subtree_is_cycle(#[case] target: usize) {
    let (store, root, mid, leaf) = chain().await;
    let ids = [root, mid, leaf];

    let err = store
        .update(root, FolderPatch::reparent(Some(ids[target])))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Cycle { .. }));

    assert_eq!(store.get_by_id(root).await.unwrap().parent_id, None);
    assert_eq!(store.get_by_id(mid).await.unwrap().parent_id, Some(root));
    assert_eq!(store.get_by_id(leaf).await.unwrap().parent_id, Some(mid));
}

#[tokio::test]
async fn test_cycle_rejection_leaves_other_fields_untouched() {
    let (store, root, _mid, leaf) = chain().await;
    let patch = FolderPatch {
        name: Some("Renamed".to_string()),
        parent_id: Some(Some(leaf)),
        color: None,
    };
    assert!(store.update(root, patch).await.is_err());
    assert_eq!(store.get_by_id(root).await.unwrap().name, "Root");
}

#[tokio::test]
async fn test_valid_reparent_and_unparent() {
    let (store, root, mid, leaf) = chain().await;

    let moved = store
        .update(leaf, FolderPatch::reparent(Some(root)))
        .await
        .unwrap();
    assert_eq!(moved.parent_id, Some(root));

    let promoted = store.update(mid, FolderPatch::reparent(None)).await.unwrap();
    assert!(promoted.is_root());
}

#[tokio::test]
async fn test_reparent_to_missing_folder_is_validation() {
    let (store, root, _, _) = chain().await;
    let err = store
        .update(root, FolderPatch::reparent(Some(77)))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn test_rename_keeps_parent() {
    let (store, root, mid, _) = chain().await;
    let renamed = store.update(mid, FolderPatch::rename("Middle")).await.unwrap();
    assert_eq!(renamed.name, "Middle");
    assert_eq!(renamed.parent_id, Some(root));
}

#[tokio::test]
async fn test_update_and_delete_missing_are_not_found() {
    let store = setup();
    assert!(matches!(
        store.update(5, FolderPatch::rename("x")).await,
        Err(StoreError::NotFound { id: 5, .. })
    ));
    assert!(matches!(
        store.delete(5).await,
        Err(StoreError::NotFound { id: 5, .. })
    ));
}

#[tokio::test]
async fn test_delete_leaf_removes_exactly_that_folder() {
    let (store, root, mid, leaf) = chain().await;
    store.delete(leaf).await.unwrap();

    let ids: Vec<i64> = store.get_all().await.unwrap().iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![root, mid]);
}

#[tokio::test]
async fn test_update_bookmark_count_is_a_plain_setter() {
    let (store, root, _, _) = chain().await;
    let f = store.update_bookmark_count(root, 12).await.unwrap();
    assert_eq!(f.bookmark_count, 12);
    assert_eq!(store.get_by_id(root).await.unwrap().bookmark_count, 12);
    assert!(matches!(
        store.update_bookmark_count(404, 1).await,
        Err(StoreError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_recompute_all_corrects_drift() {
    let (store, root, mid, leaf) = chain().await;
    store.update_bookmark_count(leaf, 9).await.unwrap();

    let bookmarks = vec![
        bookmark_in(1, Some(root)),
        bookmark_in(2, Some(root)),
        bookmark_in(3, Some(mid)),
        bookmark_in(4, None),
    ];
    let corrected = store.recompute_all(&bookmarks).await.unwrap();
    assert_eq!(corrected, 3);

    assert_eq!(store.get_by_id(root).await.unwrap().bookmark_count, 2);
    assert_eq!(store.get_by_id(mid).await.unwrap().bookmark_count, 1);
    assert_eq!(store.get_by_id(leaf).await.unwrap().bookmark_count, 0);

    assert_eq!(store.recompute_all(&bookmarks).await.unwrap(), 0);
}

#[tokio::test]
async fn test_ancestors_walk_up_to_root() {
    let (store, root, mid, leaf) = chain().await;
    let ids: Vec<i64> = store
        .ancestors(leaf)
        .await
        .unwrap()
        .iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(ids, vec![mid, root]);
    assert!(store.ancestors(root).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ancestors_on_corrupt_data_is_unavailable() {
    let now = Utc::now();
    let looped = |id: i64, parent: i64| Folder {
        id,
        name: format!("F{}", id),
        parent_id: Some(parent),
        color: DEFAULT_FOLDER_COLOR.to_string(),
        created_at: now,
        bookmark_count: 0,
    };
    let store = FolderStore::new(Arc::new(MemoryRepository::seeded(vec![
        looped(1, 2),
        looped(2, 1),
    ])));
    assert!(matches!(
        store.ancestors(1).await,
        Err(StoreError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_tree_is_preorder_with_depths() {
    let store = setup();
    let a = store.create(FolderDraft::root("A")).await.unwrap();
    let b = store.create(FolderDraft::root("B")).await.unwrap();
    let a1 = store.create(FolderDraft::child_of("A1", a.id)).await.unwrap();
    let a2 = store.create(FolderDraft::child_of("A2", a.id)).await.unwrap();
    let a1x = store.create(FolderDraft::child_of("A1x", a1.id)).await.unwrap();

    let rows: Vec<(i64, usize)> = store
        .tree(None)
        .await
        .unwrap()
        .iter()
        .map(|e| (e.folder.id, e.depth))
        .collect();
    assert_eq!(
        rows,
        vec![(a.id, 0), (a1.id, 1), (a1x.id, 2), (a2.id, 1), (b.id, 0)]
    );

    let sub: Vec<(i64, usize)> = store
        .tree(Some(a.id))
        .await
        .unwrap()
        .iter()
        .map(|e| (e.folder.id, e.depth))
        .collect();
    assert_eq!(sub, vec![(a1.id, 0), (a1x.id, 1), (a2.id, 0)]);
}
