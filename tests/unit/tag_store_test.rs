//! Unit tests for the TagStore public API.

use std::sync::Arc;

use markshelf::managers::tag_store::{TagStore, TagStoreTrait};
use markshelf::repository::MemoryRepository;
use markshelf::types::errors::StoreError;
use markshelf::types::tag::{TagDraft, DEFAULT_TAG_COLOR};

fn setup() -> TagStore {
    TagStore::new(Arc::new(MemoryRepository::new()))
}

/// Creating "Tech" then "tech" yields one record, and the second create does
/// not count as a use.
#[tokio::test]
async fn test_create_is_idempotent_by_name() {
    let store = setup();
    let first = store.create(TagDraft::named("Tech")).await.unwrap();
    let second = store.create(TagDraft::named("tech")).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.name, "tech");
    assert_eq!(second.usage_count, 1);
    assert_eq!(store.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_keeps_existing_color() {
    let store = setup();
    let original = store
        .create(TagDraft {
            name: "work".to_string(),
            color: Some("#123456".to_string()),
        })
        .await
        .unwrap();
    let again = store
        .create(TagDraft {
            name: " WORK ".to_string(),
            color: Some("#abcdef".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(again, original);
}

#[tokio::test]
async fn test_create_defaults_color() {
    let store = setup();
    let tag = store.create(TagDraft::named("misc")).await.unwrap();
    assert_eq!(tag.color, DEFAULT_TAG_COLOR);
}

#[tokio::test]
async fn test_create_blank_name_is_validation() {
    let store = setup();
    assert!(matches!(
        store.create(TagDraft::named("   ")).await,
        Err(StoreError::Validation(_))
    ));
}

#[tokio::test]
async fn test_increment_usage_is_case_insensitive() {
    let store = setup();
    store.create(TagDraft::named("rust")).await.unwrap();

    let bumped = store.increment_usage("RUST").await.unwrap().unwrap();
    assert_eq!(bumped.usage_count, 2);
    let bumped = store.increment_usage(" Rust ").await.unwrap().unwrap();
    assert_eq!(bumped.usage_count, 3);
}

#[tokio::test]
async fn test_increment_usage_missing_is_none() {
    let store = setup();
    assert!(store.increment_usage("ghost").await.unwrap().is_none());
    assert!(store.increment_usage("").await.unwrap().is_none());
    assert!(store.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_all_sorted_by_name() {
    let store = setup();
    for name in ["zeta", "alpha", "mid"] {
        store.create(TagDraft::named(name)).await.unwrap();
    }
    let names: Vec<String> = store
        .get_all()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
}

#[tokio::test]
async fn test_get_popular_orders_by_usage() {
    let store = setup();
    for name in ["a", "b", "c"] {
        store.create(TagDraft::named(name)).await.unwrap();
    }
    for _ in 0..3 {
        store.increment_usage("c").await.unwrap();
    }
    store.increment_usage("b").await.unwrap();

    let names: Vec<String> = store
        .get_popular(2)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["c", "b"]);
}

#[tokio::test]
async fn test_search_by_substring() {
    let store = setup();
    for name in ["javascript", "java", "rust", "typescript"] {
        store.create(TagDraft::named(name)).await.unwrap();
    }
    let names: Vec<String> = store
        .search("SCRIPT")
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["javascript", "typescript"]);
    assert_eq!(store.search("").await.unwrap().len(), 4);
}
