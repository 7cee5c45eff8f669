//! Storage seam for the markshelf stores.
//!
//! Every store owns an injected `Repository<T>` and never touches storage any
//! other way. Three implementations share identical semantics:
//!
//! - [`MemoryRepository`]: arena keyed by id, for tests and ephemeral sessions
//! - [`SqliteRepository`]: durable local file via `rusqlite`
//! - [`RemoteRepository`]: JSON over HTTP via `reqwest`
//!
//! Repositories only persist records. Validation, defaults, ordering and
//! structural rules (cycles, children) live in the stores.

pub mod memory;
pub mod remote;
pub mod sqlite;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::bookmark::Bookmark;
use crate::types::errors::StoreResult;
use crate::types::folder::Folder;
use crate::types::tag::Tag;

pub use memory::MemoryRepository;
pub use remote::RemoteRepository;
pub use sqlite::SqliteRepository;

/// A record that can be kept in a repository.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Human-readable entity name used in errors and logs.
    const NAME: &'static str;
    /// Collection segment used by the remote backend.
    const COLLECTION: &'static str;

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
}

impl Entity for Bookmark {
    const NAME: &'static str = "Bookmark";
    const COLLECTION: &'static str = "bookmarks";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Entity for Folder {
    const NAME: &'static str = "Folder";
    const COLLECTION: &'static str = "folders";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Entity for Tag {
    const NAME: &'static str = "Tag";
    const COLLECTION: &'static str = "tags";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

/// CRUD access to one collection of records.
///
/// Records cross this boundary by value, so callers never hold references
/// into backend state.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// All records in ascending id order.
    async fn list(&self) -> StoreResult<Vec<T>>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<T>>;

    /// Persists a new record. The id on `entity` is ignored; a fresh id that
    /// was never issued before is assigned and returned with the record.
    async fn insert(&self, entity: T) -> StoreResult<T>;

    /// Replaces the stored record with the same id. Returns `false` if absent.
    async fn update(&self, entity: &T) -> StoreResult<bool>;

    /// Removes the record. Returns `false` if absent.
    async fn delete(&self, id: i64) -> StoreResult<bool>;
}
