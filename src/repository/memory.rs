//! In-memory repository.
//!
//! Records live in an id-keyed arena. Ids come from a high-water mark, so an
//! id is never handed out twice even after its record is deleted.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Entity, Repository};
use crate::types::errors::{StoreError, StoreResult};

struct Arena<T> {
    records: BTreeMap<i64, T>,
    high_water: i64,
}

/// Repository backed by process memory.
pub struct MemoryRepository<T> {
    arena: Mutex<Arena<T>>,
}

impl<T: Entity> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            arena: Mutex::new(Arena {
                records: BTreeMap::new(),
                high_water: 0,
            }),
        }
    }

    /// Creates a repository pre-populated with `records`, keeping their ids.
    pub fn seeded(records: Vec<T>) -> Self {
        let high_water = records.iter().map(|r| r.id()).max().unwrap_or(0).max(0);
        let records = records.into_iter().map(|r| (r.id(), r)).collect();
        Self {
            arena: Mutex::new(Arena {
                records,
                high_water,
            }),
        }
    }

    fn with_arena<R>(&self, f: impl FnOnce(&mut Arena<T>) -> R) -> StoreResult<R> {
        let mut arena = self
            .arena
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("memory store poisoned: {}", e)))?;
        Ok(f(&mut arena))
    }
}

impl<T: Entity> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    async fn list(&self) -> StoreResult<Vec<T>> {
        self.with_arena(|a| a.records.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<T>> {
        self.with_arena(|a| a.records.get(&id).cloned())
    }

    async fn insert(&self, mut entity: T) -> StoreResult<T> {
        self.with_arena(|a| {
            a.high_water += 1;
            entity.set_id(a.high_water);
            a.records.insert(a.high_water, entity.clone());
            entity
        })
    }

    async fn update(&self, entity: &T) -> StoreResult<bool> {
        self.with_arena(|a| match a.records.get_mut(&entity.id()) {
            Some(slot) => {
                *slot = entity.clone();
                true
            }
            None => false,
        })
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        self.with_arena(|a| a.records.remove(&id).is_some())
    }
}
