//! SQLite-backed repository.
//!
//! One table per entity (see `database::migrations`). Timestamps are stored as
//! RFC 3339 text and bookmark tags as a JSON array.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

use super::{Entity, Repository};
use crate::database::{Database, SharedDatabase};
use crate::types::bookmark::Bookmark;
use crate::types::errors::{StoreError, StoreResult};
use crate::types::folder::Folder;
use crate::types::tag::Tag;

/// Row mapping between an entity and its table.
pub trait SqlEntity: Entity {
    const TABLE: &'static str;
    /// Column names excluding `id`, in the order of [`SqlEntity::to_values`].
    const COLUMNS: &'static [&'static str];

    /// Builds the entity from a row selected as `id, COLUMNS...`.
    fn from_row(row: &Row) -> rusqlite::Result<Self>;

    fn to_values(&self) -> StoreResult<Vec<Value>>;
}

fn parse_time(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn count_value(n: u64) -> Value {
    Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
}

fn get_count(row: &Row, idx: usize) -> rusqlite::Result<u64> {
    let n: i64 = row.get(idx)?;
    Ok(n.max(0) as u64)
}

impl SqlEntity for Bookmark {
    const TABLE: &'static str = "bookmarks";
    const COLUMNS: &'static [&'static str] = &[
        "url",
        "title",
        "description",
        "favicon_url",
        "icon",
        "folder_id",
        "tags",
        "created_at",
        "last_accessed_at",
        "access_count",
    ];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let tags_json: String = row.get(7)?;
        let tags = serde_json::from_str(&tags_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;
        Ok(Bookmark {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            favicon_url: row.get(4)?,
            icon: row.get(5)?,
            folder_id: row.get(6)?,
            tags,
            created_at: parse_time(row, 8)?,
            last_accessed_at: parse_time(row, 9)?,
            access_count: get_count(row, 10)?,
        })
    }

    fn to_values(&self) -> StoreResult<Vec<Value>> {
        Ok(vec![
            Value::Text(self.url.clone()),
            Value::Text(self.title.clone()),
            Value::Text(self.description.clone()),
            Value::Text(self.favicon_url.clone()),
            Value::Text(self.icon.clone()),
            self.folder_id.map_or(Value::Null, Value::Integer),
            Value::Text(serde_json::to_string(&self.tags)?),
            Value::Text(self.created_at.to_rfc3339()),
            Value::Text(self.last_accessed_at.to_rfc3339()),
            count_value(self.access_count),
        ])
    }
}

impl SqlEntity for Folder {
    const TABLE: &'static str = "folders";
    const COLUMNS: &'static [&'static str] =
        &["name", "parent_id", "color", "created_at", "bookmark_count"];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Folder {
            id: row.get(0)?,
            name: row.get(1)?,
            parent_id: row.get(2)?,
            color: row.get(3)?,
            created_at: parse_time(row, 4)?,
            bookmark_count: get_count(row, 5)?,
        })
    }

    fn to_values(&self) -> StoreResult<Vec<Value>> {
        Ok(vec![
            Value::Text(self.name.clone()),
            self.parent_id.map_or(Value::Null, Value::Integer),
            Value::Text(self.color.clone()),
            Value::Text(self.created_at.to_rfc3339()),
            count_value(self.bookmark_count),
        ])
    }
}

impl SqlEntity for Tag {
    const TABLE: &'static str = "tags";
    const COLUMNS: &'static [&'static str] = &["name", "color", "usage_count"];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
            color: row.get(2)?,
            usage_count: get_count(row, 3)?,
        })
    }

    fn to_values(&self) -> StoreResult<Vec<Value>> {
        Ok(vec![
            Value::Text(self.name.clone()),
            Value::Text(self.color.clone()),
            count_value(self.usage_count),
        ])
    }
}

/// Repository storing one entity type in a shared SQLite database.
///
/// Several repositories (one per entity) can share the same `Database`.
pub struct SqliteRepository<T> {
    db: SharedDatabase,
    _entity: PhantomData<fn() -> T>,
}

impl<T: SqlEntity> SqliteRepository<T> {
    pub fn new(db: SharedDatabase) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    fn select_sql() -> String {
        format!("SELECT id, {} FROM {}", T::COLUMNS.join(", "), T::TABLE)
    }

    fn with_db<R>(&self, f: impl FnOnce(&Database) -> StoreResult<R>) -> StoreResult<R> {
        let db = self
            .db
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("database lock poisoned: {}", e)))?;
        f(&db)
    }
}

#[async_trait]
impl<T: SqlEntity> Repository<T> for SqliteRepository<T> {
    async fn list(&self) -> StoreResult<Vec<T>> {
        self.with_db(|db| {
            let sql = format!("{} ORDER BY id", Self::select_sql());
            let mut stmt = db.connection().prepare(&sql)?;
            let rows = stmt.query_map([], T::from_row)?;
            let mut results = Vec::new();
            for row in rows {
                results.push(row?);
            }
            Ok(results)
        })
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<T>> {
        self.with_db(|db| {
            let sql = format!("{} WHERE id = ?1", Self::select_sql());
            let found = db
                .connection()
                .query_row(&sql, params![id], T::from_row)
                .optional()?;
            Ok(found)
        })
    }

    async fn insert(&self, mut entity: T) -> StoreResult<T> {
        let values = entity.to_values()?;
        self.with_db(|db| {
            let placeholders: Vec<String> =
                (1..=T::COLUMNS.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                T::TABLE,
                T::COLUMNS.join(", "),
                placeholders.join(", ")
            );
            let conn = db.connection();
            conn.execute(&sql, params_from_iter(values))?;
            entity.set_id(conn.last_insert_rowid());
            Ok(entity)
        })
    }

    async fn update(&self, entity: &T) -> StoreResult<bool> {
        let mut values = entity.to_values()?;
        values.push(Value::Integer(entity.id()));
        self.with_db(|db| {
            let assignments: Vec<String> = T::COLUMNS
                .iter()
                .enumerate()
                .map(|(i, col)| format!("{} = ?{}", col, i + 1))
                .collect();
            let sql = format!(
                "UPDATE {} SET {} WHERE id = ?{}",
                T::TABLE,
                assignments.join(", "),
                T::COLUMNS.len() + 1
            );
            let affected = db.connection().execute(&sql, params_from_iter(values))?;
            Ok(affected > 0)
        })
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        self.with_db(|db| {
            let sql = format!("DELETE FROM {} WHERE id = ?1", T::TABLE);
            let affected = db.connection().execute(&sql, params![id])?;
            Ok(affected > 0)
        })
    }
}
