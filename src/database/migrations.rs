//! Schema migrations for the markshelf SQLite database.
//!
//! Uses a `schema_version` table to track which migrations have been applied.
//! Each migration runs exactly once and is recorded with a timestamp.

use rusqlite::Connection;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Highest applied migration, 0 on a fresh file.
///
/// # Errors
/// Fails if `schema_version` is missing or unreadable.
pub fn get_schema_version(conn: &Connection) -> Result<i32, rusqlite::Error> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
}

/// Runs all pending schema migrations against the provided connection.
///
/// Safe to call on every startup.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at TEXT NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn)?;

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Initial schema: bookmarks, folders, tags")?;
    }

    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "Lookup indexes for folder listing and tag names")?;
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now, description],
    )?;
    Ok(())
}

/// V1: core tables.
///
/// AUTOINCREMENT keeps ids from being reused after deletion. Folder
/// references carry no foreign keys; `Library` reconciles dangling ones.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS folders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            parent_id INTEGER,
            color TEXT NOT NULL,
            created_at TEXT NOT NULL,
            bookmark_count INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS bookmarks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            favicon_url TEXT NOT NULL,
            icon TEXT NOT NULL DEFAULT '',
            folder_id INTEGER,
            tags TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            last_accessed_at TEXT NOT NULL,
            access_count INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            usage_count INTEGER NOT NULL DEFAULT 1
        );
        ",
    )
}

/// V2: indexes for the hot lookups.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_bookmarks_folder ON bookmarks(folder_id);
        CREATE INDEX IF NOT EXISTS idx_folders_parent ON folders(parent_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_tags_name ON tags(name);
        ",
    )
}
