//! Unit tests for the markshelf database layer (connection + migrations).

use markshelf::database::migrations::{get_schema_version, run_all, CURRENT_SCHEMA_VERSION};
use markshelf::database::Database;
use tempfile::TempDir;

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_all_tables() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    for table in &["bookmarks", "folders", "tags", "schema_version"] {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "Table '{}' should exist after migrations", table);
    }
}

#[test]
fn test_migrations_create_indexes() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    for index in &["idx_bookmarks_folder", "idx_folders_parent", "idx_tags_name"] {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='index' AND name=?1",
                [index],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "Index '{}' should exist after migrations", index);
    }
}

#[test]
fn test_schema_version_is_current() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(get_schema_version(db.connection()).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_schema_version_errors_without_version_table() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    assert!(get_schema_version(&conn).is_err());
}

#[test]
fn test_open_shared_migrates_file() {
    let tmp = TempDir::new().unwrap();
    let shared = Database::open_shared(tmp.path().join("shared.db")).unwrap();

    let db = shared.lock().unwrap();
    assert_eq!(get_schema_version(db.connection()).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::open_in_memory().unwrap();
    run_all(db.connection()).expect("second run should be a no-op");
    run_all(db.connection()).expect("third run should be a no-op");

    let rows: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, CURRENT_SCHEMA_VERSION as i64);
}

#[test]
fn test_reopening_file_keeps_data() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("library.db");

    {
        let db = Database::open(&path).unwrap();
        db.connection()
            .execute(
                "INSERT INTO tags (name, color, usage_count) VALUES ('rust', '#000000', 1)",
                [],
            )
            .unwrap();
    }

    let db = Database::open(&path).unwrap();
    let name: String = db
        .connection()
        .query_row("SELECT name FROM tags", [], |row| row.get(0))
        .unwrap();
    assert_eq!(name, "rust");
}

#[test]
fn test_tag_names_are_unique() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();
    conn.execute(
        "INSERT INTO tags (name, color, usage_count) VALUES ('dev', '#000000', 1)",
        [],
    )
    .unwrap();
    let dup = conn.execute(
        "INSERT INTO tags (name, color, usage_count) VALUES ('dev', '#ffffff', 1)",
        [],
    );
    assert!(dup.is_err(), "duplicate tag names must be rejected");
}
