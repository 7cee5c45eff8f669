//! The markshelf library file.
//!
//! [`Database`] owns the single `rusqlite::Connection` behind every
//! [`crate::repository::SqliteRepository`]. Opening it brings the schema up
//! to [`migrations::CURRENT_SCHEMA_VERSION`].

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::Connection;

use super::migrations;

/// How long a write waits on a lock held by another process before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// One database handle shared by the bookmark, folder and tag repositories.
pub type SharedDatabase = Arc<Mutex<Database>>;

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the library file at `path` and migrates it.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the file cannot be opened or a migration fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Self::migrated(conn)
    }

    /// A throwaway library that lives until the `Database` is dropped.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::migrated(Connection::open_in_memory()?)
    }

    /// Like [`Database::open`], wrapped for sharing between repositories.
    pub fn open_shared<P: AsRef<Path>>(path: P) -> Result<SharedDatabase, rusqlite::Error> {
        Ok(Arc::new(Mutex::new(Self::open(path)?)))
    }

    fn migrated(conn: Connection) -> Result<Self, rusqlite::Error> {
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
