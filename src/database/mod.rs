//! markshelf database layer.
//!
//! Provides SQLite connection management and schema migrations used by
//! [`crate::repository::SqliteRepository`].
//!
//! # Usage
//!
//! ```no_run
//! use markshelf::database::Database;
//!
//! // Open a persistent database
//! let db = Database::open("markshelf.db").expect("failed to open database");
//!
//! // Or use an in-memory database for testing
//! let db = Database::open_in_memory().expect("failed to open in-memory database");
//!
//! let conn = db.connection();
//!
//! // One handle for all three repositories
//! let shared = Database::open_shared("markshelf.db").expect("failed to open database");
//! ```

pub mod connection;
pub mod migrations;

pub use connection::{Database, SharedDatabase};
