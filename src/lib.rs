//! markshelf is a personal bookmark library with bookmarks, a folder forest and
//! tags over pluggable storage.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod repository;
pub mod rpc_handler;
pub mod services;
pub mod types;
