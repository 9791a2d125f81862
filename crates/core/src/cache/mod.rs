//! SQLite-backed versioned cache store.
//!
//! This module provides the persistent cache the worker serves from, using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Named cache namespaces, one per worker version
//! - Request-keyed response snapshots (UPSERT on re-store)
//! - Atomic batch population for install
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod key;
pub mod migrations;
pub mod namespaces;

pub use crate::Error;

pub use connection::CacheDb;
pub use key::compute_entry_key;
