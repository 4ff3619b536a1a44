//! SQLite-backed versioned cache store.
//!
//! This module provides a persistent response cache using SQLite with async
//! access via tokio-rusqlite. Entries are grouped under an opaque cache
//! version name so that a whole deployment's worth of entries can be swapped
//! in and purged atomically. It supports:
//!
//! - Keyed response snapshots (method + normalized URL)
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Whole-version enumeration and deletion

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod versions;

pub use crate::Error;

pub use connection::CacheStore;
pub use entries::Snapshot;
pub use hash::entry_key;
