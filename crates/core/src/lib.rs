//! Core types and shared functionality for portico.
//!
//! This crate provides:
//! - The versioned cache store with SQLite backend
//! - Unified error types
//! - Layered application configuration

pub mod config;
pub mod error;
pub mod store;

pub use config::AppConfig;
pub use error::Error;
pub use store::{CacheStore, Snapshot};
