//! SQLite-backed title cache.
//!
//! A persistent mapping from URL to the last title observed for it, using
//! SQLite with async access via tokio-rusqlite:
//!
//! - Keys are the SHA-256 of the trimmed URL
//! - Schema created idempotently on open
//! - WAL mode; all operations serialized on the connection thread
//! - Entries never expire

pub mod connection;
pub mod hash;
pub mod schema;
pub mod store;
pub mod titles;

pub use crate::Error;

pub use connection::CacheDb;
pub use hash::compute_cache_key;
pub use store::{TitleCache, TitleStore};
