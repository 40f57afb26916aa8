//! Database connection management with pragma configuration.
//!
//! This module handles opening the SQLite database, applying pragmas
//! (WAL mode), and creating the title table.

use super::schema;
use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;";

/// Cache database handle.
///
/// Wraps a tokio-rusqlite Connection that runs every database operation
/// on one background thread, so concurrent callers are serialized.
#[derive(Clone, Debug)]
pub struct CacheDb {
    pub(crate) conn: Connection,
}

impl CacheDb {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies pragmas, and creates
    /// the schema if absent.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| conn.execute_batch(PRAGMAS))
            .await
            .map_err(Error::Database)?;

        schema::ensure(&conn).await?;

        Ok(Self { conn })
    }
}
