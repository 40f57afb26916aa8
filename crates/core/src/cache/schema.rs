//! Title cache schema.
//!
//! The schema is a single table created idempotently every time the
//! database is opened. There is no version table.

use super::Error;
use tokio_rusqlite::Connection;

const TITLE_CACHE_SQL: &str = include_str!("../../schema/title_cache.sql");

/// Create the `title_cache` table if it does not already exist.
pub async fn ensure(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| conn.execute_batch(TITLE_CACHE_SQL))
        .await
        .map_err(Error::Database)
}
