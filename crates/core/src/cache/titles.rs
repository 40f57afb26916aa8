//! Title row operations.
//!
//! Rows are keyed by the hash from [`compute_cache_key`](super::hash::compute_cache_key);
//! these functions take the hash, not the URL.

use super::connection::CacheDb;
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

impl CacheDb {
    /// Insert or replace the title stored under `hash`.
    pub async fn upsert_title(&self, hash: &str, title: &str) -> Result<(), Error> {
        let hash = hash.to_string();
        let title = title.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO title_cache (url_hash, title) VALUES (?1, ?2)
                ON CONFLICT(url_hash) DO UPDATE SET title = excluded.title",
                    params![hash, title],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get the title stored under `hash`.
    ///
    /// Returns None if the hash doesn't exist in the cache.
    pub async fn get_title(&self, hash: &str) -> Result<Option<String>, Error> {
        let hash = hash.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row(
                    "SELECT title FROM title_cache WHERE url_hash = ?1",
                    params![hash],
                    |row| row.get::<_, String>(0),
                );

                match result {
                    Ok(title) => Ok(Some(title)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Number of cached titles.
    pub async fn count_titles(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM title_cache", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
