//! Best-effort URL to title cache.
//!
//! [`TitleStore`] is the storage seam; [`TitleCache`] sits on top of it and
//! turns every storage failure into a logged miss or a dropped write. The
//! cache only saves fetches, so it must never fail a title resolution.

use std::sync::Arc;

use async_trait::async_trait;

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use crate::Error;

/// Persistent storage for titles keyed by cache hash.
#[async_trait]
pub trait TitleStore: Send + Sync {
    /// Load the title stored under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `title` under `key`, replacing any previous value.
    async fn save(&self, key: &str, title: &str) -> Result<(), Error>;
}

#[async_trait]
impl TitleStore for CacheDb {
    async fn load(&self, key: &str) -> Result<Option<String>, Error> {
        self.get_title(key).await
    }

    async fn save(&self, key: &str, title: &str) -> Result<(), Error> {
        self.upsert_title(key, title).await
    }
}

/// URL-keyed title cache over a [`TitleStore`].
#[derive(Clone)]
pub struct TitleCache {
    store: Arc<dyn TitleStore>,
}

impl TitleCache {
    pub fn new(store: impl TitleStore + 'static) -> Self {
        Self { store: Arc::new(store) }
    }

    /// Title previously stored for `url`.
    ///
    /// Storage errors are logged and reported as a miss.
    pub async fn lookup(&self, url: &str) -> Option<String> {
        let key = compute_cache_key(url);
        match self.store.load(&key).await {
            Ok(title) => title,
            Err(e) => {
                tracing::warn!(url, error = %e, "title cache lookup failed, treating as miss");
                None
            }
        }
    }

    /// Remember `title` for `url`. Storage errors are logged and dropped.
    pub async fn store(&self, url: &str, title: &str) {
        let key = compute_cache_key(url);
        if let Err(e) = self.store.save(&key, title).await {
            tracing::warn!(url, error = %e, "title cache write failed");
        }
    }
}

impl std::fmt::Debug for TitleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TitleCache").finish_non_exhaustive()
    }
}
