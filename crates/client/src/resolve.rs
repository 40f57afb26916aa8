//! Cache-first title resolution.
//!
//! A URL is trimmed, looked up in the [`TitleCache`], and only fetched on a
//! miss. Fetched titles (including the [`NO_TITLE`](crate::NO_TITLE)
//! sentinel) are written back before returning. Fetch failures are returned,
//! never cached, and never retried.

use std::sync::Arc;

use pagetitle_core::{Error, TitleCache};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::extract::title_or_sentinel;
use crate::fetch::PageSource;

/// Default number of URLs of one batch resolved at the same time.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Outcome of resolving a single URL.
#[derive(Debug)]
pub enum Resolution {
    /// Served from the cache without a fetch.
    Cached(String),
    /// Fetched, extracted, and written to the cache.
    Fetched(String),
    /// Input rejected or fetch failed.
    Failed(Error),
}

impl Resolution {
    pub fn title(&self) -> Option<&str> {
        match self {
            Resolution::Cached(title) | Resolution::Fetched(title) => Some(title),
            Resolution::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Resolution::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, Resolution::Cached(_))
    }
}

/// Resolves URLs to page titles through the cache.
pub struct TitleResolver {
    cache: TitleCache,
    source: Arc<dyn PageSource>,
    batch_concurrency: usize,
}

impl TitleResolver {
    pub fn new(cache: TitleCache, source: Arc<dyn PageSource>) -> Self {
        Self { cache, source, batch_concurrency: DEFAULT_BATCH_CONCURRENCY }
    }

    /// Limit how many URLs of one batch are fetched at the same time.
    ///
    /// Values below 1 are raised to 1.
    pub fn with_batch_concurrency(mut self, limit: usize) -> Self {
        self.batch_concurrency = limit.max(1);
        self
    }

    /// Resolve one URL.
    pub async fn resolve(&self, url: &str) -> Resolution {
        let url = url.trim();
        if url.is_empty() {
            return Resolution::Failed(Error::InvalidInput("url must be a non-empty string".into()));
        }

        if let Some(title) = self.cache.lookup(url).await {
            tracing::debug!("cache hit for {}", url);
            return Resolution::Cached(title);
        }

        let html = match self.source.fetch_html(url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!(url, error = %e, "title fetch failed");
                return Resolution::Failed(e);
            }
        };

        // Parsing a large document is CPU bound; keep it off the async workers.
        let title = match tokio::task::spawn_blocking(move || title_or_sentinel(&html)).await {
            Ok(title) => title,
            Err(e) => {
                tracing::error!(url, error = %e, "title extraction task failed");
                return Resolution::Failed(Error::Internal(format!("title extraction failed: {e}")));
            }
        };
        self.cache.store(url, &title).await;

        Resolution::Fetched(title)
    }

    /// Resolve a batch of inputs concurrently.
    ///
    /// `None` marks an entry that was not a string. The returned vector has
    /// the same length and order as `inputs`; one entry failing never
    /// affects the others.
    pub async fn resolve_batch(self: &Arc<Self>, inputs: Vec<Option<String>>) -> Vec<Resolution> {
        let semaphore = Arc::new(Semaphore::new(self.batch_concurrency));
        let mut join_set = JoinSet::new();
        let total = inputs.len();

        for (index, input) in inputs.into_iter().enumerate() {
            let resolver = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);

            join_set.spawn(async move {
                let resolution = match input {
                    Some(url) => {
                        // Held until the resolution finishes.
                        let _permit = semaphore.acquire_owned().await.ok();
                        resolver.resolve(&url).await
                    }
                    None => Resolution::Failed(Error::InvalidInput("url must be a string".into())),
                };
                (index, resolution)
            });
        }

        let mut slots: Vec<Option<Resolution>> = (0..total).map(|_| None).collect();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, resolution)) => slots[index] = Some(resolution),
                Err(e) => tracing::error!(error = %e, "title resolution task failed"),
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| Resolution::Failed(Error::Internal("title resolution task failed".into())))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::NO_TITLE;
    use async_trait::async_trait;
    use pagetitle_core::cache::compute_cache_key;
    use pagetitle_core::{CacheDb, TitleStore};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned bodies and counts fetches per URL.
    #[derive(Default)]
    struct StubSource {
        pages: HashMap<String, Result<String, u16>>,
        calls: Mutex<HashMap<String, usize>>,
    }

    impl StubSource {
        fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), Ok(html.to_string()));
            self
        }

        fn status(mut self, url: &str, status: u16) -> Self {
            self.pages.insert(url.to_string(), Err(status));
            self
        }

        fn calls(&self, url: &str) -> usize {
            self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
        }

        fn total_calls(&self) -> usize {
            self.calls.lock().unwrap().values().sum()
        }
    }

    #[async_trait]
    impl PageSource for StubSource {
        async fn fetch_html(&self, url: &str) -> Result<String, Error> {
            *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
            match self.pages.get(url) {
                Some(Ok(html)) => Ok(html.clone()),
                Some(Err(status)) => Err(Error::HttpStatus(*status)),
                None => Err(Error::Network(format!("dns error: {url}"))),
            }
        }
    }

    struct ReadOnlyStore(CacheDb);

    #[async_trait]
    impl TitleStore for ReadOnlyStore {
        async fn load(&self, key: &str) -> Result<Option<String>, Error> {
            self.0.get_title(key).await
        }

        async fn save(&self, _key: &str, _title: &str) -> Result<(), Error> {
            Err(Error::Internal("read-only store".into()))
        }
    }

    const EXAMPLE_HTML: &str = "<html><head><title> Example Domain </title></head></html>";

    async fn resolver_with(source: Arc<StubSource>) -> (Arc<TitleResolver>, CacheDb) {
        let db = CacheDb::open_in_memory().await.unwrap();
        let resolver = TitleResolver::new(TitleCache::new(db.clone()), source);
        (Arc::new(resolver), db)
    }

    #[tokio::test]
    async fn test_resolve_example_and_cache_under_exact_url() {
        let source = Arc::new(StubSource::default().page("https://example.com", EXAMPLE_HTML));
        let (resolver, db) = resolver_with(source.clone()).await;

        let resolution = resolver.resolve("https://example.com").await;

        assert!(matches!(&resolution, Resolution::Fetched(t) if t == "Example Domain"));
        let stored = db.get_title(&compute_cache_key("https://example.com")).await.unwrap();
        assert_eq!(stored.as_deref(), Some("Example Domain"));
    }

    #[tokio::test]
    async fn test_second_resolve_hits_cache() {
        let source = Arc::new(StubSource::default().page("https://example.com", EXAMPLE_HTML));
        let (resolver, _db) = resolver_with(source.clone()).await;

        let first = resolver.resolve("https://example.com").await;
        let second = resolver.resolve("https://example.com").await;
        let third = resolver.resolve("  https://example.com \n").await;

        assert_eq!(first.title(), Some("Example Domain"));
        assert!(second.is_cached());
        assert_eq!(second.title(), first.title());
        assert!(third.is_cached());
        assert_eq!(source.calls("https://example.com"), 1);
    }

    #[tokio::test]
    async fn test_missing_title_sentinel_is_cached() {
        let source = Arc::new(StubSource::default().page("https://bare.example", "<html><body>hi</body></html>"));
        let (resolver, _db) = resolver_with(source.clone()).await;

        let first = resolver.resolve("https://bare.example").await;
        let second = resolver.resolve("https://bare.example").await;

        assert!(matches!(&first, Resolution::Fetched(t) if t == NO_TITLE));
        assert!(matches!(&second, Resolution::Cached(t) if t == NO_TITLE));
        assert_eq!(source.calls("https://bare.example"), 1);
    }

    #[tokio::test]
    async fn test_large_page_title_is_extracted() {
        let padding = "<p>filler paragraph</p>".repeat(100_000);
        let big = format!("<html><head><title>Big Page</title></head><body>{padding}</body></html>");
        let source = Arc::new(
            StubSource::default()
                .page("https://big.example", &big)
                .page("https://small.example", "<title>Small</title>"),
        );
        let (resolver, db) = resolver_with(source).await;

        let results = resolver
            .resolve_batch(vec![Some("https://big.example".into()), Some("https://small.example".into())])
            .await;

        assert_eq!(results[0].title(), Some("Big Page"));
        assert_eq!(results[1].title(), Some("Small"));
        assert_eq!(db.count_titles().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_blank_input_touches_nothing() {
        let source = Arc::new(StubSource::default());
        let (resolver, db) = resolver_with(source.clone()).await;

        for input in ["", "   ", "\t\n"] {
            let resolution = resolver.resolve(input).await;
            assert!(matches!(resolution.error(), Some(Error::InvalidInput(_))));
        }

        assert_eq!(source.total_calls(), 0);
        assert_eq!(db.count_titles().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let source = Arc::new(StubSource::default().status("https://gone.example", 404));
        let (resolver, db) = resolver_with(source.clone()).await;

        let first = resolver.resolve("https://gone.example").await;
        let second = resolver.resolve("https://gone.example").await;

        assert!(matches!(first.error(), Some(Error::HttpStatus(404))));
        assert!(first.title().is_none());
        assert!(matches!(second.error(), Some(Error::HttpStatus(404))));
        assert_eq!(source.calls("https://gone.example"), 2);
        assert_eq!(db.count_titles().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cache_write_failure_still_returns_title() {
        let source = Arc::new(StubSource::default().page("https://example.com", EXAMPLE_HTML));
        let db = CacheDb::open_in_memory().await.unwrap();
        let resolver = TitleResolver::new(TitleCache::new(ReadOnlyStore(db.clone())), source.clone());

        let resolution = resolver.resolve("https://example.com").await;

        assert!(matches!(&resolution, Resolution::Fetched(t) if t == "Example Domain"));
        assert_eq!(db.count_titles().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_isolates_failures() {
        let source = Arc::new(
            StubSource::default()
                .page("https://one.example", "<title>One</title>")
                .page("https://three.example", "<title>Three</title>"),
        );
        let (resolver, _db) = resolver_with(source).await;

        let results = resolver
            .resolve_batch(vec![
                Some("https://one.example".into()),
                Some("https://two.example".into()),
                Some("https://three.example".into()),
            ])
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title(), Some("One"));
        assert!(matches!(results[1].error(), Some(Error::Network(_))));
        assert_eq!(results[2].title(), Some("Three"));
    }

    #[tokio::test]
    async fn test_batch_invalid_entries_are_marked() {
        let source = Arc::new(StubSource::default().page("https://example.com", EXAMPLE_HTML));
        let (resolver, _db) = resolver_with(source.clone()).await;

        let results = resolver
            .resolve_batch(vec![None, Some("   ".into()), Some("https://example.com".into()), Some("".into())])
            .await;

        assert_eq!(results.len(), 4);
        assert!(matches!(results[0].error(), Some(Error::InvalidInput(_))));
        assert!(matches!(results[1].error(), Some(Error::InvalidInput(_))));
        assert_eq!(results[2].title(), Some("Example Domain"));
        assert!(matches!(results[3].error(), Some(Error::InvalidInput(_))));
        assert_eq!(source.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_batch_empty() {
        let (resolver, _db) = resolver_with(Arc::new(StubSource::default())).await;
        assert!(resolver.resolve_batch(Vec::new()).await.is_empty());
    }

    #[tokio::test]
    async fn test_batch_order_with_many_entries() {
        let mut source = StubSource::default();
        let urls: Vec<String> = (0..25).map(|i| format!("https://site{i}.example")).collect();
        for (i, url) in urls.iter().enumerate() {
            source = source.page(url, &format!("<title>Site {i}</title>"));
        }
        let db = CacheDb::open_in_memory().await.unwrap();
        let resolver =
            Arc::new(TitleResolver::new(TitleCache::new(db), Arc::new(source)).with_batch_concurrency(3));

        let results = resolver.resolve_batch(urls.iter().cloned().map(Some).collect()).await;

        assert_eq!(results.len(), urls.len());
        for (i, resolution) in results.iter().enumerate() {
            assert_eq!(resolution.title(), Some(format!("Site {i}").as_str()));
        }
    }

    #[tokio::test]
    async fn test_batch_repeated_url_uses_cache_afterwards() {
        let source = Arc::new(StubSource::default().page("https://example.com", EXAMPLE_HTML));
        let (resolver, _db) = resolver_with(source.clone()).await;

        resolver.resolve("https://example.com").await;
        let results = resolver
            .resolve_batch(vec![Some("https://example.com".into()), Some(" https://example.com ".into())])
            .await;

        assert!(results.iter().all(Resolution::is_cached));
        assert_eq!(source.calls("https://example.com"), 1);
    }
}
