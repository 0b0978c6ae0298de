//! In-memory page store using moka
//!
//! Holds rendered widget pages keyed by request path and query. Each page
//! remembers the cache tags it was rendered with so it can be purged when
//! any of the tagged entities changes.

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Default maximum cache capacity (number of pages)
const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// Default TTL for cached pages (1 hour)
const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// A rendered page as stored in the cache
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPage {
    pub body: Arc<String>,
    pub content_type: String,
    pub etag: String,
    pub tags: Arc<Vec<String>>,
}

impl CachedPage {
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|tag| tags.contains(tag))
    }
}

/// In-memory page store
///
/// Pages expire after the configured TTL; capacity overflow evicts the least
/// recently used pages.
pub struct PageStore {
    cache: Cache<String, CachedPage>,
    ttl: Duration,
}

impl std::fmt::Debug for PageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageStore")
            .field("entry_count", &self.cache.entry_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl PageStore {
    /// Create a page store with default settings (10,000 pages, 1 hour)
    pub fn new() -> Self {
        Self::with_capacity_and_ttl(DEFAULT_MAX_CAPACITY, DEFAULT_TTL)
    }

    pub fn with_capacity_and_ttl(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { cache, ttl }
    }

    pub async fn get(&self, key: &str) -> Option<CachedPage> {
        self.cache.get(key).await
    }

    /// Store a page, replacing any page under the same key
    pub async fn insert(&self, key: &str, page: CachedPage) {
        self.cache.insert(key.to_string(), page).await;
    }

    pub async fn remove(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Remove every page carrying at least one of `tags`
    ///
    /// Returns the number of pages removed.
    pub async fn invalidate_tagged(&self, tags: &[String]) -> usize {
        let keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(_, page)| page.has_any_tag(tags))
            .map(|(key, _)| (*key).clone())
            .collect();

        for key in &keys {
            self.remove(key).await;
        }

        keys.len()
    }

    /// Remove every page
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Number of stored pages, after pending maintenance has run
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new()
    }
}
