//! Cache layer
//!
//! Rendered widgets are cached as whole pages. Every page carries the cache
//! tags of the entities it displays, so a change to a post, category, tag or
//! comment only purges the pages that showed it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use blog_widgets::cache::{create_cache, PageCacheTags};
//! use blog_widgets::config::CacheConfig;
//!
//! let cache = create_cache(&CacheConfig::default());
//! let mut tags = PageCacheTags::new();
//! tags.add_tag_to_page("blog_tag_1");
//! let since = cache.epoch();
//! // render the page
//! cache.store("/widgets/tags", body, "text/html; charset=utf-8", etag, tags.into_vec(), since).await;
//! cache.flush_cache_by_tag("blog_tag_1").await;
//! ```

pub mod memory;
pub mod tags;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::config::CacheConfig;

pub use memory::{CachedPage, PageStore};
pub use tags::PageCacheTags;

/// Position in the flush history of a [`BlogCacheService`]
///
/// Taken before a page is rendered and handed back to `store`, so a page
/// whose tags were flushed while it rendered is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CacheEpoch(u64);

/// Shared page cache used by the widget endpoint
///
/// When disabled, lookups always miss and stores are dropped, while flushes
/// stay valid no-ops.
#[derive(Debug)]
pub struct BlogCacheService {
    enabled: bool,
    store: PageStore,
    /// Bumped by every flush and clear
    epoch: AtomicU64,
    /// Epoch of the last full clear
    cleared_at: AtomicU64,
    /// Epoch of the last flush of each tag
    flushed_at: RwLock<HashMap<String, u64>>,
}

impl BlogCacheService {
    pub fn new(store: PageStore, enabled: bool) -> Self {
        Self {
            enabled,
            store,
            epoch: AtomicU64::new(0),
            cleared_at: AtomicU64::new(0),
            flushed_at: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        let store = PageStore::with_capacity_and_ttl(
            config.max_capacity,
            Duration::from_secs(config.ttl_seconds),
        );
        Self::new(store, config.enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current flush epoch, to be taken before rendering a page
    pub fn epoch(&self) -> CacheEpoch {
        CacheEpoch(self.epoch.load(Ordering::SeqCst))
    }

    pub async fn get(&self, key: &str) -> Option<CachedPage> {
        if !self.enabled {
            return None;
        }
        self.store.get(key).await
    }

    /// Store a rendered page with the tags it was rendered with
    ///
    /// `rendered_since` is the epoch taken before rendering started. The page
    /// is dropped when a clear or a flush of one of its tags happened after
    /// it. Returns whether the page was kept.
    pub async fn store(
        &self,
        key: &str,
        body: String,
        content_type: &str,
        etag: String,
        tags: Vec<String>,
        rendered_since: CacheEpoch,
    ) -> bool {
        if !self.enabled || self.is_stale(&tags, rendered_since) {
            return false;
        }
        tracing::debug!(key, tags = tags.len(), "Caching rendered widget");
        let page = CachedPage {
            body: Arc::new(body),
            content_type: content_type.to_string(),
            etag,
            tags: Arc::new(tags),
        };
        let tags = page.tags.clone();
        self.store.insert(key, page).await;

        // A flush that recorded its epoch before the insert may have scanned
        // the store before the page landed in it
        if self.is_stale(&tags, rendered_since) {
            self.store.remove(key).await;
            tracing::debug!(key, "Dropped widget flushed while rendering");
            return false;
        }
        true
    }

    /// Purge every page tagged with `tag`
    pub async fn flush_cache_by_tag(&self, tag: &str) -> usize {
        self.flush_cache_by_tags(&[tag.to_string()]).await
    }

    /// Purge every page tagged with any of `tags`
    pub async fn flush_cache_by_tags(&self, tags: &[String]) -> usize {
        if tags.is_empty() {
            return 0;
        }
        let epoch = self.bump_epoch();
        {
            let mut flushed_at = self.flushed_at.write().unwrap_or_else(|e| e.into_inner());
            for tag in tags {
                flushed_at.insert(tag.clone(), epoch);
            }
        }
        let removed = self.store.invalidate_tagged(tags).await;
        tracing::info!(?tags, removed, "Flushed page cache by tags");
        removed
    }

    pub async fn clear(&self) {
        let epoch = self.bump_epoch();
        self.cleared_at.store(epoch, Ordering::SeqCst);
        // Per-tag history is covered by the clear from here on
        self.flushed_at
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|_, flushed| *flushed > epoch);
        self.store.clear().await;
        tracing::info!("Cleared page cache");
    }

    pub async fn entry_count(&self) -> u64 {
        self.store.entry_count().await
    }

    fn bump_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_stale(&self, tags: &[String], since: CacheEpoch) -> bool {
        if self.cleared_at.load(Ordering::SeqCst) > since.0 {
            return true;
        }
        let flushed_at = self.flushed_at.read().unwrap_or_else(|e| e.into_inner());
        tags.iter()
            .filter_map(|tag| flushed_at.get(tag))
            .any(|flushed| *flushed > since.0)
    }
}

/// Create the shared page cache from configuration
pub fn create_cache(config: &CacheConfig) -> Arc<BlogCacheService> {
    if config.enabled {
        tracing::info!(
            "Using in-memory page cache (capacity {}, ttl {}s)",
            config.max_capacity,
            config.ttl_seconds
        );
    } else {
        tracing::info!("Page cache disabled");
    }
    Arc::new(BlogCacheService::from_config(config))
}
