//! Snapshot cache in front of a [`DictionarySource`].
//!
//! Dictionary versions never change once published, so a fetched snapshot
//! stays valid for the whole session. The cache keeps them unbounded by
//! default; a bounded LRU can be configured for long-running processes.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::RwLock;

use super::DictionarySource;
use crate::catalog::DictionaryCatalog;
use crate::types::{CodeList, Dictionary, MalformedDictionaryError};

/// Configuration for the snapshot cache.
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Maximum number of cached versions. `None` keeps every version.
    pub max_entries: Option<usize>,
}

impl CacheConfig {
    /// Unbounded cache.
    pub fn unbounded() -> Self {
        Self { max_entries: None }
    }

    /// LRU cache holding at most `max_entries` versions.
    pub fn bounded(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries),
        }
    }
}

/// Errors from cache lookups.
#[derive(Debug, thiserror::Error)]
pub enum CacheError<E> {
    /// The underlying source failed.
    #[error("Dictionary source failed: {0}")]
    Source(#[source] E),
    /// The source has no such version.
    #[error("Dictionary version not found: {0}")]
    NotFound(String),
    /// The fetched snapshot is structurally invalid.
    #[error(transparent)]
    Malformed(#[from] MalformedDictionaryError),
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of cached versions.
    pub len: usize,
    /// Maximum capacity, `None` when unbounded.
    pub cap: Option<usize>,
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that went to the source.
    pub misses: u64,
}

/// Caller-owned cache of dictionary snapshots and code lists.
///
/// Snapshots are shared as `Arc<Dictionary>`. No lock is held while the
/// source is awaited; two concurrent misses on one version may both fetch,
/// and the first insert wins.
pub struct DictionaryCache<S> {
    source: S,
    config: CacheConfig,
    dictionaries: RwLock<LruCache<String, Arc<Dictionary>>>,
    code_lists: RwLock<Option<Arc<Vec<CodeList>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<S: DictionarySource> DictionaryCache<S> {
    /// Create an unbounded cache over `source`.
    pub fn new(source: S) -> Self {
        Self::with_config(source, CacheConfig::default())
    }

    /// Create a cache with an explicit configuration.
    ///
    /// A bound of zero is treated as a bound of one.
    pub fn with_config(source: S, config: CacheConfig) -> Self {
        let lru = match config.max_entries {
            Some(max) => LruCache::new(NonZeroUsize::new(max).unwrap_or(NonZeroUsize::MIN)),
            None => LruCache::unbounded(),
        };

        Self {
            source,
            config,
            dictionaries: RwLock::new(lru),
            code_lists: RwLock::new(None),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a dictionary version, fetching it on first use.
    ///
    /// Malformed snapshots are rejected and never cached.
    pub async fn get(&self, version: &str) -> Result<Arc<Dictionary>, CacheError<S::Error>> {
        // Hits refresh recency.
        let cached = self.dictionaries.write().get(version).cloned();
        if let Some(dict) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(dict);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let dict = self
            .source
            .fetch_dictionary(version)
            .await
            .map_err(CacheError::Source)?
            .ok_or_else(|| CacheError::NotFound(version.to_string()))?;

        if let Err(e) = dict.check_well_formed() {
            tracing::warn!(version = %version, error = %e, "rejecting malformed dictionary");
            return Err(e.into());
        }

        let dict = Arc::new(dict);
        let mut cache = self.dictionaries.write();
        if let Some(existing) = cache.peek(version) {
            return Ok(Arc::clone(existing));
        }
        if let Some((evicted, _)) = cache.push(version.to_string(), Arc::clone(&dict)) {
            tracing::warn!(
                evicted = %evicted,
                cap = ?self.config.max_entries,
                "dictionary cache full, evicted least recently used version"
            );
        }

        Ok(dict)
    }

    /// Fetch two versions for comparison.
    pub async fn get_pair(
        &self,
        from: &str,
        to: &str,
    ) -> Result<(Arc<Dictionary>, Arc<Dictionary>), CacheError<S::Error>> {
        let from = self.get(from).await?;
        let to = self.get(to).await?;
        Ok((from, to))
    }

    /// Get all code lists, fetching them on first use.
    pub async fn code_lists(&self) -> Result<Arc<Vec<CodeList>>, CacheError<S::Error>> {
        let cached = self.code_lists.read().clone();
        if let Some(lists) = cached {
            return Ok(lists);
        }

        let lists = Arc::new(
            self.source
                .fetch_code_lists()
                .await
                .map_err(CacheError::Source)?,
        );

        let mut slot = self.code_lists.write();
        Ok(Arc::clone(slot.get_or_insert(lists)))
    }

    /// Current catalog of published versions. Always asks the source.
    pub async fn catalog(&self) -> Result<DictionaryCatalog, CacheError<S::Error>> {
        let summaries = self
            .source
            .list_dictionaries()
            .await
            .map_err(CacheError::Source)?;
        Ok(DictionaryCatalog::new(summaries))
    }

    /// Drop one cached version. Returns whether it was cached.
    pub fn invalidate(&self, version: &str) -> bool {
        self.dictionaries.write().pop(version).is_some()
    }

    /// Drop every cached snapshot and the code lists.
    pub fn clear(&self) {
        self.dictionaries.write().clear();
        *self.code_lists.write() = None;
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            len: self.dictionaries.read().len(),
            cap: self.config.max_entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
