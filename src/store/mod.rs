//! Dictionary sources and the snapshot cache.

pub mod cache;
pub mod memory;

#[cfg(feature = "cli")]
pub mod fs;

use async_trait::async_trait;

use crate::catalog::DictionarySummary;
use crate::types::{CodeList, Dictionary};

/// Where dictionary snapshots and code lists come from.
///
/// Versions are immutable: fetching the same version twice must return the
/// same content.
#[async_trait]
pub trait DictionarySource: Send + Sync {
    /// Error type for source operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// List every known version, drafts included.
    async fn list_dictionaries(&self) -> Result<Vec<DictionarySummary>, Self::Error>;

    /// Fetch one version. `None` if the version does not exist.
    async fn fetch_dictionary(&self, version: &str) -> Result<Option<Dictionary>, Self::Error>;

    /// Fetch all code lists.
    async fn fetch_code_lists(&self) -> Result<Vec<CodeList>, Self::Error>;
}

pub use cache::{CacheConfig, CacheError, CacheStats, DictionaryCache};
pub use memory::{InMemoryDictionarySource, InMemoryError};

#[cfg(feature = "cli")]
pub use fs::{FsDictionarySource, FsError};
