//! In-memory dictionary source for testing and embedding.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::DictionarySource;
use crate::catalog::DictionarySummary;
use crate::types::{CodeList, Dictionary};

/// Error type for the in-memory source.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryError {
    /// The source was switched offline.
    #[error("Dictionary source unavailable")]
    Unavailable,
}

/// In-memory dictionary source.
///
/// Uses a BTreeMap so listings come back in a stable order. Counts fetches so
/// callers can observe caching.
#[derive(Debug, Default)]
pub struct InMemoryDictionarySource {
    dictionaries: BTreeMap<String, (DictionarySummary, Dictionary)>,
    code_lists: Vec<CodeList>,
    fetches: AtomicUsize,
    offline: AtomicBool,
}

impl InMemoryDictionarySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dictionary under its own version with a default summary.
    pub fn add_dictionary(&mut self, dict: Dictionary) {
        let summary = DictionarySummary::new(dict.version.clone());
        self.add_dictionary_with_summary(summary, dict);
    }

    /// Add a dictionary with an explicit summary. The summary's version is the key.
    pub fn add_dictionary_with_summary(&mut self, summary: DictionarySummary, dict: Dictionary) {
        self.dictionaries
            .insert(summary.version.clone(), (summary, dict));
    }

    /// Replace the code lists.
    pub fn set_code_lists(&mut self, code_lists: Vec<CodeList>) {
        self.code_lists = code_lists;
    }

    /// Make every call fail with [`InMemoryError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of dictionary fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of stored versions.
    pub fn num_dictionaries(&self) -> usize {
        self.dictionaries.len()
    }

    fn check_online(&self) -> Result<(), InMemoryError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(InMemoryError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DictionarySource for InMemoryDictionarySource {
    type Error = InMemoryError;

    async fn list_dictionaries(&self) -> Result<Vec<DictionarySummary>, Self::Error> {
        self.check_online()?;
        Ok(self
            .dictionaries
            .values()
            .map(|(summary, _)| summary.clone())
            .collect())
    }

    async fn fetch_dictionary(&self, version: &str) -> Result<Option<Dictionary>, Self::Error> {
        self.check_online()?;
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.dictionaries.get(version).map(|(_, dict)| dict.clone()))
    }

    async fn fetch_code_lists(&self) -> Result<Vec<CodeList>, Self::Error> {
        self.check_online()?;
        Ok(self.code_lists.clone())
    }
}
