//! Directory-backed dictionary source.
//!
//! Layout: one `<version>.json` per dictionary and a single `codelists.json`
//! holding every code list.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use super::DictionarySource;
use crate::catalog::{DictionaryState, DictionarySummary};
use crate::types::{CodeList, Dictionary};

/// File holding the code lists.
pub const CODE_LISTS_FILE: &str = "codelists.json";

/// Error type for the filesystem source.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// Reading a file or directory failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// A file is not valid JSON for its expected shape.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Listing fields read from a dictionary file.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryHeader {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    state: DictionaryState,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    last_update: Option<chrono::DateTime<chrono::Utc>>,
}

/// Reads dictionaries from a directory with `tokio::fs`.
#[derive(Debug, Clone)]
pub struct FsDictionarySource {
    dir: PathBuf,
}

impl FsDictionarySource {
    /// Create a source rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn version_path(&self, version: &str) -> Option<PathBuf> {
        let valid = !version.is_empty()
            && !version.contains(['/', '\\'])
            && version != "."
            && version != "..";
        valid.then(|| self.dir.join(format!("{version}.json")))
    }

    async fn read(path: &Path) -> Result<Option<Vec<u8>>, FsError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(FsError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, FsError> {
    serde_json::from_slice(bytes).map_err(|source| FsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> FsError + '_ {
    move |source| FsError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[async_trait]
impl DictionarySource for FsDictionarySource {
    type Error = FsError;

    async fn list_dictionaries(&self) -> Result<Vec<DictionarySummary>, Self::Error> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(io_error(&self.dir))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error(&self.dir))? {
            let path = entry.path();
            let is_json = path.extension().map(|e| e == "json").unwrap_or(false);
            let is_code_lists = path.file_name().map(|n| n == CODE_LISTS_FILE).unwrap_or(false);
            if is_json && !is_code_lists {
                paths.push(path);
            }
        }
        paths.sort();

        let mut summaries = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(bytes) = Self::read(&path).await? else {
                continue;
            };
            let header: SummaryHeader = parse(&path, &bytes)?;
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            summaries.push(DictionarySummary {
                version: header.version.unwrap_or(stem),
                state: header.state,
                last_update: header.last_update,
            });
        }

        tracing::debug!(dir = %self.dir.display(), count = summaries.len(), "listed dictionaries");
        Ok(summaries)
    }

    async fn fetch_dictionary(&self, version: &str) -> Result<Option<Dictionary>, Self::Error> {
        let Some(path) = self.version_path(version) else {
            return Ok(None);
        };
        match Self::read(&path).await? {
            Some(bytes) => parse(&path, &bytes).map(Some),
            None => Ok(None),
        }
    }

    async fn fetch_code_lists(&self) -> Result<Vec<CodeList>, Self::Error> {
        let path = self.dir.join(CODE_LISTS_FILE);
        match Self::read(&path).await? {
            Some(bytes) => parse(&path, &bytes),
            None => Ok(Vec::new()),
        }
    }
}
