//! Published dictionary versions.
//!
//! Draft versions are hidden. Remaining versions are ordered newest first by
//! the numeric parts of `<major>.<minor><suffix>`, e.g. `0.10a` before `0.9e`.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publication state of a dictionary version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DictionaryState {
    /// Still editable.
    #[default]
    Opened,
    /// Frozen.
    Closed,
}

/// Listing entry for one dictionary version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionarySummary {
    /// Version string.
    pub version: String,
    /// Publication state.
    #[serde(default)]
    pub state: DictionaryState,
    /// Last modification time, epoch milliseconds on the wire.
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_update: Option<DateTime<Utc>>,
}

impl DictionarySummary {
    /// Create a summary for an opened version with no timestamp.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            state: DictionaryState::Opened,
            last_update: None,
        }
    }

    /// Whether this is a draft version.
    pub fn is_draft(&self) -> bool {
        self.version.starts_with("draft")
    }
}

/// Sort key parsed from a version string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct VersionKey<'a> {
    major: u64,
    minor: u64,
    suffix: &'a str,
}

impl<'a> VersionKey<'a> {
    /// Unparseable parts count as zero and the rest of the string as suffix.
    fn parse(version: &'a str) -> Self {
        let (major, rest) = split_number(version);
        let rest = rest.strip_prefix('.').unwrap_or(rest);
        let (minor, suffix) = split_number(rest);
        Self {
            major,
            minor,
            suffix,
        }
    }
}

fn split_number(s: &str) -> (u64, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    (s[..end].parse().unwrap_or(0), &s[end..])
}

fn newest_first(a: &str, b: &str) -> Ordering {
    VersionKey::parse(b)
        .cmp(&VersionKey::parse(a))
        .then_with(|| b.cmp(a))
}

/// Ordered view over the non-draft dictionary versions.
#[derive(Debug, Clone, Default)]
pub struct DictionaryCatalog {
    ordered: Vec<DictionarySummary>,
    by_version: BTreeMap<String, usize>,
}

impl DictionaryCatalog {
    /// Build a catalog, dropping drafts.
    pub fn new(summaries: impl IntoIterator<Item = DictionarySummary>) -> Self {
        let mut ordered: Vec<DictionarySummary> =
            summaries.into_iter().filter(|s| !s.is_draft()).collect();
        ordered.sort_by(|a, b| newest_first(&a.version, &b.version));
        ordered.dedup_by(|a, b| a.version == b.version);

        let by_version = ordered
            .iter()
            .enumerate()
            .map(|(i, s)| (s.version.clone(), i))
            .collect();

        Self {
            ordered,
            by_version,
        }
    }

    /// Versions, newest first.
    pub fn versions(&self) -> Vec<&str> {
        self.ordered.iter().map(|s| s.version.as_str()).collect()
    }

    /// Summaries, newest first.
    pub fn summaries(&self) -> &[DictionarySummary] {
        &self.ordered
    }

    /// Newest version.
    pub fn latest(&self) -> Option<&DictionarySummary> {
        self.ordered.first()
    }

    /// Version published just before `version`.
    pub fn previous(&self, version: &str) -> Option<&DictionarySummary> {
        let index = *self.by_version.get(version)?;
        self.ordered.get(index + 1)
    }

    /// Default comparison: the version before the latest against the latest.
    ///
    /// With a single version both sides are the same.
    pub fn default_pair(&self) -> Option<(&str, &str)> {
        let latest = self.latest()?;
        let from = self.previous(&latest.version).unwrap_or(latest);
        Some((from.version.as_str(), latest.version.as_str()))
    }

    /// Look up a summary.
    pub fn get(&self, version: &str) -> Option<&DictionarySummary> {
        self.by_version.get(version).map(|&i| &self.ordered[i])
    }

    /// Whether `version` is listed.
    pub fn contains(&self, version: &str) -> bool {
        self.by_version.contains_key(version)
    }

    /// Number of listed versions.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Whether no versions are listed.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
