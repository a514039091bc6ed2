//! Keyword and monitored-entity watchlists.
//!
//! Watchlists are validated once when they are built and are read-only
//! afterwards, so a single instance can be shared by any number of
//! classification calls.

use crate::error::{ConfigError, WatchlistKind};
use std::collections::HashSet;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    /// The entry as configured, used in match reasons.
    label: String,
    /// Lower-cased form used for comparison.
    needle: String,
}

/// An ordered, case-insensitive list of substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
    entries: Vec<Entry>,
}

impl Watchlist {
    /// Build a watchlist, rejecting empty entries.
    ///
    /// Entries equal after lower-casing are collapsed to the first one.
    pub fn new<I, S>(kind: WatchlistKind, entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();

        for (index, entry) in entries.into_iter().enumerate() {
            let label: String = entry.into();
            if label.trim().is_empty() {
                return Err(ConfigError::EmptyEntry {
                    list: kind,
                    position: index + 1,
                });
            }

            let needle = label.to_lowercase();
            if !seen.insert(needle.clone()) {
                warn!("Ignoring duplicate {} watchlist entry: {:?}", kind, label);
                continue;
            }

            kept.push(Entry { label, needle });
        }

        Ok(Self { entries: kept })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured entries, in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Every entry occurring in `haystack_lower`, in watchlist order.
    ///
    /// The caller lower-cases the haystack once per record.
    pub fn find_in(&self, haystack_lower: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| haystack_lower.contains(e.needle.as_str()))
            .map(|e| e.label.clone())
            .collect()
    }
}

/// The pair of watchlists a run classifies against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlists {
    keywords: Watchlist,
    entities: Watchlist,
}

impl Watchlists {
    pub fn new<K, E, S1, S2>(keywords: K, entities: E) -> Result<Self, ConfigError>
    where
        K: IntoIterator<Item = S1>,
        E: IntoIterator<Item = S2>,
        S1: Into<String>,
        S2: Into<String>,
    {
        Ok(Self {
            keywords: Watchlist::new(WatchlistKind::Keywords, keywords)?,
            entities: Watchlist::new(WatchlistKind::Entities, entities)?,
        })
    }

    pub fn keywords(&self) -> &Watchlist {
        &self.keywords
    }

    pub fn entities(&self) -> &Watchlist {
        &self.entities
    }
}
