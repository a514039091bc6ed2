//! Domain error types.
//!
//! Configuration and input problems get their own typed errors so callers
//! can tell a bad watchlist apart from a bad tender file. Everything above
//! the core wraps these in `anyhow` with added context.

use std::fmt;

/// Which watchlist an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchlistKind {
    Keywords,
    Entities,
}

impl fmt::Display for WatchlistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchlistKind::Keywords => write!(f, "keyword"),
            WatchlistKind::Entities => write!(f, "monitored entity"),
        }
    }
}

/// Errors raised while building watchlists from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An empty entry would match every tender.
    #[error("Empty entry at position {position} of the {list} watchlist")]
    EmptyEntry { list: WatchlistKind, position: usize },
}

/// Errors raised while reading tender records.
#[derive(Debug, thiserror::Error)]
pub enum TenderError {
    #[error("Malformed tender record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },

    #[error("Tender input must be a JSON array, found {found}")]
    NotAnArray { found: &'static str },
}

impl TenderError {
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        TenderError::MalformedRecord {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
