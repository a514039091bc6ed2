//! Analysis modules.
//!
//! Watchlist construction, per-tender classification and grouping of the
//! matches by entity.

pub mod aggregator;
pub mod matcher;
pub mod watchlist;

pub use aggregator::*;
pub use matcher::*;
pub use watchlist::Watchlists;
