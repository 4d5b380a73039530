//! Core types for ti-core — the trade-index bucketed store.
//!
//! This module defines the fundamental data structures shared across the
//! store and query layers: the immutable [`TradeEntry`] and its [`Side`].

use serde::{Deserialize, Serialize};

/// A single trade observation ingested from an object-store payload.
///
/// Entries are immutable once constructed and are never mutated after
/// insertion into the store; they are destroyed only by [`crate::store::Store::clear`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEntry {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Trade price. Always finite.
    pub price: f64,
    /// Trade size. Always finite.
    pub size: f64,
    /// Buy or sell.
    pub side: Side,
    /// Short opaque producer identifier (exchange, collector, feed name, ...).
    pub source: String,
}

/// Which side of the book a trade occurred on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Optional post-temporal filters applied by [`crate::store::Store::range`]
/// and [`crate::query::QueryApi::at_filtered`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    pub source: Option<String>,
    pub side: Option<Side>,
}

impl EntryFilter {
    pub fn matches(&self, entry: &TradeEntry) -> bool {
        if let Some(ref source) = self.source {
            if &entry.source != source {
                return false;
            }
        }
        if let Some(side) = self.side {
            if entry.side != side {
                return false;
            }
        }
        true
    }
}
