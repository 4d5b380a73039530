//! Query API — a thin, validated consumer façade over [`crate::store::Store`].
//!
//! Unlike the store, every operation here rejects bad caller input (e.g.
//! `start >= end`, a NaN timestamp) before touching the store, and several
//! operations compute derived aggregates or convenience lookups that are not
//! primitive store operations.

use std::collections::HashMap;

use crate::config::QueryConfig;
use crate::error::StoreError;
use crate::store::Store;
use crate::types::{EntryFilter, Side, TradeEntry};

/// Aggregate statistics over a temporal slice, as returned by
/// [`QueryApi::aggregates`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregates {
    pub count: usize,
    pub buy_count: usize,
    pub sell_count: usize,
    pub buy_volume: f64,
    pub sell_volume: f64,
    pub total_volume: f64,
    pub mean_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

impl Aggregates {
    fn empty() -> Self {
        // An empty range yields zeros for every field, including min/max/avg
        // price — a documented convention, not a mathematical identity.
        Self {
            count: 0,
            buy_count: 0,
            sell_count: 0,
            buy_volume: 0.0,
            sell_volume: 0.0,
            total_volume: 0.0,
            mean_price: 0.0,
            min_price: 0.0,
            max_price: 0.0,
        }
    }
}

/// Validated façade over [`Store`]. Holds the query-related defaults
/// (nearest tolerance, first-before/after windows) from [`QueryConfig`].
#[derive(Clone)]
pub struct QueryApi {
    store: Store,
    config: QueryConfig,
}

impl QueryApi {
    pub fn new(store: Store, config: QueryConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Entries in `[start, end)` matching `filter`, truncated to `limit`.
    pub fn by_range(
        &self,
        start: i64,
        end: i64,
        filter: &EntryFilter,
        limit: Option<usize>,
    ) -> Result<Vec<TradeEntry>, StoreError> {
        if start >= end {
            return Err(StoreError::InvalidArgument(format!(
                "start ({start}) must be < end ({end})"
            )));
        }
        Ok(self.store.range(start, end, filter, limit))
    }

    pub fn at(&self, t: f64) -> Result<Vec<TradeEntry>, StoreError> {
        let t = validated_timestamp(t)?;
        Ok(self.store.at(t))
    }

    /// `at(t)`, then `source`/`side` post-filters applied in order.
    pub fn at_filtered(&self, t: f64, filter: &EntryFilter) -> Result<Vec<TradeEntry>, StoreError> {
        let entries = self.at(t)?;
        Ok(entries.into_iter().filter(|e| filter.matches(e)).collect())
    }

    pub fn nearest(&self, t: f64, tol: Option<i64>) -> Result<Option<TradeEntry>, StoreError> {
        let t = validated_timestamp(t)?;
        let tol = tol.unwrap_or(self.config.nearest_tolerance_ms);
        Ok(self.store.nearest(t, tol))
    }

    /// The last entry of `[t - lookback, t)`, or absent.
    pub fn first_before(&self, t: i64, lookback: Option<i64>) -> Option<TradeEntry> {
        let lookback = lookback.unwrap_or(self.config.first_before_lookback_ms);
        let slice = self
            .store
            .range(t - lookback, t, &EntryFilter::default(), None);
        slice.into_iter().last()
    }

    /// The first entry of `[t+1, t+lookahead)`.
    pub fn first_after(&self, t: i64, lookahead: Option<i64>) -> Option<TradeEntry> {
        let lookahead = lookahead.unwrap_or(self.config.first_after_lookahead_ms);
        let slice = self
            .store
            .range(t + 1, t + 1 + lookahead, &EntryFilter::default(), Some(1));
        slice.into_iter().next()
    }

    /// Walks `[start, end)` once, producing count / per-side count and
    /// volume / total volume / mean / min / max price. An empty range yields
    /// all zeros.
    pub fn aggregates(&self, start: i64, end: i64) -> Result<Aggregates, StoreError> {
        if start >= end {
            return Err(StoreError::InvalidArgument(format!(
                "start ({start}) must be < end ({end})"
            )));
        }
        let entries = self.store.range(start, end, &EntryFilter::default(), None);
        if entries.is_empty() {
            return Ok(Aggregates::empty());
        }

        let mut agg = Aggregates::empty();
        agg.count = entries.len();
        agg.min_price = f64::INFINITY;
        agg.max_price = f64::NEG_INFINITY;
        let mut price_sum = 0.0;

        for entry in &entries {
            match entry.side {
                Side::Buy => {
                    agg.buy_count += 1;
                    agg.buy_volume += entry.size;
                }
                Side::Sell => {
                    agg.sell_count += 1;
                    agg.sell_volume += entry.size;
                }
            }
            agg.total_volume += entry.size;
            price_sum += entry.price;
            agg.min_price = agg.min_price.min(entry.price);
            agg.max_price = agg.max_price.max(entry.price);
        }
        agg.mean_price = price_sum / entries.len() as f64;

        Ok(agg)
    }

    /// Fans out to [`QueryApi::by_range`] for each `(start, end)` pair,
    /// keyed by the literal string `"{start}-{end}"`. If two inputs collide
    /// on that key, the later overwrites.
    pub fn batch_by_range(
        &self,
        ranges: &[(i64, i64)],
        filter: &EntryFilter,
        limit: Option<usize>,
    ) -> HashMap<String, Result<Vec<TradeEntry>, StoreError>> {
        let mut out = HashMap::new();
        for &(start, end) in ranges {
            let key = format!("{start}-{end}");
            out.insert(key, self.by_range(start, end, filter, limit));
        }
        out
    }
}

fn validated_timestamp(t: f64) -> Result<i64, StoreError> {
    if !t.is_finite() {
        return Err(StoreError::InvalidArgument(format!(
            "timestamp must be finite, got {t}"
        )));
    }
    Ok(t as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn entry(ts: i64, side: Side, price: f64, size: f64, source: &str) -> TradeEntry {
        TradeEntry {
            timestamp: ts,
            price,
            size,
            side,
            source: source.to_string(),
        }
    }

    fn api() -> QueryApi {
        QueryApi::new(Store::new(), QueryConfig::default())
    }

    #[test]
    fn by_range_rejects_start_ge_end() {
        let q = api();
        assert!(q.by_range(10, 10, &EntryFilter::default(), None).is_err());
        assert!(q.by_range(10, 5, &EntryFilter::default(), None).is_err());
    }

    #[test]
    fn at_rejects_nan() {
        let q = api();
        assert!(q.at(f64::NAN).is_err());
        assert!(q.nearest(f64::NAN, None).is_err());
    }

    #[test]
    fn first_before_and_after_use_default_windows() {
        let q = api();
        q.store().insert(entry(1_000, Side::Buy, 1.0, 1.0, "A"));
        q.store().insert(entry(5_000, Side::Sell, 2.0, 1.0, "B"));
        q.store().insert(entry(10_000, Side::Buy, 3.0, 1.0, "C"));

        let before = q.first_before(6_000, None).unwrap();
        assert_eq!(before.source, "B");

        let after = q.first_after(1_000, None).unwrap();
        assert_eq!(after.source, "B");
    }

    #[rstest]
    #[case(0, 10, 0)]
    #[case(100, 200, 2)]
    fn aggregates_count_matches_range(#[case] start: i64, #[case] end: i64, #[case] expected: usize) {
        let q = api();
        q.store().insert(entry(100, Side::Buy, 10.0, 1.0, "A"));
        q.store().insert(entry(150, Side::Sell, 20.0, 2.0, "B"));

        let agg = q.aggregates(start, end).unwrap();
        assert_eq!(agg.count, expected);
    }

    #[test]
    fn aggregates_empty_range_is_all_zero() {
        let q = api();
        let agg = q.aggregates(0, 1).unwrap();
        assert_eq!(agg.count, 0);
        assert_eq!(agg.mean_price, 0.0);
        assert_eq!(agg.min_price, 0.0);
        assert_eq!(agg.max_price, 0.0);
    }

    #[test]
    fn aggregates_computes_volume_and_price_stats() {
        let q = api();
        q.store().insert(entry(100, Side::Buy, 10.0, 1.0, "A"));
        q.store().insert(entry(101, Side::Sell, 30.0, 3.0, "B"));

        let agg = q.aggregates(0, 1000).unwrap();
        assert_eq!(agg.count, 2);
        assert_eq!(agg.buy_count, 1);
        assert_eq!(agg.sell_count, 1);
        assert_eq!(agg.buy_volume, 1.0);
        assert_eq!(agg.sell_volume, 3.0);
        assert_eq!(agg.total_volume, 4.0);
        assert_eq!(agg.mean_price, 20.0);
        assert_eq!(agg.min_price, 10.0);
        assert_eq!(agg.max_price, 30.0);
    }

    #[test]
    fn batch_by_range_collides_on_duplicate_key() {
        let q = api();
        q.store().insert(entry(5, Side::Buy, 1.0, 1.0, "A"));
        let results = q.batch_by_range(&[(0, 10), (0, 10)], &EntryFilter::default(), None);
        assert_eq!(results.len(), 1);
        assert!(results.contains_key("0-10"));
    }
}
