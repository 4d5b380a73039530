//! Domain-specific assertion macros for trade-index harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear *what* trade-index invariant was violated.

/// Assert that an entry has the expected side.
///
/// ```rust
/// assert_side!(entry, Side::Buy);
/// ```
#[macro_export]
macro_rules! assert_side {
    ($entry:expr, $side:expr) => {{
        let entry: &trade_index::TradeEntry = &$entry;
        let expected: trade_index::Side = $side;
        if entry.side != expected {
            panic!(
                "assert_side! failed:\n  expected: {:?}\n  actual:   {:?}\n  timestamp: {}",
                expected, entry.side, entry.timestamp
            );
        }
    }};
}

/// Assert that a timestamp falls within `[start, end)`.
#[macro_export]
macro_rules! assert_in_range {
    ($timestamp:expr, $start:expr, $end:expr) => {{
        let ts: i64 = $timestamp;
        let start: i64 = $start;
        let end: i64 = $end;
        if !(ts >= start && ts < end) {
            panic!(
                "assert_in_range! failed: {} not in [{}, {})",
                ts, start, end
            );
        }
    }};
}

/// Assert that a slice of entries is sorted ascending by timestamp.
#[macro_export]
macro_rules! assert_entries_sorted {
    ($entries:expr) => {{
        let entries: &[trade_index::TradeEntry] = &$entries;
        for window in entries.windows(2) {
            if window[0].timestamp > window[1].timestamp {
                panic!(
                    "assert_entries_sorted! failed: {} appears before {}",
                    window[0].timestamp, window[1].timestamp
                );
            }
        }
    }};
}

/// Assert that every entry in a result set satisfies a predicate.
#[macro_export]
macro_rules! assert_entries_all {
    ($entries:expr, $pred:expr) => {{
        let entries: &[trade_index::TradeEntry] = &$entries;
        let pred = $pred;
        let failing: Vec<_> = entries.iter().filter(|e| !pred(e)).collect();
        if !failing.is_empty() {
            panic!(
                "assert_entries_all! failed: {} of {} entries did not satisfy predicate.",
                failing.len(),
                entries.len()
            );
        }
    }};
}
