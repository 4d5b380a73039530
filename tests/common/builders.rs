//! Test builders — ergonomic constructors for `TradeEntry` fixtures.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use trade_index::{Side, TradeEntry};

/// Fluent builder for [`TradeEntry`] test fixtures.
///
/// # Example
///
/// ```rust
/// let entry = TradeEntryBuilder::new(1_700_000_000_000)
///     .price(101.5)
///     .side(Side::Sell)
///     .source("exchange-a")
///     .build();
/// ```
pub struct TradeEntryBuilder {
    timestamp: i64,
    price: f64,
    size: f64,
    side: Side,
    source: String,
}

impl TradeEntryBuilder {
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            price: 100.0,
            size: 1.0,
            side: Side::Buy,
            source: "test-source".to_string(),
        }
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn build(self) -> TradeEntry {
        TradeEntry {
            timestamp: self.timestamp,
            price: self.price,
            size: self.size,
            side: self.side,
            source: self.source,
        }
    }
}

/// Build a buy entry at `timestamp` from `source`.
pub fn buy(timestamp: i64, source: &str) -> TradeEntry {
    TradeEntryBuilder::new(timestamp).side(Side::Buy).source(source).build()
}

/// Build a sell entry at `timestamp` from `source`.
pub fn sell(timestamp: i64, source: &str) -> TradeEntry {
    TradeEntryBuilder::new(timestamp).side(Side::Sell).source(source).build()
}

/// Build a corpus of `n` entries spaced `step_ms` apart starting at `base`,
/// alternating buy/sell and cycling across two sources.
pub fn build_corpus(base: i64, n: usize, step_ms: i64) -> Vec<TradeEntry> {
    (0..n)
        .map(|i| {
            let ts = base + i as i64 * step_ms;
            let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
            let source = if i % 3 == 0 { "alpha" } else { "beta" };
            TradeEntryBuilder::new(ts)
                .side(side)
                .source(source)
                .price(100.0 + (i % 17) as f64)
                .size(1.0 + (i % 5) as f64)
                .build()
        })
        .collect()
}
