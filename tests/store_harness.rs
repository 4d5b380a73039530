//! Store layer integration harness.
//!
//! # What this covers
//!
//! - Concurrent writers across multiple buckets don't deadlock, panic, or
//!   drop entries.
//! - Subscription delivery is observable end-to-end under concurrent
//!   producers.
//! - Property: for any sequence of n inserts, `stats().total_entries == n`
//!   and every entry returned by a full-range scan is one that was inserted.
//!
//! # Running
//!
//! ```sh
//! cargo test --test store_harness
//! ```

mod common;
use common::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proptest::prelude::*;
use trade_index::{EntryFilter, Side, Store};

const BASE: i64 = 1_700_000_000_000;

#[tokio::test]
async fn concurrent_writers_across_buckets_do_not_lose_entries() {
    let store = Store::new();
    let mut handles = Vec::new();

    for writer in 0..8i64 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..200i64 {
                let ts = BASE + (writer * 200 + i) * 60_000; // one bucket apart
                store.insert(TradeEntryBuilder::new(ts).source(format!("w{writer}")).build());
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.stats().total_entries, 1_600);
    let all = store.range(BASE, BASE + 1_600 * 60_000, &EntryFilter::default(), None);
    assert_eq!(all.len(), 1_600);
    assert_entries_sorted!(all);
}

#[tokio::test]
async fn subscriber_observes_every_concurrently_inserted_entry() {
    let store = Store::new();
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = count.clone();
    let _handle = store.subscribe_entry(move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });

    let mut handles = Vec::new();
    for writer in 0..4i64 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..100i64 {
                let ts = BASE + (writer * 100 + i) * 1_000;
                store.insert(buy(ts, "x"));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(count.load(Ordering::SeqCst), 400);
    assert_eq!(store.stats().total_entries, 400);
}

#[test]
fn batch_and_single_insert_agree_on_final_state() {
    let via_single = Store::new();
    let via_batch = Store::new();
    let corpus = build_corpus(BASE, 500, 137);

    for entry in corpus.clone() {
        via_single.insert(entry);
    }
    via_batch.insert_batch(corpus);

    let single_stats = via_single.stats();
    let batch_stats = via_batch.stats();
    assert_eq!(single_stats.total_entries, batch_stats.total_entries);
    assert_eq!(single_stats.bucket_count, batch_stats.bucket_count);
    assert_eq!(single_stats.earliest, batch_stats.earliest);
    assert_eq!(single_stats.latest, batch_stats.latest);
}

proptest! {
    #[test]
    fn prop_total_entries_matches_insert_count(n in 0usize..500, step in 1i64..5_000) {
        let store = Store::new();
        for i in 0..n {
            store.insert(buy(BASE + i as i64 * step, "p"));
        }
        prop_assert_eq!(store.stats().total_entries, n);
    }

    #[test]
    fn prop_full_range_scan_returns_exactly_what_was_inserted(n in 0usize..300, step in 1i64..3_000) {
        let store = Store::new();
        for i in 0..n {
            store.insert(buy(BASE + i as i64 * step, "p"));
        }
        let scanned = store.range(BASE, BASE + n as i64 * step + 1, &EntryFilter::default(), None);
        prop_assert_eq!(scanned.len(), n);
    }
}
