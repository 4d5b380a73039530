//! Store — the one-minute-bucketed in-memory container of [`TradeEntry`]
//! values, with ordered insertion, range/point/nearest retrieval, running
//! aggregates, and a publish/subscribe bus over new entries.
//!
//! The bucket map is a `BTreeMap<i64, Vec<TradeEntry>>` guarded by a single
//! `RwLock`: read operations (`range`, `at`, `nearest`, `stats`) take the
//! read guard; write operations (`insert`, `insert_batch`, `clear`) take the
//! write guard and deliver subscriber events synchronously, after the
//! mutation is visible, while still holding that guard.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use crate::config::BUCKET_WIDTH_MS;
use crate::diagnostics::{Diagnostics, DiagnosticSource};
use crate::types::{EntryFilter, TradeEntry};

/// Rough fixed-size-per-entry accounting for [`StoreStats::estimated_bytes`].
/// Not a contract on the exact value — only that it is monotone in
/// `total_entries`.
const ESTIMATED_BYTES_PER_ENTRY: usize = 128;

fn bucket_of(timestamp: i64) -> i64 {
    timestamp.div_euclid(BUCKET_WIDTH_MS)
}

/// First index `i` in `entries` such that `entries[i].timestamp >= target`.
fn lower_bound(entries: &[TradeEntry], target: i64) -> usize {
    entries.partition_point(|e| e.timestamp < target)
}

/// First index `i` in `entries` such that `entries[i].timestamp > target`.
/// Used for insertion so that ties land after existing equal-timestamp
/// entries (first-inserted-first).
fn upper_bound(entries: &[TradeEntry], target: i64) -> usize {
    entries.partition_point(|e| e.timestamp <= target)
}

/// Snapshot of the store's derived aggregates, returned by [`Store::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub total_entries: usize,
    pub bucket_count: usize,
    pub earliest: Option<i64>,
    pub latest: Option<i64>,
    pub estimated_bytes: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Topic {
    Entry,
    Batch,
}

struct Subscriber<F: ?Sized> {
    id: u64,
    callback: Box<F>,
}

type EntryCallback = dyn Fn(&TradeEntry) + Send + Sync;
type BatchCallback = dyn Fn(&[TradeEntry]) + Send + Sync;

struct Inner {
    buckets: BTreeMap<i64, Vec<TradeEntry>>,
    total_count: usize,
    min_timestamp: Option<i64>,
    max_timestamp: Option<i64>,
    entry_subs: Vec<Subscriber<EntryCallback>>,
    batch_subs: Vec<Subscriber<BatchCallback>>,
}

impl Inner {
    fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            total_count: 0,
            min_timestamp: None,
            max_timestamp: None,
            entry_subs: Vec::new(),
            batch_subs: Vec::new(),
        }
    }

    fn note_inserted(&mut self, timestamp: i64) {
        self.total_count += 1;
        self.min_timestamp = Some(self.min_timestamp.map_or(timestamp, |m| m.min(timestamp)));
        self.max_timestamp = Some(self.max_timestamp.map_or(timestamp, |m| m.max(timestamp)));
    }

    fn insert_one(&mut self, entry: TradeEntry) {
        let k = bucket_of(entry.timestamp);
        let bucket = self.buckets.entry(k).or_default();
        let i = upper_bound(bucket, entry.timestamp);
        self.note_inserted(entry.timestamp);
        bucket.insert(i, entry);
    }
}

/// Cancellation handle returned by [`Store::subscribe_entry`] and
/// [`Store::subscribe_batch`]. Cancellation is idempotent: calling
/// [`SubscriptionHandle::cancel`] more than once, or after the store has
/// been dropped, is a no-op.
pub struct SubscriptionHandle {
    inner: Weak<RwLock<Inner>>,
    topic: Topic,
    id: u64,
}

impl SubscriptionHandle {
    pub fn cancel(&self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut guard = inner.write().expect("store lock poisoned");
        match self.topic {
            Topic::Entry => guard.entry_subs.retain(|s| s.id != self.id),
            Topic::Batch => guard.batch_subs.retain(|s| s.id != self.id),
        }
    }
}

/// The bucketed time-series store. Cheap to clone — clones share the same
/// underlying state (an `Arc<RwLock<Inner>>`).
#[derive(Clone)]
pub struct Store {
    inner: Arc<RwLock<Inner>>,
    diagnostics: Diagnostics,
    next_sub_id: Arc<AtomicU64>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::with_diagnostics(Diagnostics::new())
    }

    /// Construct a store that reports subscriber-callback failures to an
    /// externally-owned [`Diagnostics`] handle (e.g. one shared with an
    /// ingestion coordinator).
    pub fn with_diagnostics(diagnostics: Diagnostics) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::new())),
            diagnostics,
            next_sub_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Insert a single entry. The entry is observable to subsequent queries
    /// and delivered to all entry-subscribers before this call returns.
    pub fn insert(&self, entry: TradeEntry) {
        let mut guard = self.inner.write().expect("store lock poisoned");
        guard.insert_one(entry.clone());
        self.notify_entry(&guard, &entry);
    }

    /// Insert a batch of entries. All entries are observable before this
    /// call returns; exactly one batch-event is delivered, carrying the
    /// sequence sorted by timestamp ascending (stable; within-batch ties
    /// preserve input order).
    ///
    /// A batch entry that lands in a bucket with pre-existing (or
    /// earlier-in-batch) entries is inserted at its correct sorted
    /// position within that bucket, not appended blindly — so a batch that
    /// interleaves with existing bucket contents out of order is still
    /// correct.
    pub fn insert_batch(&self, mut entries: Vec<TradeEntry>) {
        if entries.is_empty() {
            return;
        }
        entries.sort_by_key(|e| e.timestamp);

        let mut guard = self.inner.write().expect("store lock poisoned");
        for entry in &entries {
            guard.insert_one(entry.clone());
        }
        self.notify_batch(&guard, &entries);
    }

    /// Entries in `[start, end)`, ascending by timestamp, matching `filter`,
    /// truncated to `limit` if set.
    pub fn range(
        &self,
        start: i64,
        end: i64,
        filter: &EntryFilter,
        limit: Option<usize>,
    ) -> Vec<TradeEntry> {
        let mut results = Vec::new();
        if start >= end {
            return results;
        }
        let guard = self.inner.read().expect("store lock poisoned");
        let k0 = bucket_of(start);
        let k1 = bucket_of(end - 1);

        for (&k, bucket) in guard.buckets.range(k0..=k1) {
            let start_idx = if k == k0 { lower_bound(bucket, start) } else { 0 };
            for entry in &bucket[start_idx..] {
                if entry.timestamp >= end {
                    break;
                }
                if !filter.matches(entry) {
                    continue;
                }
                results.push(entry.clone());
                if let Some(limit) = limit {
                    if results.len() >= limit {
                        return results;
                    }
                }
            }
        }
        results
    }

    /// All entries with `timestamp == t`, in insertion order.
    pub fn at(&self, t: i64) -> Vec<TradeEntry> {
        let guard = self.inner.read().expect("store lock poisoned");
        let k = bucket_of(t);
        let Some(bucket) = guard.buckets.get(&k) else {
            return Vec::new();
        };
        let start = lower_bound(bucket, t);
        bucket[start..]
            .iter()
            .take_while(|e| e.timestamp == t)
            .cloned()
            .collect()
    }

    /// The entry with `|timestamp - t| <= tol` minimizing that distance.
    /// Ties prefer the later (`>= t`) candidate.
    pub fn nearest(&self, t: i64, tol: i64) -> Option<TradeEntry> {
        let guard = self.inner.read().expect("store lock poisoned");
        let k = bucket_of(t);

        let mut best: Option<(i64, TradeEntry)> = None;
        let consider = |best: &mut Option<(i64, TradeEntry)>, candidate: Option<&TradeEntry>| {
            let Some(c) = candidate else { return };
            let d = (c.timestamp - t).abs();
            if d > tol {
                return;
            }
            match best {
                Some((bd, _)) if d >= *bd => {}
                _ => *best = Some((d, c.clone())),
            }
        };

        if let Some(bucket) = guard.buckets.get(&k) {
            let idx = lower_bound(bucket, t);
            consider(&mut best, bucket.get(idx));
            consider(&mut best, idx.checked_sub(1).and_then(|i| bucket.get(i)));
        }

        if best.is_none() {
            let after = guard
                .buckets
                .get(&(k + 1))
                .and_then(|b| b.first());
            consider(&mut best, after);
            let before = guard.buckets.get(&(k - 1)).and_then(|b| b.last());
            consider(&mut best, before);
        }

        best.map(|(_, entry)| entry)
    }

    pub fn stats(&self) -> StoreStats {
        let guard = self.inner.read().expect("store lock poisoned");
        StoreStats {
            total_entries: guard.total_count,
            bucket_count: guard.buckets.len(),
            earliest: guard.min_timestamp,
            latest: guard.max_timestamp,
            estimated_bytes: guard.total_count * ESTIMATED_BYTES_PER_ENTRY,
        }
    }

    /// Reset all buckets and aggregates. Does not affect subscriptions.
    pub fn clear(&self) {
        let mut guard = self.inner.write().expect("store lock poisoned");
        guard.buckets.clear();
        guard.total_count = 0;
        guard.min_timestamp = None;
        guard.max_timestamp = None;
    }

    /// Subscribe to the per-entry topic; `callback` is invoked once per
    /// subsequent [`Store::insert`] call.
    pub fn subscribe_entry<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&TradeEntry) + Send + Sync + 'static,
    {
        let id = self.next_sub_id.fetch_add(1, Ordering::Relaxed);
        let mut guard = self.inner.write().expect("store lock poisoned");
        guard.entry_subs.push(Subscriber {
            id,
            callback: Box::new(callback),
        });
        SubscriptionHandle {
            inner: Arc::downgrade(&self.inner),
            topic: Topic::Entry,
            id,
        }
    }

    /// Subscribe to the batch topic; `callback` is invoked once per
    /// subsequent [`Store::insert_batch`] call, with the sorted sequence.
    pub fn subscribe_batch<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&[TradeEntry]) + Send + Sync + 'static,
    {
        let id = self.next_sub_id.fetch_add(1, Ordering::Relaxed);
        let mut guard = self.inner.write().expect("store lock poisoned");
        guard.batch_subs.push(Subscriber {
            id,
            callback: Box::new(callback),
        });
        SubscriptionHandle {
            inner: Arc::downgrade(&self.inner),
            topic: Topic::Batch,
            id,
        }
    }

    fn notify_entry(&self, guard: &Inner, entry: &TradeEntry) {
        for sub in &guard.entry_subs {
            let result = panic::catch_unwind(AssertUnwindSafe(|| (sub.callback)(entry)));
            if let Err(payload) = result {
                self.diagnostics.record(
                    DiagnosticSource::SubscriberCallback,
                    panic_message(&payload),
                );
            }
        }
    }

    fn notify_batch(&self, guard: &Inner, entries: &[TradeEntry]) {
        for sub in &guard.batch_subs {
            let result = panic::catch_unwind(AssertUnwindSafe(|| (sub.callback)(entries)));
            if let Err(payload) = result {
                self.diagnostics.record(
                    DiagnosticSource::SubscriberCallback,
                    panic_message(&payload),
                );
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "subscriber callback panicked".to_string()
    }
}
