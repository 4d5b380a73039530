//! trade-index — in-process, in-memory bucketed time-series index for
//! trade events ingested from an object-store pipeline.
//!
//! This crate is a thin façade over two library crates so integration
//! tests and the CLI binary can depend on one name:
//!
//! ```text
//! ti-ingest (loader, coordinator) ──► ti-core (store, query API)
//! ```
//!
//! `ti-core` has no knowledge of object stores or notification queues;
//! `ti-ingest` is the one place those capabilities meet the store.

pub use ti_core::{
    Aggregates, Config, DiagnosticEvent, DiagnosticSource, Diagnostics, EntryFilter, QueryApi,
    Side, Store, StoreError, StoreStats, SubscriptionHandle, TradeEntry,
};
pub use ti_ingest::{
    BackfillEntry, BackfillResult, ChannelQueue, ChannelQueueSender, Coordinator,
    CoordinatorStatus, FsObjectStore, ListPage, LoadError, NotificationBody,
    NotificationQueueClient, ObjectStoreClient, QueueMessage, load_object,
};
