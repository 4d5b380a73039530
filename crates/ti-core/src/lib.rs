//! ti-core — the bucketed time-series store and query API for trade-index.
//!
//! # Architecture
//!
//! ```text
//! Store ──► Query API
//! ```
//!
//! `Store` is the single source of truth for all trade entries; `QueryApi`
//! is a validated façade over it. Both are consumed by `ti-ingest`'s loader
//! and coordinator, which live in a separate crate so the store has no
//! dependency on object-store or notification-queue concerns.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod keys;
pub mod query;
pub mod store;
pub mod types;

pub use config::Config;
pub use diagnostics::{DiagnosticEvent, DiagnosticSource, Diagnostics};
pub use error::StoreError;
pub use query::{Aggregates, QueryApi};
pub use store::{Store, StoreStats, SubscriptionHandle};
pub use types::{EntryFilter, Side, TradeEntry};
