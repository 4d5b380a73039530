//! ti-ingest — object loader and ingestion coordinator for trade-index.
//!
//! This crate depends on `ti-core` but never the reverse: the store and
//! query API know nothing about object stores or notification queues.
//! `Coordinator` is the one piece that ties an [`ObjectStoreClient`] and
//! an optional [`NotificationQueueClient`] to a `ti_core::store::Store`.

pub mod capability;
pub mod chanqueue;
pub mod coordinator;
pub mod error;
pub mod fsstore;
pub mod loader;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use capability::{
    ListPage, NotificationBody, NotificationQueueClient, ObjectStoreClient, QueueMessage,
};
pub use chanqueue::{ChannelQueue, ChannelQueueSender};
pub use coordinator::{BackfillResult, Coordinator, CoordinatorStatus};
pub use error::{BackfillEntry, LoadError};
pub use fsstore::FsObjectStore;
pub use loader::load_object;
