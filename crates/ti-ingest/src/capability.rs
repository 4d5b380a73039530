//! Capability interfaces the ingestion core consumes: an object-store client
//! (list / get) and a notification-queue client (receive / ack). Per spec
//! §6, these are external collaborators — the real S3/SQS wiring is not
//! part of this crate. Any implementation of these traits (cloud-backed or,
//! for tests and the CLI demo, the reference adapters in [`crate::fsstore`]
//! and [`crate::chanqueue`]) satisfies the core.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;

/// One page of an object listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub keys: Vec<String>,
    pub continuation: Option<String>,
}

/// One message received from a notification queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub body: String,
    pub ack_handle: String,
}

/// `list(prefix, continuation?) -> {keys[], continuation?}` and
/// `get(key) -> bytes`, both of which may fail.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    async fn list(&self, prefix: &str, continuation: Option<String>) -> anyhow::Result<ListPage>;
    async fn get(&self, key: &str) -> anyhow::Result<Bytes>;
}

/// `receive(max_messages, wait_seconds) -> [{body, ack_handle}]` and
/// `ack(ack_handle)`.
#[async_trait]
pub trait NotificationQueueClient: Send + Sync {
    async fn receive(&self, max_messages: usize, wait_seconds: u64) -> anyhow::Result<Vec<QueueMessage>>;
    async fn ack(&self, ack_handle: &str) -> anyhow::Result<()>;
}

/// The subset of an S3-style event-notification body this crate consumes:
/// `{"Records": [{"s3": {"object": {"key": <string>}}}, ...]}`. Other
/// fields are ignored.
#[derive(Debug, Deserialize)]
pub struct NotificationBody {
    #[serde(rename = "Records", default)]
    pub records: Vec<NotificationRecord>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationRecord {
    pub s3: S3Field,
}

#[derive(Debug, Deserialize)]
pub struct S3Field {
    pub object: ObjectField,
}

#[derive(Debug, Deserialize)]
pub struct ObjectField {
    pub key: String,
}

impl NotificationBody {
    /// The candidate object keys carried by this notification body.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.s3.object.key.as_str())
    }
}
