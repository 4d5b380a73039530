//! In-memory test fakes for [`ObjectStoreClient`] and
//! [`NotificationQueueClient`], distinct from the filesystem/channel
//! reference adapters in [`crate::fsstore`]/[`crate::chanqueue`] — these
//! never touch the filesystem or a real channel, and let tests inject
//! transport failures deterministically. Available to this crate's own
//! unit tests unconditionally, and to downstream crates under the
//! `testing` feature.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use crate::capability::{ListPage, NotificationQueueClient, ObjectStoreClient, QueueMessage};

/// A pure in-memory object store keyed by full key path, with a
/// configurable page size and the ability to force `list`/`get` to fail on
/// demand (to exercise the coordinator's partial-failure accounting).
pub struct InMemoryObjectStore {
    objects: Mutex<BTreeMap<String, Bytes>>,
    page_size: usize,
    fail_list_once: Mutex<bool>,
    fail_get_keys: Mutex<Vec<String>>,
}

impl InMemoryObjectStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            page_size,
            fail_list_once: Mutex::new(false),
            fail_get_keys: Mutex::new(Vec::new()),
        }
    }

    pub fn put(&self, key: impl Into<String>, body: impl Into<Bytes>) {
        self.objects.lock().unwrap().insert(key.into(), body.into());
    }

    pub fn fail_next_list(&self) {
        *self.fail_list_once.lock().unwrap() = true;
    }

    pub fn fail_get(&self, key: impl Into<String>) {
        self.fail_get_keys.lock().unwrap().push(key.into());
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new(50)
    }
}

#[async_trait]
impl ObjectStoreClient for InMemoryObjectStore {
    async fn list(&self, prefix: &str, continuation: Option<String>) -> anyhow::Result<ListPage> {
        {
            let mut flag = self.fail_list_once.lock().unwrap();
            if *flag {
                *flag = false;
                anyhow::bail!("simulated list failure");
            }
        }

        let all: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();

        let start = continuation.and_then(|t| t.parse::<usize>().ok()).unwrap_or(0);
        let end = (start + self.page_size).min(all.len());
        let keys = all[start..end].to_vec();
        let continuation = if end < all.len() {
            Some(end.to_string())
        } else {
            None
        };
        Ok(ListPage { keys, continuation })
    }

    async fn get(&self, key: &str) -> anyhow::Result<Bytes> {
        if self.fail_get_keys.lock().unwrap().iter().any(|k| k == key) {
            anyhow::bail!("simulated get failure for {key}");
        }
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such object: {key}"))
    }
}

/// A queue fake whose `receive` returns a fixed, caller-supplied sequence of
/// batches (one batch per call), so a test can script exact notification
/// delivery including duplicates and re-deliveries.
pub struct ScriptedQueue {
    batches: Mutex<Vec<Vec<String>>>,
    acked: Mutex<Vec<String>>,
}

impl ScriptedQueue {
    pub fn new(batches: Vec<Vec<String>>) -> Self {
        Self {
            batches: Mutex::new(batches),
            acked: Mutex::new(Vec::new()),
        }
    }

    pub fn acked_handles(&self) -> Vec<String> {
        self.acked.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationQueueClient for ScriptedQueue {
    async fn receive(&self, max_messages: usize, _wait_seconds: u64) -> anyhow::Result<Vec<QueueMessage>> {
        let bodies = {
            let mut batches = self.batches.lock().unwrap();
            if batches.is_empty() {
                None
            } else {
                Some(batches.remove(0))
            }
        };
        let Some(bodies) = bodies else {
            // Nothing left to deliver; simulate an indefinite long-poll with
            // a short real sleep so callers awaiting this don't busy-spin.
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            return Ok(Vec::new());
        };
        Ok(bodies
            .into_iter()
            .take(max_messages)
            .enumerate()
            .map(|(i, body)| QueueMessage {
                body,
                ack_handle: format!("ack-{i}"),
            })
            .collect())
    }

    async fn ack(&self, ack_handle: &str) -> anyhow::Result<()> {
        self.acked.lock().unwrap().push(ack_handle.to_string());
        Ok(())
    }
}
