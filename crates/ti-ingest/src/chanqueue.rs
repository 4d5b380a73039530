//! `ChannelQueue` — an in-process [`NotificationQueueClient`] reference
//! adapter backed by a `tokio::sync::mpsc` channel, standing in for a real
//! notification queue (e.g. SQS). `ack` is a no-op: the channel has already
//! removed the message from its buffer by the time it is received.
//!
//! [`ChannelQueue::sender`] hands out a [`ChannelQueueSender`] that a
//! publisher (the CLI demo, or a test) uses to push raw notification
//! bodies; [`ChannelQueue::receive`] drains up to `max_messages` currently
//! buffered bodies, waiting up to `wait_seconds` for at least one.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::sync::mpsc;

use crate::capability::{NotificationQueueClient, QueueMessage};

/// Publisher handle for a [`ChannelQueue`].
#[derive(Clone)]
pub struct ChannelQueueSender {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelQueueSender {
    /// Push a raw notification body (the `{"Records": [...]}` JSON) onto
    /// the queue.
    pub fn send(&self, body: impl Into<String>) -> anyhow::Result<()> {
        self.tx
            .send(body.into())
            .map_err(|_| anyhow::anyhow!("channel queue receiver dropped"))
    }
}

pub struct ChannelQueue {
    tx: mpsc::UnboundedSender<String>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
    next_ack: std::sync::atomic::AtomicU64,
}

impl ChannelQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
            next_ack: std::sync::atomic::AtomicU64::new(0),
        }
    }

    pub fn sender(&self) -> ChannelQueueSender {
        ChannelQueueSender {
            tx: self.tx.clone(),
        }
    }
}

impl Default for ChannelQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationQueueClient for ChannelQueue {
    async fn receive(&self, max_messages: usize, wait_seconds: u64) -> anyhow::Result<Vec<QueueMessage>> {
        let mut rx = self.rx.lock().await;
        let mut out = Vec::new();

        let first = tokio::time::timeout(Duration::from_secs(wait_seconds), rx.recv()).await;
        match first {
            Ok(Some(body)) => out.push(self.to_message(body)),
            Ok(None) => return Ok(out), // sender dropped; nothing more will arrive
            Err(_) => return Ok(out),   // long-poll wait elapsed with nothing received
        }

        while out.len() < max_messages {
            match rx.try_recv() {
                Ok(body) => out.push(self.to_message(body)),
                Err(_) => break,
            }
        }
        Ok(out)
    }

    async fn ack(&self, _ack_handle: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

impl ChannelQueue {
    fn to_message(&self, body: String) -> QueueMessage {
        let id = self
            .next_ack
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        QueueMessage {
            body,
            ack_handle: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn receives_published_messages_up_to_max() {
        let queue = ChannelQueue::new();
        let sender = queue.sender();
        for i in 0..3 {
            sender.send(format!(r#"{{"n":{i}}}"#)).unwrap();
        }

        let first_batch = queue.receive(2, 1).await.unwrap();
        assert_eq!(first_batch.len(), 2);

        let second_batch = queue.receive(2, 1).await.unwrap();
        assert_eq!(second_batch.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn receive_times_out_with_no_messages() {
        let queue = ChannelQueue::new();
        let batch = queue.receive(10, 20).await.unwrap();
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn duplicate_notification_can_be_sent_twice() {
        let queue = ChannelQueue::new();
        let sender = queue.sender();
        sender.send("same-body").unwrap();
        sender.send("same-body").unwrap();

        let batch = queue.receive(10, 1).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].body, batch[1].body);
    }
}
