//! Ingestion coordinator — drives initial backfill and incremental
//! discovery (event-driven or polling), maintains the processed-object-key
//! set, and routes validated entries into the store.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use ti_core::diagnostics::{Diagnostics, DiagnosticSource};
use ti_core::store::Store;

use crate::capability::{NotificationBody, NotificationQueueClient, ObjectStoreClient};
use crate::error::{BackfillEntry, LoadError};
use crate::loader;

/// Fixed backoff after a transport failure in the event-driven discovery
/// loop, per spec §4.4.
const EVENT_LOOP_BACKOFF: Duration = Duration::from_secs(5);
/// Messages requested per long-poll `receive` call.
const EVENT_LOOP_MAX_MESSAGES: usize = 10;
/// Long-poll wait time per `receive` call.
const EVENT_LOOP_WAIT_SECONDS: u64 = 20;

/// Result of a one-shot [`Coordinator::backfill`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillResult {
    pub files_processed: usize,
    pub entries_loaded: usize,
    pub errors: Vec<BackfillEntry>,
}

/// Observable coordinator lifecycle state, per spec §4.4's
/// `{idle -> watching -> stopped}` state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorStatus {
    Idle,
    Watching,
    Stopped,
}

struct Driver {
    handle: JoinHandle<()>,
    stop_flag: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

enum State {
    Idle,
    Watching(Driver),
    Stopped,
}

struct Shared {
    object_store: Arc<dyn ObjectStoreClient>,
    queue: Option<Arc<dyn NotificationQueueClient>>,
    store: Store,
    prefix: String,
    polling_interval: Duration,
    processed: AsyncMutex<HashSet<String>>,
    diagnostics: Diagnostics,
}

/// Drives backfill and incremental discovery for one object-store prefix
/// into one [`Store`]. Cheap to clone — clones share the same state.
#[derive(Clone)]
pub struct Coordinator {
    shared: Arc<Shared>,
    state: Arc<AsyncMutex<State>>,
}

impl Coordinator {
    pub fn new(
        store: Store,
        object_store: Arc<dyn ObjectStoreClient>,
        queue: Option<Arc<dyn NotificationQueueClient>>,
        prefix: impl Into<String>,
        polling_interval: Duration,
    ) -> Self {
        let diagnostics = store.diagnostics().clone();
        Self {
            shared: Arc::new(Shared {
                object_store,
                queue,
                store,
                prefix: prefix.into(),
                polling_interval,
                processed: AsyncMutex::new(HashSet::new()),
                diagnostics,
            }),
            state: Arc::new(AsyncMutex::new(State::Idle)),
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.shared.diagnostics
    }

    pub async fn processed_count(&self) -> usize {
        self.shared.processed.lock().await.len()
    }

    pub async fn status(&self) -> CoordinatorStatus {
        match *self.state.lock().await {
            State::Idle => CoordinatorStatus::Idle,
            State::Watching(_) => CoordinatorStatus::Watching,
            State::Stopped => CoordinatorStatus::Stopped,
        }
    }

    /// Paginate the object listing under the configured prefix, loading and
    /// inserting every new `.json` key. Continues through per-object
    /// failures, recording them rather than aborting.
    pub async fn backfill(&self) -> BackfillResult {
        let mut result = BackfillResult::default();
        let mut continuation: Option<String> = None;

        loop {
            let page = match self
                .shared
                .object_store
                .list(&self.shared.prefix, continuation.clone())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    result.errors.push(BackfillEntry {
                        key: self.shared.prefix.clone(),
                        message: e.to_string(),
                    });
                    break;
                }
            };

            for key in &page.keys {
                if !key.ends_with(".json") {
                    continue;
                }
                match self.admit_and_load(key).await {
                    None => {}
                    Some(Ok(n)) => {
                        result.files_processed += 1;
                        result.entries_loaded += n;
                    }
                    Some(Err(e)) => result.errors.push(BackfillEntry {
                        key: key.clone(),
                        message: e.to_string(),
                    }),
                }
            }

            continuation = page.continuation;
            if continuation.is_none() {
                break;
            }
        }

        info!(
            files_processed = result.files_processed,
            entries_loaded = result.entries_loaded,
            errors = result.errors.len(),
            "backfill complete"
        );
        result
    }

    /// Transition `idle`/`stopped` -> `watching` and spawn the appropriate
    /// discovery driver (event-driven if a queue is configured, polling
    /// otherwise). Re-entrant: calling while already watching is a no-op.
    pub async fn start_watching(&self) {
        let mut state = self.state.lock().await;
        if matches!(*state, State::Watching(_)) {
            return;
        }

        let stop_flag = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(Notify::new());
        let shared = self.shared.clone();
        let coordinator = self.clone();

        let handle = if shared.queue.is_some() {
            let stop_flag = stop_flag.clone();
            let wake = wake.clone();
            tokio::spawn(async move { coordinator.event_loop(stop_flag, wake).await })
        } else {
            let stop_flag = stop_flag.clone();
            let wake = wake.clone();
            tokio::spawn(async move { coordinator.polling_loop(stop_flag, wake).await })
        };

        *state = State::Watching(Driver {
            handle,
            stop_flag,
            wake,
        });
    }

    /// Transition `watching` -> `stopped`: sets the cooperative stop flag
    /// (observed at each loop head), wakes any pending sleep/long-poll
    /// select, and awaits the driver task so this call only returns once
    /// the loop has observably exited. No-op if not currently watching.
    pub async fn stop_watching(&self) {
        let driver = {
            let mut state = self.state.lock().await;
            match std::mem::replace(&mut *state, State::Stopped) {
                State::Watching(driver) => Some(driver),
                other => {
                    *state = other;
                    None
                }
            }
        };

        let Some(driver) = driver else { return };
        driver.stop_flag.store(true, Ordering::SeqCst);
        driver.wake.notify_waiters();
        if let Err(e) = driver.handle.await {
            warn!(error = %e, "coordinator driver task panicked");
        }
    }

    /// Admit `key` exactly once per process lifetime: the set-membership
    /// test, load-and-insert, and set-add are one critical section guarded
    /// by `processed`, so concurrent first-time notifications for the same
    /// key serialize rather than race. Returns `None` if `key` was already
    /// processed.
    async fn admit_and_load(&self, key: &str) -> Option<Result<usize, LoadError>> {
        let mut processed = self.shared.processed.lock().await;
        if processed.contains(key) {
            return None;
        }

        let result = loader::load_object(key, self.shared.object_store.as_ref()).await;
        let outcome = result.map(|entries| {
            let n = entries.len();
            if n > 0 {
                self.shared.store.insert_batch(entries);
            }
            n
        });

        if outcome.is_ok() {
            processed.insert(key.to_string());
        }
        Some(outcome)
    }

    async fn relist_and_insert(&self) {
        let mut continuation: Option<String> = None;
        loop {
            let page = match self
                .shared
                .object_store
                .list(&self.shared.prefix, continuation.clone())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    self.shared
                        .diagnostics
                        .record(DiagnosticSource::CoordinatorTransport, e.to_string());
                    return;
                }
            };

            for key in &page.keys {
                if !key.ends_with(".json") {
                    continue;
                }
                if let Some(Err(e)) = self.admit_and_load(key).await {
                    self.shared
                        .diagnostics
                        .record(DiagnosticSource::CoordinatorTransport, e.to_string());
                }
            }

            continuation = page.continuation;
            if continuation.is_none() {
                break;
            }
        }
    }

    async fn polling_loop(self, stop_flag: Arc<AtomicBool>, wake: Arc<Notify>) {
        loop {
            if stop_flag.load(Ordering::SeqCst) {
                break;
            }
            self.relist_and_insert().await;
            if stop_flag.load(Ordering::SeqCst) {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.shared.polling_interval) => {}
                _ = wake.notified() => {}
            }
        }
        debug!("polling loop stopped");
    }

    async fn event_loop(self, stop_flag: Arc<AtomicBool>, wake: Arc<Notify>) {
        let Some(queue) = self.shared.queue.clone() else {
            return;
        };
        loop {
            if stop_flag.load(Ordering::SeqCst) {
                break;
            }

            let messages = match queue
                .receive(EVENT_LOOP_MAX_MESSAGES, EVENT_LOOP_WAIT_SECONDS)
                .await
            {
                Ok(messages) => messages,
                Err(e) => {
                    self.shared
                        .diagnostics
                        .record(DiagnosticSource::CoordinatorTransport, e.to_string());
                    tokio::select! {
                        _ = tokio::time::sleep(EVENT_LOOP_BACKOFF) => {}
                        _ = wake.notified() => {}
                    }
                    continue;
                }
            };

            for message in &messages {
                if let Ok(body) = serde_json::from_str::<NotificationBody>(&message.body) {
                    for key in body.keys() {
                        if !key.ends_with(".json") {
                            continue;
                        }
                        if let Some(Err(e)) = self.admit_and_load(key).await {
                            self.shared
                                .diagnostics
                                .record(DiagnosticSource::CoordinatorTransport, e.to_string());
                        }
                    }
                }
                // Message is acknowledged regardless of per-key outcome.
                if let Err(e) = queue.ack(&message.ack_handle).await {
                    self.shared
                        .diagnostics
                        .record(DiagnosticSource::CoordinatorTransport, e.to_string());
                }
            }

            if stop_flag.load(Ordering::SeqCst) {
                break;
            }
        }
        debug!("event loop stopped");
    }
}
