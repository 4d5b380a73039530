//! Side-channel for failures that must not interrupt their caller.
//!
//! §7 of the spec requires that a subscriber callback panic "must not
//! interrupt delivery to other subscribers or mutate store state; such
//! failures are reported to a side-channel but do not fail the mutating
//! call". [`Diagnostics`] is that side-channel: a small bounded ring buffer,
//! shared via `Arc` between the [`crate::store::Store`] (subscriber panics)
//! and the ingestion coordinator (transport failures during the incremental
//! discovery loop), drainable by the CLI for periodic logging.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Maximum number of retained diagnostic events; oldest are dropped first.
const MAX_EVENTS: usize = 256;

/// One recorded non-fatal failure.
#[derive(Debug, Clone)]
pub struct DiagnosticEvent {
    pub source: DiagnosticSource,
    pub message: String,
}

/// Which subsystem produced a [`DiagnosticEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSource {
    SubscriberCallback,
    CoordinatorTransport,
}

/// A cheaply-cloneable handle onto a shared, bounded diagnostics ring.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    events: Arc<Mutex<VecDeque<DiagnosticEvent>>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, source: DiagnosticSource, message: impl Into<String>) {
        let mut events = self.events.lock().expect("diagnostics lock poisoned");
        if events.len() == MAX_EVENTS {
            events.pop_front();
        }
        events.push_back(DiagnosticEvent {
            source,
            message: message.into(),
        });
    }

    /// Drain and return all currently buffered events, oldest first.
    pub fn drain(&self) -> Vec<DiagnosticEvent> {
        let mut events = self.events.lock().expect("diagnostics lock poisoned");
        events.drain(..).collect()
    }

    /// Number of events currently buffered, without draining them.
    pub fn len(&self) -> usize {
        self.events.lock().expect("diagnostics lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
