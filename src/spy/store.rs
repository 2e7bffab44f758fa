use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::types::CapturedEvent;

/// Ordered, append-only storage for the events of one capture window.
///
/// Safe to append from arbitrary threads; the critical section covers only
/// sequence assignment and the push. A store is created fresh for every
/// window and closed exactly once, never reused.
#[derive(Debug, Default)]
pub(crate) struct EventStore {
    inner: Mutex<Inner>,
    faults: AtomicU64,
}

#[derive(Debug, Default)]
struct Inner {
    events: Vec<CapturedEvent>,
    closed: bool,
}

impl EventStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Poisoning is recovered rather than propagated: capture must never
    /// panic into application logging code.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends one event at the tail, assigning its sequence number.
    /// Silently dropped once the store is closed, which is how a detach
    /// racing a concurrent emission keeps the window sealed.
    pub(crate) fn append(&self, event: CapturedEvent) {
        let mut inner = self.lock();
        if inner.closed {
            return;
        }
        let sequence = inner.events.len() as u64;
        inner.events.push(event.with_sequence(sequence));
    }

    /// An immutable ordered copy of everything recorded so far. Safe to
    /// iterate while appends continue.
    pub(crate) fn snapshot(&self) -> Vec<CapturedEvent> {
        self.lock().events.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().events.len()
    }

    /// Empties the store and rejects all further appends.
    pub(crate) fn close(&self) {
        let mut inner = self.lock();
        inner.events.clear();
        inner.closed = true;
    }

    pub(crate) fn note_fault(&self) {
        self.faults.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn fault_count(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }
}
