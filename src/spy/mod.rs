mod assertions;
mod helpers;
pub(crate) mod store;
mod types;

pub use assertions::EventAssertion;
pub use types::{AttachedError, CapturedEvent, Severity};

use std::error::Error;
use std::sync::Arc;

use crate::error::AttachError;
use crate::sink;
use store::EventStore;

/// A handle over one capture window.
///
/// While attached, every log emission reaching the process-wide sink is
/// recorded and can be queried through this handle. Detaching (explicitly
/// or on drop) clears the window, so no event leaks into the next one.
///
/// Only one window may be open per process at a time; a second
/// [`attach`](Self::attach) fails with [`AttachError::AlreadyAttached`].
#[derive(Debug)]
pub struct SpyLogger {
    store: Arc<EventStore>,
    detached: bool,
}

impl SpyLogger {
    /// Begins a new capture window with an empty store.
    ///
    /// The first attach in a process also installs the capture layer on
    /// the global `tracing` dispatcher.
    ///
    /// # Errors
    ///
    /// Returns [`AttachError::AlreadyAttached`] when a window is already
    /// open; the open window is unaffected.
    pub fn attach() -> Result<Self, AttachError> {
        sink::install();
        let store = sink::activate()?;
        Ok(Self {
            store,
            detached: false,
        })
    }

    /// Ends the window and clears its store.
    ///
    /// Dropping the handle performs the same teardown, so a panicking
    /// test still detaches. After this returns, no further emission can
    /// be recorded into the window.
    pub fn detach(mut self) {
        self.detach_inner();
    }

    fn detach_inner(&mut self) {
        if self.detached {
            return;
        }
        sink::deactivate(&self.store);
        self.store.close();
        self.detached = true;
    }

    /// Returns an immutable ordered copy of all events recorded so far.
    ///
    /// Safe to call while the window keeps capturing; the copy never
    /// observes a torn event.
    pub fn snapshot(&self) -> Vec<CapturedEvent> {
        self.store.snapshot()
    }

    pub fn event_count(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_count() == 0
    }

    /// Number of emissions dropped because capturing them failed
    /// internally. Diagnostic only; capture faults never propagate into
    /// application logging.
    pub fn fault_count(&self) -> u64 {
        self.store.fault_count()
    }

    /// Counts events whose severity equals `severity` exactly.
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.snapshot()
            .iter()
            .filter(|event| event.severity() == severity)
            .count()
    }

    /// Convenience for [`count_by_severity`](Self::count_by_severity)
    /// with [`Severity::Warn`].
    pub fn count_warning_events(&self) -> usize {
        self.count_by_severity(Severity::Warn)
    }

    /// Convenience for [`count_by_severity`](Self::count_by_severity)
    /// with [`Severity::Error`].
    pub fn count_error_events(&self) -> usize {
        self.count_by_severity(Severity::Error)
    }

    /// Returns, in emission order, the events whose attached error (or
    /// any error in its `source()` chain) is a `T`.
    pub fn find_by_error_kind<T: Error + 'static>(&self) -> Vec<CapturedEvent> {
        self.snapshot()
            .into_iter()
            .filter(|event| event.error_is::<T>())
            .collect()
    }

    /// Returns, in emission order, the events carrying exactly the given
    /// error instance. Identity comparison, not message equality: an
    /// equal-looking but distinct instance does not match.
    pub fn find_by_error_instance(&self, instance: &AttachedError) -> Vec<CapturedEvent> {
        self.snapshot()
            .into_iter()
            .filter(|event| event.error_is_instance(instance))
            .collect()
    }

    /// Starts building an assertion over the current snapshot.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use logspy::{Severity, SpyLogger};
    /// # let spy = SpyLogger::attach().unwrap();
    /// spy.expect_event()
    ///     .with_severity(Severity::Warn)
    ///     .assert_at_least(1);
    /// ```
    pub fn expect_event(&self) -> EventAssertion {
        EventAssertion::new(self.snapshot())
    }

    /// Starts building an assertion for events with the given message.
    pub fn expect_event_with_message<S: Into<String>>(&self, message: S) -> EventAssertion {
        self.expect_event().with_message(message)
    }

    /// Human-readable listing of everything captured so far, for
    /// debugging failing tests.
    pub fn dump(&self) -> String {
        let events = self.snapshot();
        let mut output = format!("Capture window: {} event(s)", events.len());
        for event in &events {
            output.push('\n');
            output.push_str(&helpers::format_event(event));
        }
        output
    }
}

impl Drop for SpyLogger {
    fn drop(&mut self) {
        self.detach_inner();
    }
}
