use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::Registry;

use crate::error::AttachError;
use crate::spy::store::EventStore;
use crate::spy::{AttachedError, CapturedEvent, Severity};

/// Field marking events already recorded through [`emit`], so the layer
/// does not capture them a second time. Must match the literal field name
/// used in the forwarding macros below.
const FORWARDED_FIELD: &str = "logspy.forwarded";

/// The one store currently receiving events, if a window is open.
static ACTIVE: Mutex<Option<Arc<EventStore>>> = Mutex::new(None);

/// Whether installing our own global subscriber succeeded. Set once.
static SINK_INSTALLED: OnceLock<bool> = OnceLock::new();

fn active_slot() -> MutexGuard<'static, Option<Arc<EventStore>>> {
    ACTIVE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Installs [`SpyLayer`] on the global dispatcher. Best-effort: when the
/// process already set its own subscriber, layer capture degrades silently
/// and only [`emit`] calls reach the store.
pub(crate) fn install() {
    SINK_INSTALLED.get_or_init(|| {
        tracing::subscriber::set_global_default(Registry::default().with(SpyLayer)).is_ok()
    });
}

/// Opens a new capture window with a fresh store.
pub(crate) fn activate() -> Result<Arc<EventStore>, AttachError> {
    let mut slot = active_slot();
    if slot.is_some() {
        return Err(AttachError::AlreadyAttached);
    }
    let store = Arc::new(EventStore::new());
    *slot = Some(Arc::clone(&store));
    Ok(store)
}

/// Closes the window owned by `store`. A no-op when that window is no
/// longer the active one.
pub(crate) fn deactivate(store: &Arc<EventStore>) {
    let mut slot = active_slot();
    if slot.as_ref().is_some_and(|active| Arc::ptr_eq(active, store)) {
        *slot = None;
    }
}

fn active_store() -> Option<Arc<EventStore>> {
    active_slot().clone()
}

/// Records one event, never letting a capture failure escape into the
/// logging call site. A failed capture drops the event and bumps the
/// store's fault counter.
fn record(store: &EventStore, make: impl FnOnce() -> CapturedEvent) {
    match catch_unwind(AssertUnwindSafe(make)) {
        Ok(event) => store.append(event),
        Err(_) => store.note_fault(),
    }
}

/// Emits a log event through the process-wide sink, optionally carrying an
/// error object the capture window can index by kind and by identity.
///
/// The event is recorded into the active window (if any) and then forwarded
/// to the `tracing` dispatcher, so every other subscriber still observes
/// it. Without an open window this behaves like a plain `tracing` call.
///
/// Plain `tracing` macros are captured too, but only this entry point can
/// attach an owned error object: the `tracing` field system lends errors by
/// reference and the window outlives the event.
pub fn emit(severity: Severity, message: impl Into<String>, error: Option<AttachedError>) {
    let message = message.into();
    if let Some(store) = active_store() {
        let msg = message.clone();
        let err = error.clone();
        record(&store, move || CapturedEvent::new(severity, msg, err));
    }

    let rendered = error.as_ref().map(|e| e.to_string());
    let rendered = rendered.as_deref();
    match severity {
        Severity::Trace => {
            tracing::trace!(logspy.forwarded = true, error = rendered, "{}", message);
        }
        Severity::Debug => {
            tracing::debug!(logspy.forwarded = true, error = rendered, "{}", message);
        }
        Severity::Info => {
            tracing::info!(logspy.forwarded = true, error = rendered, "{}", message);
        }
        Severity::Warn => {
            tracing::warn!(logspy.forwarded = true, error = rendered, "{}", message);
        }
        Severity::Error => {
            tracing::error!(logspy.forwarded = true, error = rendered, "{}", message);
        }
    }
}

/// A `tracing` layer that records every event reaching the dispatcher into
/// the active capture window.
///
/// Installed automatically on the first [`SpyLogger`](crate::SpyLogger)
/// attach. Applications that manage their own global subscriber can compose
/// this layer into it instead; capture stays inert until a window opens.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpyLayer;

impl<S: Subscriber> Layer<S> for SpyLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().fields().field(FORWARDED_FIELD).is_some() {
            return;
        }
        let Some(store) = active_store() else {
            return;
        };
        record(&store, || {
            let mut visitor = MessageVisitor::default();
            event.record(&mut visitor);
            CapturedEvent::new(
                Severity::from_level(*event.metadata().level()),
                visitor.message.unwrap_or_default(),
                None,
            )
        });
    }
}

/// Extracts the rendered `message` field of a `tracing` event.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" && self.message.is_none() {
            self.message = Some(format!("{value:?}"));
        }
    }
}
