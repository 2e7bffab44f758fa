use std::error::Error;

use super::types::CapturedEvent;

/// Walks `err` and its `source()` chain, returning whether any link
/// downcasts to `T`. Wrapping chains are how one error "is a" more
/// specific one, so kind queries match through them.
pub(crate) fn chain_contains<T: Error + 'static>(err: &(dyn Error + 'static)) -> bool {
    let mut current: Option<&(dyn Error + 'static)> = Some(err);
    while let Some(e) = current {
        if e.is::<T>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// One-line rendering of a captured event for dumps and assertion
/// failure output.
pub(crate) fn format_event(event: &CapturedEvent) -> String {
    let mut output = format!(
        "[{}] {} message={:?}",
        event.sequence(),
        event.severity(),
        event.message()
    );
    if let Some(error) = event.attached_error() {
        output.push_str(&format!(", error={error}"));
    }
    output
}
