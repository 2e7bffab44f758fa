use std::error::Error;
use std::fmt;
use std::sync::Arc;

use super::helpers::{chain_contains, format_event};
use super::types::{AttachedError, CapturedEvent, Severity};

/// A builder for constructing assertions over a snapshot of captured
/// events.
///
/// Criteria are combined with AND semantics. The builder owns its
/// snapshot, so results stay stable while the window keeps capturing.
pub struct EventAssertion {
    events: Vec<CapturedEvent>,
    severity: Option<Severity>,
    message: Option<String>,
    message_contains: Option<String>,
    requires_error: bool,
    error_matcher: Option<ErrorMatcher>,
}

struct ErrorMatcher {
    label: String,
    predicate: Box<dyn Fn(&AttachedError) -> bool>,
}

impl fmt::Debug for EventAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventAssertion")
            .field("events", &self.events.len())
            .field("severity", &self.severity)
            .field("message", &self.message)
            .field("message_contains", &self.message_contains)
            .field("requires_error", &self.requires_error)
            .field("error_matcher", &self.error_matcher.as_ref().map(|m| &m.label))
            .finish()
    }
}

impl EventAssertion {
    pub(crate) fn new(events: Vec<CapturedEvent>) -> Self {
        Self {
            events,
            severity: None,
            message: None,
            message_contains: None,
            requires_error: false,
            error_matcher: None,
        }
    }

    /// Adds exact severity criteria to the assertion.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Adds exact message criteria to the assertion.
    #[must_use]
    pub fn with_message<S: Into<String>>(mut self, message: S) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds substring message criteria to the assertion.
    #[must_use]
    pub fn with_message_containing<S: Into<String>>(mut self, fragment: S) -> Self {
        self.message_contains = Some(fragment.into());
        self
    }

    /// Requires an attached error of any kind.
    #[must_use]
    pub fn with_attached_error(mut self) -> Self {
        self.requires_error = true;
        self
    }

    /// Requires an attached error whose `source()` chain contains a `T`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use logspy::SpyLogger;
    /// # let spy = SpyLogger::attach().unwrap();
    /// spy.expect_event()
    ///     .with_error_kind::<std::io::Error>()
    ///     .assert_exists();
    /// ```
    #[must_use]
    pub fn with_error_kind<T: Error + 'static>(mut self) -> Self {
        self.error_matcher = Some(ErrorMatcher {
            label: format!("kind({})", std::any::type_name::<T>()),
            predicate: Box::new(|error| chain_contains::<T>(&**error)),
        });
        self
    }

    /// Requires exactly the given attached error instance, compared by
    /// identity rather than by rendered message.
    #[must_use]
    pub fn with_error_instance(mut self, instance: &AttachedError) -> Self {
        let instance = Arc::clone(instance);
        self.error_matcher = Some(ErrorMatcher {
            label: format!("instance({instance})"),
            predicate: Box::new(move |error| Arc::ptr_eq(error, &instance)),
        });
        self
    }

    /// Asserts that at least one event matches all specified criteria.
    ///
    /// # Panics
    ///
    /// Panics with a descriptive message if no match is found.
    #[allow(clippy::panic)]
    #[track_caller]
    pub fn assert_exists(&self) {
        if !self.matches_any() {
            panic!("{}", self.build_error_message());
        }
    }

    /// Asserts that no events match the specified criteria.
    ///
    /// # Panics
    ///
    /// Panics if any events match the criteria.
    #[allow(clippy::panic)]
    #[track_caller]
    pub fn assert_not_exists(&self) {
        if self.matches_any() {
            panic!(
                "Expected no events to match, but found {} matching.\nCriteria: {}",
                self.count(),
                self.format_criteria()
            );
        }
    }

    /// Asserts that exactly the specified number of events match.
    ///
    /// # Panics
    ///
    /// Panics if the count doesn't match.
    #[allow(clippy::panic)]
    #[track_caller]
    pub fn assert_count(&self, expected: usize) {
        let actual = self.count();
        if actual != expected {
            panic!(
                "Expected {} matching events, but found {}.\nCriteria: {}\n\n{}",
                expected,
                actual,
                self.format_criteria(),
                self.format_matching_events()
            );
        }
    }

    /// Asserts that at least the specified number of events match.
    ///
    /// # Panics
    ///
    /// Panics if fewer events match.
    #[allow(clippy::panic)]
    #[track_caller]
    pub fn assert_at_least(&self, min: usize) {
        let actual = self.count();
        if actual < min {
            panic!(
                "Expected at least {} matching events, but found {}.\nCriteria: {}",
                min,
                actual,
                self.format_criteria()
            );
        }
    }

    /// Asserts that no more than the specified number of events match.
    ///
    /// # Panics
    ///
    /// Panics if more events match.
    #[allow(clippy::panic)]
    #[track_caller]
    pub fn assert_at_most(&self, max: usize) {
        let actual = self.count();
        if actual > max {
            panic!(
                "Expected at most {} matching events, but found {}.\nCriteria: {}",
                max,
                actual,
                self.format_criteria()
            );
        }
    }

    /// Returns the number of events that match the criteria.
    #[must_use = "the count should be used"]
    pub fn count(&self) -> usize {
        self.events.iter().filter(|event| self.matches(event)).count()
    }

    /// Returns all events that match the criteria, in emission order.
    #[must_use = "the matching events should be used"]
    pub fn get_all(&self) -> Vec<&CapturedEvent> {
        self.events.iter().filter(|event| self.matches(event)).collect()
    }

    fn matches_any(&self) -> bool {
        self.events.iter().any(|event| self.matches(event))
    }

    fn matches(&self, event: &CapturedEvent) -> bool {
        if let Some(severity) = self.severity {
            if event.severity() != severity {
                return false;
            }
        }
        if let Some(expected) = &self.message {
            if event.message() != expected {
                return false;
            }
        }
        if let Some(fragment) = &self.message_contains {
            if !event.message().contains(fragment.as_str()) {
                return false;
            }
        }
        if self.requires_error && event.attached_error().is_none() {
            return false;
        }
        if let Some(matcher) = &self.error_matcher {
            match event.attached_error() {
                Some(error) => {
                    if !(matcher.predicate)(error) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }

    fn format_criteria(&self) -> String {
        let mut criteria = Vec::new();
        if let Some(severity) = self.severity {
            criteria.push(format!("severity={severity}"));
        }
        if let Some(message) = &self.message {
            criteria.push(format!("message={message:?}"));
        }
        if let Some(fragment) = &self.message_contains {
            criteria.push(format!("message_contains={fragment:?}"));
        }
        if self.requires_error {
            criteria.push("attached_error".to_owned());
        }
        if let Some(matcher) = &self.error_matcher {
            criteria.push(format!("error={}", matcher.label));
        }
        if criteria.is_empty() {
            criteria.push("<any event>".to_owned());
        }
        criteria.join(", ")
    }

    fn format_matching_events(&self) -> String {
        let matching = self.get_all();
        if matching.is_empty() {
            return String::new();
        }

        let mut output = String::from("Matching events:\n");
        for event in matching {
            output.push_str("  ");
            output.push_str(&format_event(event));
            output.push('\n');
        }
        output
    }

    fn build_error_message(&self) -> String {
        let mut msg = String::from("No events matched the assertion.\n\n");
        msg.push_str(&format!("Expected:\n  {}\n\n", self.format_criteria()));
        msg.push_str(&format!(
            "Found {} event(s) in capture window",
            self.events.len()
        ));

        if !self.events.is_empty() {
            msg.push_str(":\n");
            for event in self.events.iter().take(10) {
                msg.push_str("  ");
                msg.push_str(&format_event(event));
                msg.push('\n');
            }
            if self.events.len() > 10 {
                msg.push_str(&format!("  ... and {} more\n", self.events.len() - 10));
            }
        }

        msg
    }
}
