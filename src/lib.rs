//! A log capture library for testing.
//!
//! This library intercepts log events reaching the process-wide `tracing`
//! dispatcher during a bounded capture window and lets tests assert on what
//! was logged (by severity, by attached error kind, or by exact attached
//! error instance) without scraping log output.
//!
//! # Features
//!
//! - **Bounded Capture Windows**: Explicit attach/detach lifecycle with
//!   guaranteed cleanup on drop, so panicking tests never leak events into
//!   the next window
//! - **Severity Queries**: Count captured events by exact severity
//! - **Error Object Queries**: Find events by the kind of error attached to
//!   them (matching anywhere in the `source()` chain) or by the exact error
//!   instance
//! - **Fluent Assertion API**: Builder pattern for test assertions with
//!   descriptive failure messages
//! - **Thread-Safe**: Application code may log from any thread while a
//!   window is open
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use logspy::{Severity, SpyLogger};
//!
//! # fn main() -> Result<(), logspy::AttachError> {
//! let spy = SpyLogger::attach()?;
//!
//! // Anything the application logs is captured...
//! tracing::warn!("greeting template missing, using default");
//!
//! // ...including error objects attached through the emit call.
//! logspy::emit(
//!     Severity::Error,
//!     "greeting rejected",
//!     Some(Arc::new(std::io::Error::other("dangerous content"))),
//! );
//!
//! assert_eq!(spy.count_warning_events(), 1);
//! assert_eq!(spy.find_by_error_kind::<std::io::Error>().len(), 1);
//!
//! spy.expect_event()
//!     .with_severity(Severity::Error)
//!     .with_message("greeting rejected")
//!     .assert_exists();
//!
//! spy.detach();
//! # Ok(())
//! # }
//! ```
//!
//! # Assertion API
//!
//! [`SpyLogger::expect_event`] starts a builder with these verdicts:
//!
//! - [`EventAssertion::assert_exists`]: Assert at least one event matches
//! - [`EventAssertion::assert_not_exists`]: Assert no events match
//! - [`EventAssertion::assert_count`]: Assert exact number of matches
//! - [`EventAssertion::assert_at_least`]: Assert minimum matches
//! - [`EventAssertion::assert_at_most`]: Assert maximum matches
//!
//! Only one capture window may be open per process at a time; tests that
//! use the spy must serialize against each other.

mod error;
mod sink;
mod spy;

pub use error::AttachError;
pub use sink::{emit, SpyLayer};
pub use spy::{AttachedError, CapturedEvent, EventAssertion, Severity, SpyLogger};
