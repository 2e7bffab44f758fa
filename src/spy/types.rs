use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use super::helpers::chain_contains;

/// Severity of a captured log event, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    pub(crate) fn from_level(level: tracing::Level) -> Self {
        if level == tracing::Level::TRACE {
            Self::Trace
        } else if level == tracing::Level::DEBUG {
            Self::Debug
        } else if level == tracing::Level::INFO {
            Self::Info
        } else if level == tracing::Level::WARN {
            Self::Warn
        } else {
            Self::Error
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        Self::from_level(level)
    }
}

/// An error object attached to a log emission.
///
/// Shared ownership lets the same instance live in the capture window, in
/// the emitting code, and in the test making identity assertions.
pub type AttachedError = Arc<dyn Error + Send + Sync + 'static>;

/// An immutable record of one log emission observed during a capture
/// window. The store never mutates an event after recording it.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    severity: Severity,
    message: String,
    error: Option<AttachedError>,
    sequence: u64,
    timestamp: SystemTime,
}

impl CapturedEvent {
    pub(crate) fn new(severity: Severity, message: String, error: Option<AttachedError>) -> Self {
        Self {
            severity,
            message,
            error,
            sequence: 0,
            timestamp: SystemTime::now(),
        }
    }

    pub(crate) fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Rendered text of the log statement.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The error object attached to the emission, if any.
    pub fn attached_error(&self) -> Option<&AttachedError> {
        self.error.as_ref()
    }

    /// Emission order within the capture window. Starts at zero and is
    /// strictly increasing, so "first matching event" is deterministic.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Whether the attached error, or any error in its `source()` chain,
    /// is a `T`.
    pub fn error_is<T: Error + 'static>(&self) -> bool {
        self.error.as_ref().is_some_and(|e| chain_contains::<T>(&**e))
    }

    pub(crate) fn error_is_instance(&self, instance: &AttachedError) -> bool {
        self.error.as_ref().is_some_and(|e| Arc::ptr_eq(e, instance))
    }
}
