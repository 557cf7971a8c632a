//! Logging collaborator.
//!
//! Every message is buffered into a severity-partitioned [`LogBook`] and,
//! when a sink is attached, also written out with the Loki banner. The
//! buffer is kept even without a sink so messages are never silently lost.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{error, info, warn};

/// Namespace the runtime logs under.
pub const NAMESPACE: &str = "loki";

/// Runtime version reported in log output.
pub const VERSION: &str = "0.0.1";

/// Prefix written before every sink line.
pub const LOG_INTRO: &str = "Loki Logging Message:\n";

/// Suffix written after every sink line.
pub const LOG_EXIT: &str = "\n";

/// Substituted for an empty message.
pub const EMPTY_MESSAGE: &str = "No log message was set!";

/// Message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Severity {
    /// Informational.
    Info = 0,
    /// Something unexpected that was recovered from.
    Warn = 1,
    /// A failure, such as a deferred task returning an error.
    Error = 2,
}

impl Severity {
    /// Map a numeric level to a severity. Unknown levels are `Info`.
    #[must_use]
    pub const fn from_level(level: u8) -> Self {
        match level {
            1 => Self::Warn,
            2 => Self::Error,
            _ => Self::Info,
        }
    }

    /// Numeric level of this severity.
    #[must_use]
    pub const fn level(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

/// Buffered log messages, one ordered list per severity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogBook {
    info: Vec<String>,
    warn: Vec<String>,
    error: Vec<String>,
}

impl LogBook {
    /// Messages recorded at `severity`, oldest first.
    #[must_use]
    pub fn entries(&self, severity: Severity) -> &[String] {
        match severity {
            Severity::Info => &self.info,
            Severity::Warn => &self.warn,
            Severity::Error => &self.error,
        }
    }

    /// Total number of buffered messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.info.len() + self.warn.len() + self.error.len()
    }

    /// Returns `true` if nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, severity: Severity, message: String) {
        match severity {
            Severity::Info => self.info.push(message),
            Severity::Warn => self.warn.push(message),
            Severity::Error => self.error.push(message),
        }
    }
}

/// A console-like output for log lines.
pub trait LogSink {
    /// Write one annotated line.
    fn write(&self, severity: Severity, line: &str);
}

/// Sink that forwards to `tracing` at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, severity: Severity, line: &str) {
        match severity {
            Severity::Info => info!(target: "loki", "{line}"),
            Severity::Warn => warn!(target: "loki", "{line}"),
            Severity::Error => error!(target: "loki", "{line}"),
        }
    }
}

/// Shared handle to the log book and its sink.
///
/// Cloning is cheap and every clone writes to the same book. The handle is
/// single-threaded.
#[derive(Clone)]
pub struct Logger {
    book: Rc<RefCell<LogBook>>,
    sink: Option<Rc<dyn LogSink>>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("book", &self.book.borrow())
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// A logger writing to [`TracingSink`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(TracingSink)
    }

    /// A logger writing to a custom sink.
    #[must_use]
    pub fn with_sink(sink: impl LogSink + 'static) -> Self {
        Self {
            book: Rc::new(RefCell::new(LogBook::default())),
            sink: Some(Rc::new(sink)),
        }
    }

    /// A logger with no sink. Messages are only buffered.
    #[must_use]
    pub fn buffered() -> Self {
        Self {
            book: Rc::new(RefCell::new(LogBook::default())),
            sink: None,
        }
    }

    /// Record `message` at `severity`.
    pub fn log(&self, message: impl Into<String>, severity: Severity) {
        let mut message = message.into();
        if message.is_empty() {
            message = EMPTY_MESSAGE.to_string();
        }
        if let Some(sink) = &self.sink {
            sink.write(severity, &format!("{LOG_INTRO}{message}{LOG_EXIT}"));
        }
        self.book.borrow_mut().push(severity, message);
    }

    /// Record at [`Severity::Info`].
    pub fn info(&self, message: impl Into<String>) {
        self.log(message, Severity::Info);
    }

    /// Record at [`Severity::Warn`].
    pub fn warn(&self, message: impl Into<String>) {
        self.log(message, Severity::Warn);
    }

    /// Record at [`Severity::Error`].
    pub fn error(&self, message: impl Into<String>) {
        self.log(message, Severity::Error);
    }

    /// Borrow the buffered messages.
    ///
    /// # Panics
    ///
    /// Panics if called while a message is being logged on the same handle.
    #[must_use]
    pub fn book(&self) -> Ref<'_, LogBook> {
        self.book.borrow()
    }

    /// Number of messages buffered at `severity`.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.book.borrow().entries(severity).len()
    }
}
