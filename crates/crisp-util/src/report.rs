//! Diagnostic reporting.
//!
//! Errors and warnings flow through a pluggable [`Report`] sink so that
//! embedders can route them anywhere (stderr, a log, a test buffer). The
//! [`Handler`] in front of the sink keeps monotonic error/warning counters
//! that increment even when a scanner's flags suppress the message itself.

use std::cell::{Cell, RefCell};

/// Sink for formatted diagnostic messages.
///
/// The default implementation writes to the process's standard error
/// stream; see [`StderrReport`].
pub trait Report {
    /// Reports a formatted error. `fatal` distinguishes errors that abort
    /// the current top-level operation from ones the caller will recover
    /// from.
    fn error(&mut self, message: &str, fatal: bool);

    /// Reports a formatted warning.
    fn warning(&mut self, message: &str);
}

/// Default [`Report`] sink: prints to standard error.
#[derive(Debug, Default)]
pub struct StderrReport;

impl Report for StderrReport {
    fn error(&mut self, message: &str, fatal: bool) {
        if fatal {
            eprintln!("fatal error: {message}");
        } else {
            eprintln!("error: {message}");
        }
    }

    fn warning(&mut self, message: &str) {
        eprintln!("warning: {message}");
    }
}

/// Counts diagnostics and forwards them to a [`Report`] sink.
///
/// One handler is shared by every scanner on an include stack and by the
/// preprocessor driving them, so the counters reflect the whole run.
///
/// # Example
///
/// ```
/// use crisp_util::Handler;
///
/// let handler = Handler::new();
/// handler.error("something went wrong", false, true);
/// assert_eq!(handler.error_count(), 1);
/// ```
pub struct Handler {
    sink: RefCell<Box<dyn Report>>,
    errors: Cell<usize>,
    warnings: Cell<usize>,
}

impl Handler {
    /// Creates a handler that reports to standard error.
    pub fn new() -> Self {
        Self::with_sink(Box::new(StderrReport))
    }

    /// Creates a handler that reports into the given sink.
    pub fn with_sink(sink: Box<dyn Report>) -> Self {
        Self {
            sink: RefCell::new(sink),
            errors: Cell::new(0),
            warnings: Cell::new(0),
        }
    }

    /// Replaces the sink, keeping the counters.
    pub fn set_sink(&self, sink: Box<dyn Report>) {
        *self.sink.borrow_mut() = sink;
    }

    /// Counts an error and, when `emit` is set, forwards it to the sink.
    ///
    /// The counter increments unconditionally: suppressed errors are still
    /// errors.
    pub fn error(&self, message: &str, fatal: bool, emit: bool) {
        self.errors.set(self.errors.get() + 1);
        if emit {
            self.sink.borrow_mut().error(message, fatal);
        }
    }

    /// Counts a warning and, when `emit` is set, forwards it to the sink.
    pub fn warning(&self, message: &str, emit: bool) {
        self.warnings.set(self.warnings.get() + 1);
        if emit {
            self.sink.borrow_mut().warning(message);
        }
    }

    /// Number of errors counted so far. Monotonically non-decreasing.
    pub fn error_count(&self) -> usize {
        self.errors.get()
    }

    /// Number of warnings counted so far. Monotonically non-decreasing.
    pub fn warning_count(&self) -> usize {
        self.warnings.get()
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}
