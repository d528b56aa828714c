//! Diagnostic queue with an error limit.
//!
//! Runtime errors are reported in the order they occurred. Once the limit is
//! reached further errors are counted but not kept; the count surfaces as a
//! trailing "too many errors" note when the queue is flushed.

use sage_ir::Span;

use crate::{Diagnostic, ErrorCode};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
}

impl Default for DiagnosticConfig {
    /// The first three errors, as reported when all-errors mode is off.
    fn default() -> Self {
        DiagnosticConfig { error_limit: 3 }
    }
}

impl DiagnosticConfig {
    pub fn unlimited() -> Self {
        DiagnosticConfig { error_limit: 0 }
    }

    pub fn first(limit: usize) -> Self {
        DiagnosticConfig { error_limit: limit }
    }
}

/// Queue for collecting diagnostics.
///
/// # Example
///
/// ```text
/// let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::first(3));
/// queue.add(diagnostic);
/// let reported = queue.flush();
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    /// Errors dropped because the limit was reached.
    suppressed: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic.
    ///
    /// Returns `true` if it was kept, `false` if the error limit dropped it.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();
        if is_error && self.limit_reached() {
            self.suppressed += 1;
            return false;
        }
        if is_error {
            self.error_count += 1;
        }
        self.diagnostics.push(diag);
        true
    }

    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Take every kept diagnostic, appending a limit notice when errors were
    /// dropped, and reset the queue.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut result = std::mem::take(&mut self.diagnostics);
        if self.suppressed > 0 {
            result.push(too_many_errors(self.config.error_limit, self.suppressed));
        }
        self.error_count = 0;
        self.suppressed = 0;
        result
    }

    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }
}

/// Create a "too many errors" diagnostic.
#[cold]
pub fn too_many_errors(limit: usize, suppressed: usize) -> Diagnostic {
    Diagnostic::warning(ErrorCode::E9002)
        .with_message(format!("{suppressed} more error(s) after the first {limit} not shown"))
        .with_label(Span::DUMMY, "error limit reached")
        .with_note("enable all errors to see every error")
}
