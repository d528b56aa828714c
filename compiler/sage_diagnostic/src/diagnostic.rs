//! Core diagnostic types.

use sage_ir::{Span, Token};
use std::fmt;

use crate::ErrorCode;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled source location.
///
/// `line` and `column` are 1-based; zero means the location is unknown
/// (synthesized nodes) and the emitter falls back to the span.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub is_primary: bool,
}

impl Label {
    /// A primary label known only by its byte range.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self::located(span, (0, 0), message.into())
    }

    /// A primary label positioned at a token.
    pub fn at_token(token: &Token, message: impl Into<String>) -> Self {
        Self::located(token.span, (token.line, token.column), message.into())
    }

    fn located(span: Span, (line, column): (u32, u32), message: String) -> Self {
        Label {
            span,
            line,
            column,
            message,
            is_primary: true,
        }
    }

    #[inline]
    pub fn has_position(&self) -> bool {
        self.line > 0
    }
}

/// A diagnostic with everything needed to report it.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    /// Short title, e.g. "Type Error".
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn new(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new(code, Severity::Error)
    }

    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new(code, Severity::Warning)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    pub fn with_label_at(mut self, token: &Token, message: impl Into<String>) -> Self {
        self.labels.push(Label::at_token(token, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn primary_label(&self) -> Option<&Label> {
        self.labels.iter().find(|l| l.is_primary)
    }

    /// `(line, column)` of the primary label, `(0, 0)` when unknown.
    pub fn position(&self) -> (u32, u32) {
        self.primary_label().map_or((0, 0), |l| (l.line, l.column))
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
    }
}
