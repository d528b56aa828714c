//! Error types for evaluation.
//!
//! `EvalErrorKind` provides typed error categories for diagnostic conversion.
//! Factory functions (e.g., `undefined_function()`) are the public API; they
//! populate both `kind` and `message`.

use sage_ir::{Span, Token};
use thiserror::Error;

use crate::Value;

/// Result of evaluating a node.
pub type EvalResult = Result<Value, ControlAction>;

/// Typed error category.
///
/// The `Display` impl is the detail message; [`EvalErrorKind::title`] is the
/// short headline shown by the diagnostic sink.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalErrorKind {
    #[error(
        "{} arguments for {name:?}, wanted {expected}, got {got}",
        arity_direction(.expected, .got)
    )]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("Expected at least {expected} parameters for loop, got {got}.")]
    LoopArity { expected: usize, got: usize },

    #[error("Expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("expected container or upper bound for iteration, got: {got}")]
    InvalidIterator { got: String },

    #[error("Function {name:?} not defined")]
    UndefinedFunction { name: String },

    #[error("Variable {name:?} is not defined")]
    UndefinedVariable { name: String },

    /// Raised by host-provided built-ins.
    #[error("{message}")]
    Host { title: String, message: String },
}

fn arity_direction(expected: &usize, got: &usize) -> &'static str {
    if got > expected {
        "Too many"
    } else {
        "Not enough"
    }
}

impl EvalErrorKind {
    /// Short headline for the diagnostic sink.
    pub fn title(&self) -> &str {
        match self {
            Self::ArityMismatch { expected, got, .. } if got > expected => "Too many arguments",
            Self::ArityMismatch { .. } | Self::LoopArity { .. } => "Not enough arguments",
            Self::TypeMismatch { .. } => "Type Error",
            Self::InvalidIterator { .. } => "Invalid iterator",
            Self::UndefinedFunction { .. } => "Undefined function",
            Self::UndefinedVariable { .. } => "Undefined variable",
            Self::Host { title, .. } => title,
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Detail message; equals `kind.to_string()` for factory-created errors.
    pub message: String,
    pub span: Option<Span>,
    /// Token the error is reported against.
    pub token: Option<Token>,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            span: None,
            token: None,
        }
    }

    pub fn title(&self) -> &str {
        self.kind.title()
    }

    /// Attach the reporting token. Its span is used unless one is already set.
    #[must_use]
    pub fn with_token(mut self, token: &Token) -> Self {
        if self.span.is_none() {
            self.span = Some(token.span);
        }
        self.token = Some(token.clone());
        self
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title(), self.message)
    }
}

impl std::error::Error for EvalError {}

pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

pub fn loop_arity(expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::LoopArity { expected, got })
}

pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

pub fn invalid_iterator(got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidIterator {
        got: got.to_string(),
    })
}

pub fn undefined_function(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedFunction {
        name: name.to_string(),
    })
}

pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

pub fn host_error(title: impl Into<String>, message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Host {
        title: title.into(),
        message: message.into(),
    })
}

/// Non-value outcome of evaluating a node.
///
/// `Return` is not an error: it unwinds statement sequences up to the
/// enclosing function call (or the root), which consumes it.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlAction {
    Error(Box<EvalError>),
    Return(Value),
}

impl ControlAction {
    /// Resolve a function-call boundary: a `Return` becomes the call's value.
    pub fn into_call_result(self) -> EvalResult {
        match self {
            ControlAction::Return(value) => Ok(value),
            error @ ControlAction::Error(_) => Err(error),
        }
    }
}

impl From<EvalError> for ControlAction {
    fn from(err: EvalError) -> Self {
        ControlAction::Error(Box::new(err))
    }
}
