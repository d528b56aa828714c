//! Diagnostic system for runtime error reporting.
//!
//! - Error codes for searchability
//! - A short title (what went wrong)
//! - A primary label with line and column (where it went wrong)
//! - Notes for extra context
//!
//! Diagnostics are collected in a [`DiagnosticQueue`], which honors the
//! configured error limit, and written out by a [`DiagnosticEmitter`].

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use emitter::{render_diagnostics, ColorMode, DiagnosticEmitter, TerminalEmitter};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
