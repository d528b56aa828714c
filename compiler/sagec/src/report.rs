//! Conversion of evaluation errors into diagnostics.

use sage_diagnostic::{Diagnostic, ErrorCode};
use sage_value::{EvalError, EvalErrorKind};

fn error_code(kind: &EvalErrorKind) -> ErrorCode {
    match kind {
        EvalErrorKind::ArityMismatch { .. } => ErrorCode::E6001,
        EvalErrorKind::LoopArity { .. } => ErrorCode::E6002,
        EvalErrorKind::TypeMismatch { .. } => ErrorCode::E6003,
        EvalErrorKind::InvalidIterator { .. } => ErrorCode::E6004,
        EvalErrorKind::UndefinedFunction { .. } => ErrorCode::E6005,
        EvalErrorKind::UndefinedVariable { .. } => ErrorCode::E6006,
        EvalErrorKind::Host { .. } => ErrorCode::E6099,
    }
}

/// Title as the headline, detail message at the reporting location.
pub fn to_diagnostic(err: &EvalError) -> Diagnostic {
    let diagnostic = Diagnostic::error(error_code(&err.kind)).with_message(err.title());
    match (&err.token, err.span) {
        (Some(token), _) => diagnostic.with_label_at(token, err.message.as_str()),
        (None, Some(span)) => diagnostic.with_label(span, err.message.as_str()),
        (None, None) => diagnostic.with_note(err.message.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sage_ir::{Span, Token};
    use sage_value::{arity_mismatch, host_error, type_mismatch, undefined_variable};

    #[test]
    fn test_token_position_is_kept() {
        let token = Token::new(Span::new(4, 7), 2, 5, "add");
        let diag = to_diagnostic(&arity_mismatch("add", 2, 3).with_token(&token));
        assert_eq!(diag.code, ErrorCode::E6001);
        assert_eq!(diag.message, "Too many arguments");
        assert_eq!(diag.position(), (2, 5));
        assert_eq!(
            diag.labels[0].message,
            "Too many arguments for \"add\", wanted 2, got 3"
        );
    }

    #[test]
    fn test_span_only_label() {
        let diag = to_diagnostic(&type_mismatch("float", "string").with_span(Span::new(0, 1)));
        assert_eq!(diag.code, ErrorCode::E6003);
        assert_eq!(diag.message, "Type Error");
        assert_eq!(diag.position(), (0, 0));
        assert_eq!(diag.labels.len(), 1);
    }

    #[test]
    fn test_unlocated_error_becomes_note() {
        let diag = to_diagnostic(&undefined_variable("x"));
        assert_eq!(diag.code, ErrorCode::E6006);
        assert!(diag.labels.is_empty());
        assert_eq!(diag.notes, vec!["Variable \"x\" is not defined".to_string()]);
    }

    #[test]
    fn test_host_title_passes_through() {
        let diag = to_diagnostic(&host_error("IO Error", "disk on fire"));
        assert_eq!(diag.code, ErrorCode::E6099);
        assert_eq!(diag.message, "IO Error");
    }
}
