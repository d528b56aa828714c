//! Source tokens attached to syntax tree nodes.

use std::fmt;
use std::sync::Arc;

use crate::Span;

/// Immutable source position plus the raw text a node was parsed from.
///
/// Tokens carry no runtime semantics. The evaluator only reads them to
/// locate and name things in diagnostics.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub span: Span,
    /// Line number (1-based).
    pub line: u32,
    /// Column number (1-based).
    pub column: u32,
    /// Raw source text of the token.
    pub raw: Arc<str>,
}

impl Token {
    /// Create a token.
    pub fn new(span: Span, line: u32, column: u32, raw: impl Into<Arc<str>>) -> Self {
        Token {
            span,
            line,
            column,
            raw: raw.into(),
        }
    }

    /// Create a token for a synthesized node with no source position.
    pub fn synthetic(raw: impl Into<Arc<str>>) -> Self {
        Token::new(Span::DUMMY, 0, 0, raw)
    }

    /// Raw source text.
    #[inline]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?} @ {}:{})", self.raw, self.line, self.column)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
