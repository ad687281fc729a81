//! Parse error type.

use std::fmt;

use sky_diagnostic::{Diagnostic, ErrorCode};
use sky_ir::{SourceInfo, Span, TokenKind};
use sky_lexer::LexError;

/// A syntax or compile-time error.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
}

impl ParseError {
    #[cold]
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        ParseError {
            code,
            message: message.into(),
            span,
        }
    }

    #[cold]
    pub fn unexpected(expected: &str, found: &TokenKind, span: Span) -> Self {
        ParseError::new(
            ErrorCode::E1001,
            format!("expected {expected}, found {}", found.describe()),
            span,
        )
    }

    /// Render as an error diagnostic located in `source`.
    pub fn to_diagnostic(&self, source: &SourceInfo) -> Diagnostic {
        Diagnostic::error(self.message.clone())
            .with_code(self.code)
            .at(source.location(self.span))
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        ParseError {
            code: error.code,
            message: error.message,
            span: error.span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ParseError {}
