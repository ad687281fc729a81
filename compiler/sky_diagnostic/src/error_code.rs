//! Error codes for diagnostics.
//!
//! Format: E#### where the first digit indicates the phase:
//! - E0xxx: Lexer errors
//! - E1xxx: Parser and compile-time validation errors
//! - E2xxx: Build-file dialect errors

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Unterminated string literal
    E0001,
    /// Invalid character in source
    E0002,
    /// Integer literal out of range
    E0003,
    /// Dedent does not match any outer indentation level
    E0004,
    /// Unbalanced bracket
    E0005,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Malformed `load` statement
    E1003,
    /// `load` outside the top level
    E1004,
    /// `return` outside a function
    E1005,
    /// `break`/`continue` outside a loop
    E1006,
    /// Duplicate parameter name
    E1007,
    /// Parameter after `**kwargs`
    E1008,
    /// Invalid assignment target
    E1009,
    /// Nested function definition
    E1010,

    // Build-file dialect errors (E2xxx)
    /// Function definition in a build file
    E2001,
    /// `*args` / `**kwargs` argument in a build file
    E2002,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E1010 => "E1010",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
        }
    }

    /// Check if this is a lexer error (E0xxx range).
    pub fn is_lexer_error(self) -> bool {
        self.as_str().starts_with("E0")
    }

    /// Check if this error is specific to the build-file dialect.
    pub fn is_build_dialect_error(self) -> bool {
        self.as_str().starts_with("E2")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
