//! Sky Parse - recursive-descent parser for build and extension files.
//!
//! [`parse`] lexes, parses and validates a file in one go. It never stops at
//! the first problem: lexer, grammar and compile-time errors are all collected
//! in [`ParsedFile::errors`], ordered by position, and the statements that did
//! parse are still returned.
//!
//! Build files get one more pass, [`check_build_syntax`], which the loader
//! runs only for files of kind `FileKind::Build`.

mod build_check;
mod cursor;
mod error;
mod grammar;
mod validate;

use sky_diagnostic::Diagnostic;
use sky_ir::{LoadStmt, SourceInfo, Stmt, StmtKind};

pub use build_check::check_build_syntax;
pub use error::ParseError;

use crate::grammar::Parser;

/// Result of parsing one file.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct ParsedFile {
    pub stmts: Vec<Stmt>,
    pub errors: Vec<ParseError>,
}

impl ParsedFile {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Top-level `load` statements in source order.
    pub fn loads(&self) -> impl Iterator<Item = &LoadStmt> {
        self.stmts.iter().filter_map(|stmt| match &stmt.kind {
            StmtKind::Load(load) => Some(load),
            _ => None,
        })
    }

    /// Errors rendered as diagnostics located in `source`.
    pub fn diagnostics(&self, source: &SourceInfo) -> Vec<Diagnostic> {
        self.errors
            .iter()
            .map(|error| error.to_diagnostic(source))
            .collect()
    }
}

/// Lex, parse and validate `source`.
pub fn parse(source: &str) -> ParsedFile {
    let lexed = sky_lexer::lex(source);
    let (stmts, parse_errors) = Parser::new(&lexed.tokens).parse_file();

    let mut errors: Vec<ParseError> = lexed.errors.into_iter().map(ParseError::from).collect();
    errors.extend(parse_errors);
    errors.extend(validate::validate(&stmts));
    errors.sort_by_key(|error| error.span.start);

    ParsedFile { stmts, errors }
}

#[cfg(test)]
mod tests;
