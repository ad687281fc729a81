//! Grammar productions.
//!
//! The parser is split by syntactic category:
//! - `stmt`: statements, blocks, `load`, `def`
//! - `expr`: expressions by precedence level, call arguments

mod expr;
mod stmt;

use sky_ir::{Stmt, TokenKind, TokenList};

use crate::cursor::Cursor;
use crate::ParseError;

pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: &'a TokenList) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            errors: Vec::new(),
        }
    }

    /// Parse the whole token stream into top-level statements.
    pub(crate) fn parse_file(mut self) -> (Vec<Stmt>, Vec<ParseError>) {
        let mut stmts = Vec::new();
        while !self.cursor.is_at_end() {
            match self.cursor.current_kind() {
                TokenKind::Newline => {
                    self.cursor.advance();
                }
                TokenKind::Dedent => {
                    // Only reachable after an unexpected indent was skipped.
                    self.cursor.advance();
                }
                _ => self.parse_statement_recovering(&mut stmts),
            }
        }
        (stmts, self.errors)
    }

    /// Parse one statement, recording any error and skipping past the line.
    fn parse_statement_recovering(&mut self, out: &mut Vec<Stmt>) {
        let start = self.cursor.position();
        if let Err(error) = self.parse_statement(out) {
            self.errors.push(error);
            self.cursor.synchronize();
            if self.cursor.position() == start {
                self.cursor.advance();
            }
        }
    }
}
