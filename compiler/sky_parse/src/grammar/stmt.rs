//! Statement parsing.

use std::sync::Arc;

use sky_diagnostic::ErrorCode;
use sky_ir::{
    BinaryOp, ExprKind, FunctionDef, LoadStmt, LoadedSymbol, Param, ParamKind, Span, Stmt,
    StmtKind, TokenKind,
};

use super::Parser;
use crate::ParseError;

impl Parser<'_> {
    /// Parse a statement; a simple line may contribute several statements.
    pub(super) fn parse_statement(&mut self, out: &mut Vec<Stmt>) -> Result<(), ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Def => {
                let stmt = self.parse_def()?;
                out.push(stmt);
                Ok(())
            }
            TokenKind::If => {
                let stmt = self.parse_if()?;
                out.push(stmt);
                Ok(())
            }
            TokenKind::For => {
                let stmt = self.parse_for()?;
                out.push(stmt);
                Ok(())
            }
            TokenKind::Indent => Err(ParseError::new(
                ErrorCode::E1001,
                "unexpected indent",
                self.cursor.current_span(),
            )),
            _ => self.parse_simple_line(out),
        }
    }

    /// `small (';' small)* [';'] NEWLINE`
    fn parse_simple_line(&mut self, out: &mut Vec<Stmt>) -> Result<(), ParseError> {
        loop {
            let stmt = self.parse_small_statement()?;
            out.push(stmt);
            if !self.cursor.eat(&TokenKind::Semicolon) {
                break;
            }
            if self.cursor.check(&TokenKind::Newline) || self.cursor.is_at_end() {
                break;
            }
        }
        if !self.cursor.is_at_end() {
            self.cursor.expect(&TokenKind::Newline)?;
        }
        Ok(())
    }

    fn parse_small_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_span();
        match self.cursor.current_kind() {
            TokenKind::Load => self.parse_load(),
            TokenKind::Return => {
                self.cursor.advance();
                let value = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                let span = start.merge(self.cursor.previous_span());
                Ok(Stmt::new(StmtKind::Return(value), span))
            }
            TokenKind::Break => {
                self.cursor.advance();
                Ok(Stmt::new(StmtKind::Break, start))
            }
            TokenKind::Continue => {
                self.cursor.advance();
                Ok(Stmt::new(StmtKind::Continue, start))
            }
            TokenKind::Pass => {
                self.cursor.advance();
                Ok(Stmt::new(StmtKind::Pass, start))
            }
            _ => self.parse_expr_or_assign(),
        }
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.cursor.current_kind(),
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof
        )
    }

    fn parse_expr_or_assign(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.parse_expr()?;
        let op = match self.cursor.current_kind() {
            TokenKind::Eq => None,
            TokenKind::PlusEq => Some(BinaryOp::Add),
            TokenKind::MinusEq => Some(BinaryOp::Sub),
            _ => {
                let span = expr.span;
                return Ok(Stmt::new(StmtKind::Expr(expr), span));
            }
        };
        self.cursor.advance();

        let ExprKind::Ident(target) = expr.kind else {
            return Err(ParseError::new(
                ErrorCode::E1009,
                "only plain names can be assigned to",
                expr.span,
            ));
        };
        let value = self.parse_expr()?;
        let span = expr.span.merge(value.span);
        let kind = match op {
            None => StmtKind::Assign { target, value },
            Some(op) => StmtKind::AugAssign { target, op, value },
        };
        Ok(Stmt::new(kind, span))
    }

    /// `load("<module>", "sym", local = "sym", ...)`
    fn parse_load(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.expect(&TokenKind::Load)?;
        self.cursor.expect(&TokenKind::LParen)?;
        let (module, module_span) = self.cursor.expect_string().map_err(|_| {
            ParseError::new(
                ErrorCode::E1003,
                "the first argument of load must be a string literal",
                self.cursor.current_span(),
            )
        })?;

        let mut symbols = Vec::new();
        while self.cursor.eat(&TokenKind::Comma) {
            if self.cursor.check(&TokenKind::RParen) {
                break;
            }
            symbols.push(self.parse_loaded_symbol()?);
        }
        let end = self.cursor.expect(&TokenKind::RParen)?;
        let span = start.merge(end);

        if symbols.is_empty() {
            self.errors.push(ParseError::new(
                ErrorCode::E1003,
                "load statement must import at least one symbol",
                span,
            ));
        }

        Ok(Stmt::new(
            StmtKind::Load(LoadStmt {
                module,
                module_span,
                symbols,
            }),
            span,
        ))
    }

    fn parse_loaded_symbol(&mut self) -> Result<LoadedSymbol, ParseError> {
        let span = self.cursor.current_span();
        match self.cursor.current_kind() {
            TokenKind::String(name) => {
                self.cursor.advance();
                check_symbol_name(name, span)?;
                Ok(LoadedSymbol {
                    local: name.clone(),
                    remote: name.clone(),
                    span,
                })
            }
            TokenKind::Ident(local) if *self.cursor.peek_kind() == TokenKind::Eq => {
                self.cursor.advance();
                self.cursor.advance();
                let (remote, remote_span) = self.cursor.expect_string()?;
                check_symbol_name(&remote, remote_span)?;
                Ok(LoadedSymbol {
                    local: local.clone(),
                    remote,
                    span: span.merge(remote_span),
                })
            }
            other => Err(ParseError::new(
                ErrorCode::E1003,
                format!(
                    "load symbols must be string literals or `name = \"symbol\"`, found {}",
                    other.describe()
                ),
                span,
            )),
        }
    }

    /// `def name(params): suite`
    fn parse_def(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.expect(&TokenKind::Def)?;
        let (name, _) = self.cursor.expect_ident()?;
        self.cursor.expect(&TokenKind::LParen)?;

        let mut params = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            params.push(self.parse_param()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;

        let body = self.parse_suite()?;
        let span = start.merge(self.cursor.previous_span());
        let function = FunctionDef {
            name,
            params,
            body,
            span,
        };
        Ok(Stmt::new(StmtKind::Def(Arc::new(function)), span))
    }

    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let start = self.cursor.current_span();
        if self.cursor.eat(&TokenKind::StarStar) {
            let (name, end) = self.cursor.expect_ident()?;
            return Ok(Param {
                name,
                kind: ParamKind::Kwargs,
                default: None,
                span: start.merge(end),
            });
        }
        let (name, name_span) = self.cursor.expect_ident()?;
        let default = if self.cursor.eat(&TokenKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let span = match &default {
            Some(expr) => name_span.merge(expr.span),
            None => name_span,
        };
        Ok(Param {
            name,
            kind: ParamKind::Normal,
            default,
            span,
        })
    }

    /// `if cond: suite (elif cond: suite)* [else: suite]`
    ///
    /// `elif` chains become nested `If` statements in the else branch.
    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.advance().span;
        let cond = self.parse_expr()?;
        let then_body = self.parse_suite()?;

        let else_body = match self.cursor.current_kind() {
            TokenKind::Elif => vec![self.parse_if()?],
            TokenKind::Else => {
                self.cursor.advance();
                self.parse_suite()?
            }
            _ => Vec::new(),
        };

        let span = start.merge(self.cursor.previous_span());
        Ok(Stmt::new(
            StmtKind::If {
                cond,
                then_body,
                else_body,
            },
            span,
        ))
    }

    /// `for var in iterable: suite`
    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.expect(&TokenKind::For)?;
        let (var, _) = self.cursor.expect_ident()?;
        self.cursor.expect(&TokenKind::In)?;
        let iterable = self.parse_expr()?;
        let body = self.parse_suite()?;
        let span = start.merge(self.cursor.previous_span());
        Ok(Stmt::new(StmtKind::For { var, iterable, body }, span))
    }

    /// `':' (simple_line | NEWLINE INDENT stmt+ DEDENT)`
    fn parse_suite(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.cursor.expect(&TokenKind::Colon)?;
        let mut body = Vec::new();

        if !self.cursor.eat(&TokenKind::Newline) {
            self.parse_simple_line(&mut body)?;
            return Ok(body);
        }

        self.cursor.expect(&TokenKind::Indent).map_err(|_| {
            ParseError::new(
                ErrorCode::E1001,
                "expected an indented block",
                self.cursor.current_span(),
            )
        })?;
        while !self.cursor.check(&TokenKind::Dedent) && !self.cursor.is_at_end() {
            if self.cursor.eat(&TokenKind::Newline) {
                continue;
            }
            self.parse_statement_recovering(&mut body);
        }
        self.cursor.eat(&TokenKind::Dedent);
        Ok(body)
    }
}

fn check_symbol_name(name: &str, span: Span) -> Result<(), ParseError> {
    if !is_identifier(name) {
        return Err(ParseError::new(
            ErrorCode::E1003,
            format!("`{name}` is not a valid symbol name"),
            span,
        ));
    }
    if name.starts_with('_') {
        return Err(ParseError::new(
            ErrorCode::E1003,
            format!("symbol `{name}` is private and cannot be loaded"),
            span,
        ));
    }
    Ok(())
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
