//! Token cursor for navigating the token stream.

use sky_ir::{Span, Token, TokenKind, TokenList};

use crate::ParseError;

/// Cursor over a token list whose last token is always `Eof`.
pub struct Cursor<'a> {
    tokens: &'a TokenList,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a TokenList) -> Self {
        Cursor { tokens, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Current token. Past the end this keeps returning the final `Eof`.
    #[inline]
    pub fn current(&self) -> &'a Token {
        let index = self.pos.min(self.tokens.len().saturating_sub(1));
        &self.tokens[index]
    }

    #[inline]
    pub fn current_kind(&self) -> &'a TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Kind of the token after the current one.
    pub fn peek_kind(&self) -> &'a TokenKind {
        let index = (self.pos + 1).min(self.tokens.len().saturating_sub(1));
        &self.tokens[index].kind
    }

    pub fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::DUMMY,
        }
    }

    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    pub fn is_at_end(&self) -> bool {
        self.check(&TokenKind::Eof)
    }

    /// Consume the current token and return it.
    pub fn advance(&mut self) -> &'a Token {
        let token = self.current();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it matches `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of `kind` or fail with an "expected" error.
    pub fn expect(&mut self, kind: &TokenKind) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(ParseError::unexpected(
                &kind.describe(),
                self.current_kind(),
                self.current_span(),
            ))
        }
    }

    /// Consume an identifier and return its name.
    pub fn expect_ident(&mut self) -> Result<(String, Span), ParseError> {
        if let TokenKind::Ident(name) = self.current_kind() {
            let span = self.advance().span;
            Ok((name.clone(), span))
        } else {
            Err(ParseError::unexpected(
                "identifier",
                self.current_kind(),
                self.current_span(),
            ))
        }
    }

    /// Consume a string literal and return its value.
    pub fn expect_string(&mut self) -> Result<(String, Span), ParseError> {
        if let TokenKind::String(value) = self.current_kind() {
            let span = self.advance().span;
            Ok((value.clone(), span))
        } else {
            Err(ParseError::unexpected(
                "string literal",
                self.current_kind(),
                self.current_span(),
            ))
        }
    }

    /// Skip past the end of the current logical line.
    ///
    /// Nested blocks opened on the skipped line are skipped with it, so the
    /// cursor lands at the start of the next statement at the same depth.
    pub fn synchronize(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::Eof => return,
                TokenKind::Newline if depth == 0 => {
                    self.advance();
                    if self.check(&TokenKind::Indent) {
                        depth += 1;
                        self.advance();
                        continue;
                    }
                    return;
                }
                TokenKind::Indent => depth += 1,
                TokenKind::Dedent => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }
}
