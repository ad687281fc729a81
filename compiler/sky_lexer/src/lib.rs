//! Sky Lexer - tokenizer for build and extension files.
//!
//! Tokenization happens in two passes:
//!
//! 1. `logos` splits the source into [`RawToken`]s. Each physical newline is
//!    a single raw token whose slice includes the indentation of the next
//!    line.
//! 2. The layout pass turns raw tokens into [`TokenKind`]s, converts literals,
//!    drops newlines inside brackets, collapses blank lines, and synthesizes
//!    `Indent`/`Dedent` tokens from indentation changes.
//!
//! Lexing never stops at the first problem: every error is collected in
//! [`LexOutput::errors`] and the token stream stays usable for the parser.

mod escape;
mod raw_token;

use logos::Logos;
use sky_diagnostic::ErrorCode;
use sky_ir::{Span, Token, TokenKind, TokenList};

use crate::escape::unescape_string;
use crate::raw_token::RawToken;

/// A lexical error.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct LexError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
}

impl LexError {
    #[cold]
    fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        LexError {
            code,
            message: message.into(),
            span,
        }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LexError {}

/// Tokens plus every error encountered.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct LexOutput {
    pub tokens: TokenList,
    pub errors: Vec<LexError>,
}

impl LexOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Tokenize `source`.
pub fn lex(source: &str) -> LexOutput {
    let mut layout = Layout::default();
    let mut raw = RawToken::lexer(source);

    while let Some(result) = raw.next() {
        let span = Span::from_range(raw.span());
        let slice = raw.slice();
        match result {
            Ok(RawToken::Newline) => layout.newline(indent_width(&slice[1..]), span),
            Ok(token) => {
                if let Some(kind) = convert(token, slice, span, &mut layout.errors) {
                    layout.push(kind, span);
                }
            }
            Err(()) => {
                let message = if slice.starts_with("\"\"\"") || slice.starts_with("'''") {
                    "unterminated triple-quoted string".to_string()
                } else {
                    format!("invalid character `{}`", slice.escape_debug())
                };
                let code = if slice.starts_with("\"\"\"") || slice.starts_with("'''") {
                    ErrorCode::E0001
                } else {
                    ErrorCode::E0002
                };
                layout.errors.push(LexError::new(code, message, span));
            }
        }
    }

    let end = Span::from_range(source.len()..source.len());
    layout.finish(end)
}

/// Width of an indentation prefix; tabs advance to the next multiple of 8.
fn indent_width(indent: &str) -> usize {
    indent.chars().fold(0, |width, c| match c {
        '\t' => (width / 8 + 1) * 8,
        _ => width + 1,
    })
}

fn convert(
    raw: RawToken,
    slice: &str,
    span: Span,
    errors: &mut Vec<LexError>,
) -> Option<TokenKind> {
    let kind = match raw {
        RawToken::Ident => TokenKind::Ident(slice.to_string()),
        RawToken::Int => match slice.parse::<i64>() {
            Ok(n) => TokenKind::Int(n),
            Err(_) => {
                errors.push(LexError::new(
                    ErrorCode::E0003,
                    format!("integer literal `{slice}` is out of range"),
                    span,
                ));
                TokenKind::Int(0)
            }
        },
        RawToken::String => TokenKind::String(unescape_string(&slice[1..slice.len() - 1])),
        RawToken::TripleString => {
            TokenKind::String(unescape_string(&slice[3..slice.len() - 3]))
        }
        RawToken::UnterminatedString => {
            errors.push(LexError::new(
                ErrorCode::E0001,
                "unterminated string literal",
                span,
            ));
            TokenKind::String(unescape_string(&slice[1..]))
        }
        RawToken::And => TokenKind::And,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Def => TokenKind::Def,
        RawToken::Elif => TokenKind::Elif,
        RawToken::Else => TokenKind::Else,
        RawToken::False => TokenKind::False,
        RawToken::For => TokenKind::For,
        RawToken::If => TokenKind::If,
        RawToken::In => TokenKind::In,
        RawToken::Load => TokenKind::Load,
        RawToken::NoneKw => TokenKind::NoneKw,
        RawToken::Not => TokenKind::Not,
        RawToken::Or => TokenKind::Or,
        RawToken::Pass => TokenKind::Pass,
        RawToken::Return => TokenKind::Return,
        RawToken::True => TokenKind::True,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Eq => TokenKind::Eq,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::StarStar => TokenKind::StarStar,
        RawToken::SlashSlash => TokenKind::SlashSlash,
        RawToken::Percent => TokenKind::Percent,
        // Skipped by logos; never yielded
        RawToken::Comment | RawToken::LineContinuation | RawToken::Newline => return None,
    };
    Some(kind)
}

/// Indentation and bracket tracking for the layout pass.
struct Layout {
    tokens: TokenList,
    errors: Vec<LexError>,
    /// Open indentation levels; always starts with 0.
    indents: Vec<usize>,
    /// Open bracket tokens, for newline suppression and balance errors.
    brackets: Vec<(TokenKind, Span)>,
    /// Indentation of the most recent line break, not yet applied.
    pending: Option<(usize, Span)>,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            tokens: Vec::new(),
            errors: Vec::new(),
            indents: vec![0],
            brackets: Vec::new(),
            pending: None,
        }
    }
}

impl Layout {
    fn newline(&mut self, width: usize, span: Span) {
        if !self.brackets.is_empty() {
            return;
        }
        // Blank and comment-only lines: the last break wins.
        self.pending = Some((width, span));
    }

    fn push(&mut self, kind: TokenKind, span: Span) {
        if let Some((width, newline_span)) = self.pending.take() {
            self.apply_indent(width, newline_span);
        }

        match kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                self.brackets.push((kind.clone(), span));
            }
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                let expected = match kind {
                    TokenKind::RParen => TokenKind::LParen,
                    TokenKind::RBracket => TokenKind::LBracket,
                    _ => TokenKind::LBrace,
                };
                match self.brackets.last() {
                    Some((open, _)) if *open == expected => {
                        self.brackets.pop();
                    }
                    _ => self.errors.push(LexError::new(
                        ErrorCode::E0005,
                        format!("unbalanced {}", kind.describe()),
                        span,
                    )),
                }
            }
            _ => {}
        }

        self.tokens.push(Token::new(kind, span));
    }

    fn apply_indent(&mut self, width: usize, span: Span) {
        if self.tokens.is_empty() {
            // Leading blank lines; the first statement sets the base level.
            return;
        }
        self.tokens.push(Token::new(TokenKind::Newline, span));

        let current = self.indents.last().copied().unwrap_or(0);
        if width > current {
            self.indents.push(width);
            self.tokens.push(Token::new(TokenKind::Indent, span));
            return;
        }
        while width < self.indents.last().copied().unwrap_or(0) {
            self.indents.pop();
            self.tokens.push(Token::new(TokenKind::Dedent, span));
        }
        if width != self.indents.last().copied().unwrap_or(0) {
            self.errors.push(LexError::new(
                ErrorCode::E0004,
                "unindent does not match any outer indentation level",
                span,
            ));
        }
    }

    fn finish(mut self, end: Span) -> LexOutput {
        for (open, span) in std::mem::take(&mut self.brackets) {
            self.errors.push(LexError::new(
                ErrorCode::E0005,
                format!("unclosed {}", open.describe()),
                span,
            ));
        }
        if !self.tokens.is_empty() {
            self.tokens.push(Token::new(TokenKind::Newline, end));
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.tokens.push(Token::new(TokenKind::Dedent, end));
        }
        self.tokens.push(Token::new(TokenKind::Eof, end));
        LexOutput {
            tokens: self.tokens,
            errors: self.errors,
        }
    }
}
