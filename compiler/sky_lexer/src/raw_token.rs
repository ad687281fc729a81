//! Raw Token Definition
//!
//! The `RawToken` enum is the logos-derived tokenizer output before
//! layout processing (indentation) and literal conversion.

use logos::Logos;

/// Raw token from logos.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\f]+")] // Skip horizontal whitespace
pub(crate) enum RawToken {
    #[regex(r"#[^\n]*", logos::skip)]
    Comment,

    /// Newline plus the indentation of the following line.
    #[regex(r"\n[ \t]*")]
    Newline,

    #[regex(r"\\[ \t]*\r?\n", logos::skip)]
    LineContinuation,

    #[token("and")]
    And,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("def")]
    Def,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("False")]
    False,
    #[token("for")]
    For,
    #[token("if")]
    If,
    #[token("in")]
    In,
    #[token("load")]
    Load,
    #[token("None")]
    NoneKw,
    #[token("not")]
    Not,
    #[token("or")]
    Or,
    #[token("pass")]
    Pass,
    #[token("return")]
    Return,
    #[token("True")]
    True,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+")]
    Int,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r#"'([^'\\\n]|\\.)*'"#)]
    String,

    #[token(r#"""""#, |lex| scan_triple_quoted(lex, r#"""""#))]
    #[token("'''", |lex| scan_triple_quoted(lex, "'''"))]
    TripleString,

    #[regex(r#""([^"\\\n]|\\.)*"#)]
    #[regex(r#"'([^'\\\n]|\\.)*"#)]
    UnterminatedString,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(";")]
    Semicolon,

    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    StarStar,
    #[token("//")]
    SlashSlash,
    #[token("%")]
    Percent,
}

/// Consume up to and including the closing triple quote.
///
/// Returns `false` (a lex error) when the file ends first.
fn scan_triple_quoted(lex: &mut logos::Lexer<'_, RawToken>, closing: &str) -> bool {
    let remainder = lex.remainder();
    let mut search_from = 0;
    while let Some(found) = remainder[search_from..].find(closing) {
        let end = search_from + found;
        // An escaped quote cannot close the string
        let backslashes = remainder[..end]
            .bytes()
            .rev()
            .take_while(|&b| b == b'\\')
            .count();
        if backslashes % 2 == 0 {
            lex.bump(end + closing.len());
            return true;
        }
        search_from = end + 1;
    }
    lex.bump(remainder.len());
    false
}
