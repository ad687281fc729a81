//! Expression parsing.
//!
//! Precedence, lowest to highest:
//!
//! | level | forms |
//! |---|---|
//! | conditional | `a if cond else b` |
//! | or | `a or b` |
//! | and | `a and b` |
//! | not | `not a` |
//! | comparison | `== != < <= > >= in` `not in` (non-associative) |
//! | additive | `+ -` |
//! | multiplicative | `* // %` |
//! | unary | `- +` |
//! | postfix | `a.b` `a[i]` `f(args)` |

use sky_diagnostic::ErrorCode;
use sky_ir::{Arg, ArgKind, BinaryOp, Expr, ExprKind, Span, TokenKind, UnaryOp};
use sky_stack::ensure_sufficient_stack;

use super::Parser;
use crate::ParseError;

impl Parser<'_> {
    pub(super) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.parse_conditional())
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let then_expr = self.parse_or()?;
        if !self.cursor.eat(&TokenKind::If) {
            return Ok(then_expr);
        }
        let cond = self.parse_or()?;
        self.cursor.expect(&TokenKind::Else)?;
        let else_expr = self.parse_expr()?;
        let span = then_expr.span.merge(else_expr.span);
        Ok(Expr::new(
            ExprKind::Conditional {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            span,
        ))
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.cursor.eat(&TokenKind::Or) {
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;
        while self.cursor.eat(&TokenKind::And) {
            let right = self.parse_not()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.cursor.check(&TokenKind::Not) {
            let start = self.cursor.advance().span;
            let operand = ensure_sufficient_stack(|| self.parse_not())?;
            let span = start.merge(operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_additive()?;
        let Some(op) = self.comparison_op() else {
            return Ok(left);
        };
        let right = self.parse_additive()?;
        if self.comparison_op_ahead() {
            return Err(ParseError::new(
                ErrorCode::E1001,
                "comparison operators cannot be chained; use `and`",
                self.cursor.current_span(),
            ));
        }
        Ok(binary(op, left, right))
    }

    /// Consume a comparison operator, if one is next.
    fn comparison_op(&mut self) -> Option<BinaryOp> {
        let op = match self.cursor.current_kind() {
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::In => BinaryOp::In,
            TokenKind::Not if *self.cursor.peek_kind() == TokenKind::In => {
                self.cursor.advance();
                BinaryOp::NotIn
            }
            _ => return None,
        };
        self.cursor.advance();
        Some(op)
    }

    fn comparison_op_ahead(&self) -> bool {
        match self.cursor.current_kind() {
            TokenKind::EqEq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq
            | TokenKind::In => true,
            TokenKind::Not => *self.cursor.peek_kind() == TokenKind::In,
            _ => false,
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::SlashSlash => BinaryOp::FloorDiv,
                TokenKind::Percent => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.cursor.current_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            _ => return self.parse_postfix(),
        };
        let start = self.cursor.advance().span;
        let operand = ensure_sufficient_stack(|| self.parse_unary())?;
        let span = start.merge(operand.span);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.cursor.current_kind() {
                TokenKind::Dot => {
                    self.cursor.advance();
                    let (name, name_span) = self.cursor.expect_ident()?;
                    let span = expr.span.merge(name_span);
                    expr = Expr::new(
                        ExprKind::Attr {
                            object: Box::new(expr),
                            name,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let index = self.parse_expr()?;
                    let end = self.cursor.expect(&TokenKind::RBracket)?;
                    let span = expr.span.merge(end);
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                TokenKind::LParen => {
                    self.cursor.advance();
                    let args = self.parse_call_args()?;
                    let end = self.cursor.expect(&TokenKind::RParen)?;
                    let span = expr.span.merge(end);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Arguments up to (not including) the closing paren.
    fn parse_call_args(&mut self) -> Result<Vec<Arg>, ParseError> {
        let mut args: Vec<Arg> = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            let arg = self.parse_call_arg()?;
            if arg.kind == ArgKind::Positional
                && args.iter().any(|prev| prev.kind != ArgKind::Positional)
            {
                return Err(ParseError::new(
                    ErrorCode::E1001,
                    "positional argument follows keyword or unpacked argument",
                    arg.span,
                ));
            }
            args.push(arg);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }

    fn parse_call_arg(&mut self) -> Result<Arg, ParseError> {
        let start = self.cursor.current_span();
        let kind = match self.cursor.current_kind() {
            TokenKind::Star => {
                self.cursor.advance();
                ArgKind::Star
            }
            TokenKind::StarStar => {
                self.cursor.advance();
                ArgKind::StarStar
            }
            TokenKind::Ident(name) if *self.cursor.peek_kind() == TokenKind::Eq => {
                self.cursor.advance();
                self.cursor.advance();
                ArgKind::Named(name.clone())
            }
            _ => ArgKind::Positional,
        };
        let value = self.parse_expr()?;
        let span = start.merge(value.span);
        Ok(Arg { kind, value, span })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.cursor.current();
        let span = token.span;
        let kind = match &token.kind {
            TokenKind::Int(n) => ExprKind::Int(*n),
            TokenKind::String(value) => ExprKind::Str(value.clone()),
            TokenKind::Ident(name) => ExprKind::Ident(name.clone()),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::NoneKw => ExprKind::None,
            TokenKind::LParen => return self.parse_parenthesized(),
            TokenKind::LBracket => return self.parse_list(),
            TokenKind::LBrace => return self.parse_dict(),
            other => {
                return Err(ParseError::new(
                    ErrorCode::E1002,
                    format!("expected expression, found {}", other.describe()),
                    span,
                ))
            }
        };
        self.cursor.advance();
        Ok(Expr::new(kind, span))
    }

    fn parse_parenthesized(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.expect(&TokenKind::LParen)?;
        let inner = self.parse_expr()?;
        let end = self.cursor.expect(&TokenKind::RParen)?;
        Ok(Expr::new(inner.kind, start.merge(end)))
    }

    fn parse_list(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.expect(&TokenKind::LBracket)?;
        let mut items = Vec::new();
        while !self.cursor.check(&TokenKind::RBracket) {
            items.push(self.parse_expr()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.cursor.expect(&TokenKind::RBracket)?;
        Ok(Expr::new(ExprKind::List(items), start.merge(end)))
    }

    fn parse_dict(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.expect(&TokenKind::LBrace)?;
        let mut entries = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            let key = self.parse_expr()?;
            self.cursor.expect(&TokenKind::Colon)?;
            let value = self.parse_expr()?;
            entries.push((key, value));
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.cursor.expect(&TokenKind::RBrace)?;
        Ok(Expr::new(ExprKind::Dict(entries), start.merge(end)))
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    let span: Span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}
