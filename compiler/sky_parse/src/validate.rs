//! Compile-time checks that the grammar alone does not enforce.
//!
//! - `load` only at the top level of a file
//! - `return` only inside `def`, `break`/`continue` only inside `for`
//! - no nested `def`
//! - parameter lists: unique names, nothing after `**kwargs`, required
//!   parameters before optional ones

use rustc_hash::FxHashSet;
use sky_diagnostic::ErrorCode;
use sky_ir::{FunctionDef, ParamKind, Stmt, StmtKind};

use crate::ParseError;

#[derive(Copy, Clone, Default)]
struct Scope {
    top_level: bool,
    in_def: bool,
    in_loop: bool,
}

pub(crate) fn validate(stmts: &[Stmt]) -> Vec<ParseError> {
    let mut errors = Vec::new();
    let scope = Scope {
        top_level: true,
        ..Scope::default()
    };
    check_block(stmts, scope, &mut errors);
    errors
}

fn check_block(stmts: &[Stmt], scope: Scope, errors: &mut Vec<ParseError>) {
    for stmt in stmts {
        check_stmt(stmt, scope, errors);
    }
}

fn check_stmt(stmt: &Stmt, scope: Scope, errors: &mut Vec<ParseError>) {
    let nested = Scope {
        top_level: false,
        ..scope
    };
    match &stmt.kind {
        StmtKind::Load(_) if !scope.top_level => errors.push(ParseError::new(
            ErrorCode::E1004,
            "load statements may only appear at the top level of a file",
            stmt.span,
        )),
        StmtKind::Return(_) if !scope.in_def => errors.push(ParseError::new(
            ErrorCode::E1005,
            "return statement outside of a function",
            stmt.span,
        )),
        StmtKind::Break | StmtKind::Continue if !scope.in_loop => {
            let keyword = if matches!(stmt.kind, StmtKind::Break) {
                "break"
            } else {
                "continue"
            };
            errors.push(ParseError::new(
                ErrorCode::E1006,
                format!("{keyword} statement outside of a loop"),
                stmt.span,
            ));
        }
        StmtKind::Def(function) => {
            if scope.in_def {
                errors.push(ParseError::new(
                    ErrorCode::E1010,
                    format!("nested function `{}` is not supported", function.name),
                    function.span,
                ));
            }
            check_params(function, errors);
            let body_scope = Scope {
                top_level: false,
                in_def: true,
                in_loop: false,
            };
            check_block(&function.body, body_scope, errors);
        }
        StmtKind::If {
            then_body,
            else_body,
            ..
        } => {
            check_block(then_body, nested, errors);
            check_block(else_body, nested, errors);
        }
        StmtKind::For { body, .. } => {
            let loop_scope = Scope {
                in_loop: true,
                ..nested
            };
            check_block(body, loop_scope, errors);
        }
        _ => {}
    }
}

fn check_params(function: &FunctionDef, errors: &mut Vec<ParseError>) {
    let mut seen = FxHashSet::default();
    let mut saw_kwargs = false;
    let mut saw_default = false;

    for param in &function.params {
        if !seen.insert(param.name.as_str()) {
            errors.push(ParseError::new(
                ErrorCode::E1007,
                format!(
                    "duplicate parameter `{}` in function `{}`",
                    param.name, function.name
                ),
                param.span,
            ));
        }
        if saw_kwargs {
            errors.push(ParseError::new(
                ErrorCode::E1008,
                format!("parameter `{}` follows `**kwargs`", param.name),
                param.span,
            ));
        }
        match param.kind {
            ParamKind::Kwargs => saw_kwargs = true,
            ParamKind::Normal if param.default.is_some() => saw_default = true,
            ParamKind::Normal if saw_default => errors.push(ParseError::new(
                ErrorCode::E1008,
                format!(
                    "required parameter `{}` follows an optional parameter",
                    param.name
                ),
                param.span,
            )),
            ParamKind::Normal => {}
        }
    }
}
