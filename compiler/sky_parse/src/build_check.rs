//! Stricter checks for build files.
//!
//! Build files are declarative: they call rules and macros but never define
//! functions, and call sites spell out their arguments instead of spreading
//! `*args`/`**kwargs`. Extension files have no such restriction.

use sky_diagnostic::ErrorCode;
use sky_ir::visitor::{walk_stmt, walk_stmts};
use sky_ir::{Arg, ArgKind, Stmt, StmtKind, Visitor};

use crate::ParseError;

/// Check statements of a build file against the build-file dialect.
pub fn check_build_syntax(stmts: &[Stmt]) -> Vec<ParseError> {
    let mut checker = BuildChecker::default();
    walk_stmts(&mut checker, stmts);
    checker.errors
}

#[derive(Default)]
struct BuildChecker {
    errors: Vec<ParseError>,
}

impl<'ast> Visitor<'ast> for BuildChecker {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        if let StmtKind::Def(function) = &stmt.kind {
            self.errors.push(ParseError::new(
                ErrorCode::E2001,
                format!(
                    "function `{}` cannot be defined in a build file; define it in an \
                     extension file and load it",
                    function.name
                ),
                function.span,
            ));
            return;
        }
        walk_stmt(self, stmt);
    }

    fn visit_arg(&mut self, arg: &'ast Arg) {
        let spread = match arg.kind {
            ArgKind::Star => Some("*args"),
            ArgKind::StarStar => Some("**kwargs"),
            ArgKind::Positional | ArgKind::Named(_) => None,
        };
        if let Some(spread) = spread {
            self.errors.push(ParseError::new(
                ErrorCode::E2002,
                format!("{spread} is not allowed in build files"),
                arg.span,
            ));
        }
        self.visit_expr(&arg.value);
    }
}
