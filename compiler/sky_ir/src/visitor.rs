//! AST visitor.
//!
//! Default `visit_*` implementations call the matching `walk_*` function,
//! which traverses children. Override a `visit_*` method to act on a node and
//! call `walk_*` from it to keep descending.
//!
//! ```text
//! struct CountCalls(usize);
//!
//! impl<'ast> Visitor<'ast> for CountCalls {
//!     fn visit_expr(&mut self, expr: &'ast Expr) {
//!         if let ExprKind::Call { .. } = expr.kind {
//!             self.0 += 1;
//!         }
//!         walk_expr(self, expr);
//!     }
//! }
//! ```

use crate::ast::{Arg, Expr, ExprKind, FunctionDef, Stmt, StmtKind};

pub trait Visitor<'ast> {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_function(&mut self, function: &'ast FunctionDef) {
        walk_function(self, function);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }

    fn visit_arg(&mut self, arg: &'ast Arg) {
        self.visit_expr(&arg.value);
    }
}

pub fn walk_stmts<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, stmts: &'ast [Stmt]) {
    for stmt in stmts {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, stmt: &'ast Stmt) {
    match &stmt.kind {
        StmtKind::Assign { value, .. } | StmtKind::AugAssign { value, .. } => {
            visitor.visit_expr(value);
        }
        StmtKind::Expr(expr) | StmtKind::Return(Some(expr)) => visitor.visit_expr(expr),
        StmtKind::Def(function) => visitor.visit_function(function),
        StmtKind::If {
            cond,
            then_body,
            else_body,
        } => {
            visitor.visit_expr(cond);
            walk_stmts(visitor, then_body);
            walk_stmts(visitor, else_body);
        }
        StmtKind::For { iterable, body, .. } => {
            visitor.visit_expr(iterable);
            walk_stmts(visitor, body);
        }
        StmtKind::Load(_)
        | StmtKind::Return(None)
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Pass => {}
    }
}

pub fn walk_function<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    function: &'ast FunctionDef,
) {
    for param in &function.params {
        if let Some(default) = &param.default {
            visitor.visit_expr(default);
        }
    }
    walk_stmts(visitor, &function.body);
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, expr: &'ast Expr) {
    match &expr.kind {
        ExprKind::None
        | ExprKind::Bool(_)
        | ExprKind::Int(_)
        | ExprKind::Str(_)
        | ExprKind::Ident(_) => {}
        ExprKind::List(items) => {
            for item in items {
                visitor.visit_expr(item);
            }
        }
        ExprKind::Dict(entries) => {
            for (key, value) in entries {
                visitor.visit_expr(key);
                visitor.visit_expr(value);
            }
        }
        ExprKind::Attr { object, .. } => visitor.visit_expr(object),
        ExprKind::Index { object, index } => {
            visitor.visit_expr(object);
            visitor.visit_expr(index);
        }
        ExprKind::Call { callee, args } => {
            visitor.visit_expr(callee);
            for arg in args {
                visitor.visit_arg(arg);
            }
        }
        ExprKind::Unary { operand, .. } => visitor.visit_expr(operand),
        ExprKind::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::Conditional {
            cond,
            then_expr,
            else_expr,
        } => {
            visitor.visit_expr(cond);
            visitor.visit_expr(then_expr);
            visitor.visit_expr(else_expr);
        }
    }
}
