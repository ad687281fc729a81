//! Tree-walking interpreter.
//!
//! One [`Interpreter`] evaluates modules against a single [`EvalContext`].
//! Evaluating a module:
//!
//! 1. tells the bind hook the module is about to run;
//! 2. binds the symbols its `load` statements name, taken from the already
//!    evaluated dependency modules, and the implicit-include symbols;
//! 3. executes the top-level statements, reporting every top-level binding
//!    to the bind hook;
//! 4. merges symbols added with `load_symbols` and freezes the module.
//!
//! Cancellation is checked before every statement, call and loop iteration.

mod call;
mod ops;

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use sky_ir::{Expr, ExprKind, FileKind, Stmt, StmtKind};
use sky_stack::ensure_sufficient_stack;

use crate::builtins::{self, get_attr};
use crate::errors::{missing_symbol, undefined_variable, EvalError, EvalResult};
use crate::value::{DictKey, FunctionValue};
use crate::{EvalContext, Module, Program, Value};

/// Evaluated dependencies of a program, keyed by the import string used in
/// its `load` statements.
pub type LoadedModules = FxHashMap<String, Arc<Module>>;

/// How control leaves a block.
enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

/// Where names are bound: function locals, or the module's globals at the
/// top level.
struct Scope {
    module: Arc<Module>,
    locals: Option<FxHashMap<String, Value>>,
}

impl Scope {
    fn location(&self, span: sky_ir::Span) -> sky_ir::Location {
        self.module.source().location(span)
    }
}

pub struct Interpreter<'a> {
    ctx: &'a EvalContext<'a>,
    build_universe: FxHashMap<String, Value>,
    extension_universe: FxHashMap<String, Value>,
    /// Functions currently executing, innermost last.
    call_stack: Vec<Arc<FunctionValue>>,
    /// Symbols added by `load_symbols`; `Some` only while an extension body
    /// runs.
    pending_exports: Option<IndexMap<String, Value>>,
}

impl<'a> Interpreter<'a> {
    pub fn new(ctx: &'a EvalContext<'a>) -> Self {
        Interpreter {
            ctx,
            build_universe: builtins::universe(FileKind::Build, ctx.native_rules),
            extension_universe: builtins::universe(FileKind::Extension, ctx.native_rules),
            call_stack: Vec::new(),
            pending_exports: None,
        }
    }

    pub fn context(&self) -> &'a EvalContext<'a> {
        self.ctx
    }

    pub(crate) fn pending_exports(&mut self) -> Option<&mut IndexMap<String, Value>> {
        self.pending_exports.as_mut()
    }

    /// Evaluate `program` into a frozen module.
    ///
    /// Every `load` of the program must have an entry in `loaded`; `implicit`
    /// holds the implicit-include symbols by local name.
    pub fn eval_module(
        &mut self,
        program: &Program,
        loaded: &LoadedModules,
        implicit: &IndexMap<String, Value>,
    ) -> EvalResult<Arc<Module>> {
        let label = program.label();
        tracing::debug!(%label, kind = %program.kind(), "evaluating module");
        self.ctx.hook.before_module(label);
        let module = Module::new(label.clone(), program.kind(), program.source().clone());

        for (load, location) in program.loads() {
            let dependency = loaded.get(&load.module).ok_or_else(|| {
                EvalError::new(format!("module `{}` was not loaded", load.module))
                    .or_at(|| location.clone())
            })?;
            for symbol in &load.symbols {
                let value = dependency.get(&symbol.remote).ok_or_else(|| {
                    missing_symbol(&symbol.remote, &load.module)
                        .or_at(|| program.source().location(symbol.span))
                })?;
                module.set_file_local(&symbol.local, value)?;
            }
        }
        for (name, value) in implicit {
            module.set_file_local(name, value.clone())?;
        }

        let collecting = program.kind() == FileKind::Extension;
        let outer = std::mem::replace(&mut self.pending_exports, collecting.then(IndexMap::new));
        let mut scope = Scope {
            module: Arc::clone(&module),
            locals: None,
        };
        let outcome = self.exec_block(program.stmts(), &mut scope);
        let exports = std::mem::replace(&mut self.pending_exports, outer);
        outcome?;

        for (name, value) in exports.into_iter().flatten() {
            module.set_global(&name, value)?;
        }
        module.freeze();
        Ok(module)
    }

    fn exec_block(&mut self, stmts: &[Stmt], scope: &mut Scope) -> EvalResult<Flow> {
        for stmt in stmts {
            match self.exec_stmt(stmt, scope)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt, scope: &mut Scope) -> EvalResult<Flow> {
        self.ctx.cancel.check()?;
        self.exec_stmt_inner(stmt, scope)
            .map_err(|e| e.or_at(|| scope.location(stmt.span)))
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt, scope: &mut Scope) -> EvalResult<Flow> {
        match &stmt.kind {
            StmtKind::Load(_) | StmtKind::Pass => {}
            StmtKind::Assign { target, value } => {
                let value = self.eval_expr(value, scope)?;
                self.assign(scope, target, value)?;
            }
            StmtKind::AugAssign { target, op, value } => {
                let current = self.lookup(scope, target)?;
                let rhs = self.eval_expr(value, scope)?;
                let result = ops::augmented(*op, &current, &rhs)?;
                self.assign(scope, target, result)?;
            }
            StmtKind::Expr(expr) => {
                self.eval_expr(expr, scope)?;
            }
            StmtKind::Def(def) => {
                let mut defaults = Vec::with_capacity(def.params.len());
                for param in &def.params {
                    defaults.push(match &param.default {
                        Some(expr) => Some(self.eval_expr(expr, scope)?),
                        None => None,
                    });
                }
                let function = FunctionValue::new(Arc::clone(def), &scope.module, defaults);
                self.assign(scope, &def.name, Value::Function(Arc::new(function)))?;
            }
            StmtKind::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr, scope)?,
                    None => Value::None,
                };
                return Ok(Flow::Return(value));
            }
            StmtKind::If {
                cond,
                then_body,
                else_body,
            } => {
                let body = if self.eval_expr(cond, scope)?.truth() {
                    then_body
                } else {
                    else_body
                };
                return self.exec_block(body, scope);
            }
            StmtKind::For {
                var,
                iterable,
                body,
            } => {
                for item in self.eval_expr(iterable, scope)?.iterate()? {
                    self.ctx.cancel.check()?;
                    self.assign(scope, var, item)?;
                    match self.exec_block(body, scope)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
            }
            StmtKind::Break => return Ok(Flow::Break),
            StmtKind::Continue => return Ok(Flow::Continue),
        }
        Ok(Flow::Normal)
    }

    /// Bind `name`. Top-level bindings go through the bind hook.
    fn assign(&self, scope: &mut Scope, name: &str, value: Value) -> EvalResult<()> {
        if let Some(locals) = scope.locals.as_mut() {
            locals.insert(name.to_string(), value);
            return Ok(());
        }
        scope.module.set_global(name, value.clone())?;
        self.ctx.hook.after_bind(scope.module.label(), name, &value);
        Ok(())
    }

    fn lookup(&self, scope: &Scope, name: &str) -> EvalResult<Value> {
        if let Some(value) = scope.locals.as_ref().and_then(|locals| locals.get(name)) {
            return Ok(value.clone());
        }
        if let Some(value) = scope.module.lookup(name) {
            return Ok(value);
        }
        let universe = match scope.module.kind() {
            FileKind::Build => &self.build_universe,
            FileKind::Extension => &self.extension_universe,
        };
        universe
            .get(name)
            .cloned()
            .ok_or_else(|| undefined_variable(name))
    }

    fn eval_expr(&mut self, expr: &Expr, scope: &mut Scope) -> EvalResult<Value> {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr, scope))
            .map_err(|e| e.or_at(|| scope.location(expr.span)))
    }

    fn eval_expr_inner(&mut self, expr: &Expr, scope: &mut Scope) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::None => Ok(Value::None),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Str(s) => Ok(Value::from(s.as_str())),
            ExprKind::Ident(name) => self.lookup(scope, name),
            ExprKind::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item, scope)?);
                }
                Ok(Value::list(values))
            }
            ExprKind::Dict(entries) => {
                let mut map = IndexMap::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = DictKey::from_value(&self.eval_expr(key, scope)?)?;
                    let value = self.eval_expr(value, scope)?;
                    map.insert(key, value);
                }
                Ok(Value::dict(map))
            }
            ExprKind::Attr { object, name } => {
                let object = self.eval_expr(object, scope)?;
                get_attr(&object, name)
            }
            ExprKind::Index { object, index } => {
                let object = self.eval_expr(object, scope)?;
                let index = self.eval_expr(index, scope)?;
                ops::index(&object, &index)
            }
            ExprKind::Call { callee, args } => self.eval_call(expr, callee, args, scope),
            ExprKind::Unary { op, operand } => {
                let operand = self.eval_expr(operand, scope)?;
                ops::unary(*op, &operand)
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval_expr(left, scope)?;
                match op {
                    sky_ir::BinaryOp::And if !left.truth() => Ok(left),
                    sky_ir::BinaryOp::Or if left.truth() => Ok(left),
                    sky_ir::BinaryOp::And | sky_ir::BinaryOp::Or => self.eval_expr(right, scope),
                    _ => {
                        let right = self.eval_expr(right, scope)?;
                        ops::binary(*op, &left, &right)
                    }
                }
            }
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                if self.eval_expr(cond, scope)?.truth() {
                    self.eval_expr(then_expr, scope)
                } else {
                    self.eval_expr(else_expr, scope)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
