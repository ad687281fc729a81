//! Calls: argument evaluation, dispatch and parameter binding.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use sky_ir::{Arg, ArgKind, Expr, Location, ParamKind};
use sky_stack::ensure_sufficient_stack;

use super::{Flow, Interpreter, Scope};
use crate::builtins::{self, call_method, call_native_rule, call_provider, call_rule, Arguments};
use crate::errors::{
    missing_argument, not_callable, recursive_call, too_many_arguments, type_mismatch,
    unexpected_argument, EvalError, EvalResult,
};
use crate::value::{DictKey, FunctionValue};
use crate::Value;

impl Interpreter<'_> {
    pub(super) fn eval_call(
        &mut self,
        call: &Expr,
        callee: &Expr,
        args: &[Arg],
        scope: &mut Scope,
    ) -> EvalResult<Value> {
        let function = self.eval_expr(callee, scope)?;
        let mut arguments = Arguments::default();
        for arg in args {
            let value = self.eval_expr(&arg.value, scope)?;
            match &arg.kind {
                ArgKind::Positional => arguments.positional.push(value),
                ArgKind::Named(name) => arguments.add_named(name, value)?,
                ArgKind::Star => {
                    let Value::List(list) = &value else {
                        return Err(type_mismatch("list for *args", value.type_name()));
                    };
                    arguments.positional.extend(list.snapshot());
                }
                ArgKind::StarStar => {
                    let Value::Dict(dict) = &value else {
                        return Err(type_mismatch("dict for **kwargs", value.type_name()));
                    };
                    for (key, value) in dict.entries() {
                        let DictKey::Str(name) = key else {
                            return Err(type_mismatch(
                                "string keyword name",
                                key.to_value().type_name(),
                            ));
                        };
                        arguments.add_named(&name, value)?;
                    }
                }
            }
        }
        let location = scope.location(call.span);
        self.call_value(&function, arguments, &location)
    }

    /// Call any callable value.
    pub fn call_value(
        &mut self,
        function: &Value,
        args: Arguments,
        location: &Location,
    ) -> EvalResult<Value> {
        self.ctx.cancel.check()?;
        let result = match function {
            Value::Function(f) => self.call_function(f, args, location),
            Value::Builtin(builtin) => builtins::call(self, *builtin, args, location),
            Value::BoundMethod(bound) => call_method(bound, args),
            Value::NativeRule(rule) => call_native_rule(self, rule, args),
            Value::Rule(rule) => call_rule(self, rule, args),
            Value::Provider(provider) => call_provider(provider, args),
            other => Err(not_callable(other.type_name())),
        };
        result.map_err(|e| e.or_at(|| location.clone()))
    }

    fn call_function(
        &mut self,
        function: &Arc<FunctionValue>,
        args: Arguments,
        call_site: &Location,
    ) -> EvalResult<Value> {
        if self
            .call_stack
            .iter()
            .any(|active| Arc::ptr_eq(active, function))
        {
            return Err(recursive_call(function.name()));
        }
        let module = function.module().ok_or_else(|| {
            EvalError::new(format!(
                "module defining `{}` is no longer loaded",
                function.name()
            ))
        })?;
        let locals = bind_parameters(function, args)?;
        let mut scope = Scope {
            module,
            locals: Some(locals),
        };

        self.call_stack.push(Arc::clone(function));
        let outcome = ensure_sufficient_stack(|| self.exec_block(&function.def().body, &mut scope));
        self.call_stack.pop();

        match outcome {
            Ok(Flow::Return(value)) => Ok(value),
            Ok(_) => Ok(Value::None),
            Err(error) => Err(error.with_frame(function.name(), call_site.clone())),
        }
    }
}

/// Match arguments to the parameters of a `def`.
fn bind_parameters(
    function: &FunctionValue,
    args: Arguments,
) -> EvalResult<FxHashMap<String, Value>> {
    let def = function.def();
    let name = def.name.as_str();
    let normal: Vec<(usize, &str)> = def
        .params
        .iter()
        .enumerate()
        .filter(|(_, p)| p.kind == ParamKind::Normal)
        .map(|(i, p)| (i, p.name.as_str()))
        .collect();
    let kwargs = def.params.iter().find(|p| p.kind == ParamKind::Kwargs);

    if args.positional.len() > normal.len() {
        return Err(too_many_arguments(name, normal.len(), args.positional.len()));
    }

    let mut locals = FxHashMap::default();
    for ((_, param), value) in normal.iter().zip(args.positional) {
        locals.insert((*param).to_string(), value);
    }

    let mut extra = IndexMap::new();
    for (key, value) in args.named {
        if normal.iter().any(|(_, param)| *param == key) {
            if locals.contains_key(&key) {
                return Err(EvalError::new(format!(
                    "{name}() got multiple values for argument `{key}`"
                )));
            }
            locals.insert(key, value);
        } else if kwargs.is_some() {
            extra.insert(DictKey::from(key.as_str()), value);
        } else {
            return Err(unexpected_argument(name, &key));
        }
    }

    for (index, param) in &normal {
        if locals.contains_key(*param) {
            continue;
        }
        match function.defaults().get(*index).cloned().flatten() {
            Some(default) => {
                locals.insert((*param).to_string(), default);
            }
            None => return Err(missing_argument(name, param)),
        }
    }

    if let Some(kwargs) = kwargs {
        locals.insert(kwargs.name.clone(), Value::dict(extra));
    }
    Ok(locals)
}
