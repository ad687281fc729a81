//! Built-in functions and the predeclared environment.
//!
//! Built-ins are a closed enum dispatched with a `match`, not trait objects.
//! Which names a file can see depends on its kind:
//!
//! | | build file | extension file |
//! |---|---|---|
//! | core functions (`len`, `struct`, `rule`, ...) | yes | yes |
//! | native rules, `glob`, `package_name`, ... | top-level names | via `native.` |
//! | `load_symbols` | no | yes |

mod build;
mod common;
mod methods;
mod rules;

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use sky_ir::{FileKind, Location};

pub use methods::Method;

pub(crate) use methods::{call_method, get_attr};
pub(crate) use rules::{call_native_rule, call_provider, call_rule};

use crate::errors::{missing_argument, too_many_arguments, unexpected_argument, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::StructValue;
use crate::Value;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Builtin {
    All,
    Any,
    Bool,
    Dict,
    Enumerate,
    Fail,
    Getattr,
    Glob,
    Hasattr,
    ImplicitPackageSymbol,
    Int,
    Len,
    List,
    LoadSymbols,
    PackageName,
    Print,
    Provider,
    Range,
    ReadConfig,
    RepositoryName,
    Repr,
    Rule,
    Sorted,
    Str,
    Struct,
    Type,
}

/// Visible in every file.
const CORE: &[Builtin] = &[
    Builtin::All,
    Builtin::Any,
    Builtin::Bool,
    Builtin::Dict,
    Builtin::Enumerate,
    Builtin::Fail,
    Builtin::Getattr,
    Builtin::Hasattr,
    Builtin::Int,
    Builtin::Len,
    Builtin::List,
    Builtin::Print,
    Builtin::Provider,
    Builtin::Range,
    Builtin::ReadConfig,
    Builtin::Repr,
    Builtin::Rule,
    Builtin::Sorted,
    Builtin::Str,
    Builtin::Struct,
    Builtin::Type,
];

/// Top-level in build files, under `native` in extensions.
const PACKAGE: &[Builtin] = &[
    Builtin::Glob,
    Builtin::ImplicitPackageSymbol,
    Builtin::PackageName,
    Builtin::RepositoryName,
];

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::All => "all",
            Builtin::Any => "any",
            Builtin::Bool => "bool",
            Builtin::Dict => "dict",
            Builtin::Enumerate => "enumerate",
            Builtin::Fail => "fail",
            Builtin::Getattr => "getattr",
            Builtin::Glob => "glob",
            Builtin::Hasattr => "hasattr",
            Builtin::ImplicitPackageSymbol => "implicit_package_symbol",
            Builtin::Int => "int",
            Builtin::Len => "len",
            Builtin::List => "list",
            Builtin::LoadSymbols => "load_symbols",
            Builtin::PackageName => "package_name",
            Builtin::Print => "print",
            Builtin::Provider => "provider",
            Builtin::Range => "range",
            Builtin::ReadConfig => "read_config",
            Builtin::RepositoryName => "repository_name",
            Builtin::Repr => "repr",
            Builtin::Rule => "rule",
            Builtin::Sorted => "sorted",
            Builtin::Str => "str",
            Builtin::Struct => "struct",
            Builtin::Type => "type",
        }
    }
}

/// Predeclared names for files of `kind`.
pub(crate) fn universe(kind: FileKind, native_rules: &[String]) -> FxHashMap<String, Value> {
    let mut names: FxHashMap<String, Value> = CORE
        .iter()
        .map(|b| (b.name().to_string(), Value::Builtin(*b)))
        .collect();

    let package_names = PACKAGE
        .iter()
        .map(|b| (b.name().to_string(), Value::Builtin(*b)))
        .chain(
            native_rules
                .iter()
                .map(|rule| (rule.clone(), Value::NativeRule(Arc::from(rule.as_str())))),
        );

    match kind {
        FileKind::Build => names.extend(package_names),
        FileKind::Extension => {
            let native: IndexMap<String, Value> = package_names.collect();
            names.insert(
                "native".to_string(),
                Value::Struct(Arc::new(StructValue::new(native))),
            );
            names.insert(
                Builtin::LoadSymbols.name().to_string(),
                Value::Builtin(Builtin::LoadSymbols),
            );
        }
    }
    names
}

/// Evaluated call arguments.
#[derive(Default, Debug)]
pub struct Arguments {
    pub positional: Vec<Value>,
    pub named: IndexMap<String, Value>,
}

impl Arguments {
    pub fn add_named(&mut self, name: &str, value: Value) -> EvalResult<()> {
        if self.named.contains_key(name) {
            return Err(EvalError::new(format!(
                "keyword argument `{name}` repeated"
            )));
        }
        self.named.insert(name.to_string(), value);
        Ok(())
    }

    /// Match against `params` (positional-or-keyword), the first
    /// `required` of which must be given. Returns one slot per parameter.
    pub fn bind(
        self,
        function: &str,
        params: &[&str],
        required: usize,
    ) -> EvalResult<Vec<Option<Value>>> {
        if self.positional.len() > params.len() {
            return Err(too_many_arguments(
                function,
                params.len(),
                self.positional.len(),
            ));
        }
        let mut slots: Vec<Option<Value>> = vec![None; params.len()];
        for (slot, value) in slots.iter_mut().zip(self.positional) {
            *slot = Some(value);
        }
        for (name, value) in self.named {
            let Some(index) = params.iter().position(|p| *p == name) else {
                return Err(unexpected_argument(function, &name));
            };
            if slots[index].is_some() {
                return Err(EvalError::new(format!(
                    "{function}() got multiple values for argument `{name}`"
                )));
            }
            slots[index] = Some(value);
        }
        for (index, param) in params.iter().enumerate().take(required) {
            if slots[index].is_none() {
                return Err(missing_argument(function, param));
            }
        }
        Ok(slots)
    }

    /// Keyword-only call: reject positional arguments.
    pub fn named_only(self, function: &str) -> EvalResult<IndexMap<String, Value>> {
        if !self.positional.is_empty() {
            return Err(too_many_arguments(function, 0, self.positional.len()));
        }
        Ok(self.named)
    }
}

pub(crate) fn call(
    interp: &mut Interpreter<'_>,
    builtin: Builtin,
    args: Arguments,
    location: &Location,
) -> EvalResult<Value> {
    match builtin {
        Builtin::All => common::all(args),
        Builtin::Any => common::any(args),
        Builtin::Bool => common::bool(args),
        Builtin::Dict => common::dict(args),
        Builtin::Enumerate => common::enumerate(args),
        Builtin::Fail => common::fail(args),
        Builtin::Getattr => common::getattr(args),
        Builtin::Hasattr => common::hasattr(args),
        Builtin::Int => common::int(args),
        Builtin::Len => common::len(args),
        Builtin::List => common::list(args),
        Builtin::Print => common::print(interp, args, location),
        Builtin::Range => common::range(args),
        Builtin::Repr => common::repr(args),
        Builtin::Sorted => common::sorted(args),
        Builtin::Str => common::str(args),
        Builtin::Struct => common::structure(args),
        Builtin::Type => common::type_of(args),
        Builtin::Provider => rules::provider(args),
        Builtin::Rule => rules::rule(args),
        Builtin::Glob => build::glob(interp, args),
        Builtin::ImplicitPackageSymbol => build::implicit_package_symbol(interp, args),
        Builtin::LoadSymbols => build::load_symbols(interp, args),
        Builtin::PackageName => build::package_name(interp, args),
        Builtin::ReadConfig => build::read_config(interp, args),
        Builtin::RepositoryName => build::repository_name(interp, args),
    }
}

/// Take a bound slot, or `default` if it was not given.
fn slot_or(slot: &mut Option<Value>, default: Value) -> Value {
    slot.take().unwrap_or(default)
}

#[cfg(test)]
mod tests;
