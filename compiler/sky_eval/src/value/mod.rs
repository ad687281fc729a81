//! Runtime values.
//!
//! Scalars are stored inline; everything else is behind an `Arc` so values
//! are cheap to clone and can be shared between modules. Lists and dicts are
//! mutable until their owning module is frozen.
//!
//! Rules and providers are the only *exportable* values: they learn their
//! permanent name the first time they are bound at the top level of a module
//! (see [`Exportable`]).

mod collections;
mod exportable;
mod function;
mod structure;

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

pub use collections::{DictKey, DictValue, ListValue};
pub use exportable::{Exportable, ExportedName, ProviderValue, RuleValue};
pub use function::{BoundMethod, FunctionValue};
pub use structure::StructValue;

use sky_stack::ensure_sufficient_stack;

use crate::builtins::{Builtin, Method};
use crate::errors::{type_mismatch, EvalResult};

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Str(Arc<str>),
    List(Arc<ListValue>),
    Dict(Arc<DictValue>),
    Struct(Arc<StructValue>),
    /// A `def` function.
    Function(Arc<FunctionValue>),
    Builtin(Builtin),
    BoundMethod(Arc<BoundMethod>),
    /// A rule implemented by the build tool itself, such as `genrule`.
    NativeRule(Arc<str>),
    Rule(Arc<RuleValue>),
    Provider(Arc<ProviderValue>),
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(ListValue::new(items)))
    }

    pub fn dict(entries: indexmap::IndexMap<DictKey, Value>) -> Self {
        Value::Dict(Arc::new(DictValue::new(entries)))
    }

    pub fn bound_method(receiver: Value, method: Method) -> Self {
        Value::BoundMethod(Arc::new(BoundMethod { receiver, method }))
    }

    /// Name reported by `type()`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Struct(_) => "struct",
            Value::Function(_) => "function",
            Value::Builtin(_) | Value::BoundMethod(_) => "builtin_function_or_method",
            Value::NativeRule(_) | Value::Rule(_) => "rule",
            Value::Provider(_) => "provider",
        }
    }

    /// Truth value for `if`, `and`, `or` and `not`.
    pub fn truth(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Str(s) => !s.is_empty(),
            Value::List(list) => !list.is_empty(),
            Value::Dict(dict) => !dict.is_empty(),
            _ => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// String argument or a type error naming `what`.
    pub fn expect_str(&self, what: &str) -> EvalResult<&str> {
        self.as_str()
            .ok_or_else(|| type_mismatch(&format!("string for {what}"), self.type_name()))
    }

    pub fn expect_int(&self, what: &str) -> EvalResult<i64> {
        self.as_int()
            .ok_or_else(|| type_mismatch(&format!("int for {what}"), self.type_name()))
    }

    /// Elements produced by `for x in value`.
    pub fn iterate(&self) -> EvalResult<Vec<Value>> {
        match self {
            Value::List(list) => Ok(list.snapshot()),
            Value::Dict(dict) => Ok(dict.keys()),
            other => Err(type_mismatch("iterable", other.type_name())),
        }
    }

    /// View as an exportable value, if this is one.
    pub fn as_exportable(&self) -> Option<Exportable<'_>> {
        match self {
            Value::Rule(rule) => Some(Exportable::Rule(rule)),
            Value::Provider(provider) => Some(Exportable::Provider(provider)),
            _ => None,
        }
    }

    /// Structural equality for data, identity for functions and rules.
    pub fn equals(&self, other: &Value) -> bool {
        self.equals_in(other, &mut Vec::new())
    }

    /// `pairs` holds the containers being compared further up. Meeting a
    /// pair again means both sides loop back at the same point.
    fn equals_in(&self, other: &Value, pairs: &mut Vec<(Addr, Addr)>) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                let pair = (addr(a), addr(b));
                if Arc::ptr_eq(a, b) || pairs.contains(&pair) {
                    return true;
                }
                let (a, b) = (a.snapshot(), b.snapshot());
                if a.len() != b.len() {
                    return false;
                }
                pairs.push(pair);
                let equal = a
                    .iter()
                    .zip(&b)
                    .all(|(x, y)| ensure_sufficient_stack(|| x.equals_in(y, pairs)));
                pairs.pop();
                equal
            }
            (Value::Dict(a), Value::Dict(b)) => {
                let pair = (addr(a), addr(b));
                if Arc::ptr_eq(a, b) || pairs.contains(&pair) {
                    return true;
                }
                if a.len() != b.len() {
                    return false;
                }
                pairs.push(pair);
                let equal = a.entries().iter().all(|(key, value)| {
                    b.get(key).is_some_and(|other| {
                        ensure_sufficient_stack(|| value.equals_in(&other, pairs))
                    })
                });
                pairs.pop();
                equal
            }
            (Value::Struct(a), Value::Struct(b)) => {
                let same_provider = match (a.provider(), b.provider()) {
                    (None, None) => true,
                    (Some(x), Some(y)) => Arc::ptr_eq(x, y),
                    _ => false,
                };
                Arc::ptr_eq(a, b)
                    || (same_provider
                        && a.fields().len() == b.fields().len()
                        && a.fields().iter().all(|(name, value)| {
                            b.get(name).is_some_and(|other| {
                                ensure_sufficient_stack(|| value.equals_in(other, pairs))
                            })
                        }))
            }
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::BoundMethod(a), Value::BoundMethod(b)) => Arc::ptr_eq(a, b),
            (Value::NativeRule(a), Value::NativeRule(b)) => a == b,
            (Value::Rule(a), Value::Rule(b)) => Arc::ptr_eq(a, b),
            (Value::Provider(a), Value::Provider(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Ordering for `<`, `sorted()` and friends; `None` if not comparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        self.compare_in(other, &mut Vec::new())
    }

    fn compare_in(&self, other: &Value, pairs: &mut Vec<(Addr, Addr)>) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::None, Value::None) => Some(Ordering::Equal),
            (Value::List(a), Value::List(b)) => {
                let pair = (addr(a), addr(b));
                if Arc::ptr_eq(a, b) || pairs.contains(&pair) {
                    return Some(Ordering::Equal);
                }
                let (a, b) = (a.snapshot(), b.snapshot());
                pairs.push(pair);
                let mut ordering = Some(a.len().cmp(&b.len()));
                for (x, y) in a.iter().zip(&b) {
                    match ensure_sufficient_stack(|| x.compare_in(y, pairs)) {
                        Some(Ordering::Equal) => {}
                        unequal => {
                            ordering = unequal;
                            break;
                        }
                    }
                }
                pairs.pop();
                ordering
            }
            _ => None,
        }
    }

    /// Freeze this value and everything reachable from it.
    pub fn freeze(&self) {
        match self {
            Value::List(list) => list.freeze(),
            Value::Dict(dict) => dict.freeze(),
            Value::Struct(s) => s.freeze(),
            Value::BoundMethod(method) => method.receiver.freeze(),
            Value::Function(function) => {
                for default in function.defaults().iter().flatten() {
                    default.freeze();
                }
            }
            _ => {}
        }
    }

    /// Quoted representation, as produced by `repr()`.
    ///
    /// A list or dict reached again while it is being written prints as
    /// `[...]` or `{...}`.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.write_repr(&mut out, &mut Vec::new());
        out
    }

    fn write_repr(&self, out: &mut String, open: &mut Vec<Addr>) {
        match self {
            Value::Str(s) => write_quoted(out, s),
            Value::List(list) => {
                if open.contains(&addr(list)) {
                    out.push_str("[...]");
                    return;
                }
                open.push(addr(list));
                out.push('[');
                for (i, item) in list.snapshot().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    ensure_sufficient_stack(|| item.write_repr(out, open));
                }
                out.push(']');
                open.pop();
            }
            Value::Dict(dict) => {
                if open.contains(&addr(dict)) {
                    out.push_str("{...}");
                    return;
                }
                open.push(addr(dict));
                out.push('{');
                for (i, (key, value)) in dict.entries().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    key.to_value().write_repr(out, open);
                    out.push_str(": ");
                    ensure_sufficient_stack(|| value.write_repr(out, open));
                }
                out.push('}');
                open.pop();
            }
            Value::Struct(s) => {
                out.push_str(&s.constructor_name());
                out.push('(');
                for (i, (name, value)) in s.fields().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(name);
                    out.push_str(" = ");
                    ensure_sufficient_stack(|| value.write_repr(out, open));
                }
                out.push(')');
            }
            other => out.push_str(&other.to_string()),
        }
    }
}

/// Identity of a shared container. Structs are immutable, so any cycle
/// runs through a list or dict.
type Addr = *const ();

fn addr<T>(value: &Arc<T>) -> Addr {
    Arc::as_ptr(value).cast()
}

impl fmt::Display for Value {
    /// `str()` conversion: strings unquoted, everything else as `repr()`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(_) | Value::Dict(_) | Value::Struct(_) => write!(f, "{}", self.repr()),
            Value::Function(function) => write!(f, "<function {}>", function.name()),
            Value::Builtin(builtin) => write!(f, "<built-in function {}>", builtin.name()),
            Value::BoundMethod(method) => {
                write!(f, "<built-in method {}>", method.method.name())
            }
            Value::NativeRule(name) => write!(f, "<native rule {name}>"),
            Value::Rule(rule) => match rule.exported_name() {
                Some(name) => write!(f, "<rule {}>", name.name()),
                None => write!(f, "<rule>"),
            },
            Value::Provider(provider) => match provider.exported_name() {
                Some(name) => write!(f, "<provider {}>", name.name()),
                None => write!(f, "<provider>"),
            },
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repr())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests;
