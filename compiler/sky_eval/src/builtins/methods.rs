//! Methods on strings, lists and dicts, and attribute access.

use indexmap::IndexMap;

use super::{slot_or, Arguments};
use crate::errors::{no_attribute, type_mismatch, EvalError, EvalResult};
use crate::value::{BoundMethod, DictKey};
use crate::Value;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Method {
    // string
    Endswith,
    Format,
    Join,
    Lower,
    Lstrip,
    Replace,
    Rstrip,
    Split,
    Startswith,
    Strip,
    Upper,
    // list
    Append,
    Extend,
    // dict
    Get,
    Items,
    Keys,
    Update,
    Values,
}

const STRING_METHODS: &[Method] = &[
    Method::Endswith,
    Method::Format,
    Method::Join,
    Method::Lower,
    Method::Lstrip,
    Method::Replace,
    Method::Rstrip,
    Method::Split,
    Method::Startswith,
    Method::Strip,
    Method::Upper,
];

const LIST_METHODS: &[Method] = &[Method::Append, Method::Extend];

const DICT_METHODS: &[Method] = &[
    Method::Get,
    Method::Items,
    Method::Keys,
    Method::Update,
    Method::Values,
];

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Method::Endswith => "endswith",
            Method::Format => "format",
            Method::Join => "join",
            Method::Lower => "lower",
            Method::Lstrip => "lstrip",
            Method::Replace => "replace",
            Method::Rstrip => "rstrip",
            Method::Split => "split",
            Method::Startswith => "startswith",
            Method::Strip => "strip",
            Method::Upper => "upper",
            Method::Append => "append",
            Method::Extend => "extend",
            Method::Get => "get",
            Method::Items => "items",
            Method::Keys => "keys",
            Method::Update => "update",
            Method::Values => "values",
        }
    }
}

fn lookup(receiver: &Value, name: &str) -> Option<Method> {
    let table = match receiver {
        Value::Str(_) => STRING_METHODS,
        Value::List(_) => LIST_METHODS,
        Value::Dict(_) => DICT_METHODS,
        _ => return None,
    };
    table.iter().copied().find(|m| m.name() == name)
}

/// `value.name`: a struct field or a bound method.
pub(crate) fn get_attr(value: &Value, name: &str) -> EvalResult<Value> {
    if let Value::Struct(s) = value {
        return s
            .get(name)
            .cloned()
            .ok_or_else(|| no_attribute(&s.constructor_name(), name));
    }
    lookup(value, name)
        .map(|method| Value::bound_method(value.clone(), method))
        .ok_or_else(|| no_attribute(value.type_name(), name))
}

pub(crate) fn has_attr(value: &Value, name: &str) -> bool {
    match value {
        Value::Struct(s) => s.get(name).is_some(),
        other => lookup(other, name).is_some(),
    }
}

pub(crate) fn call_method(bound: &BoundMethod, args: Arguments) -> EvalResult<Value> {
    let name = bound.method.name();
    match &bound.receiver {
        Value::Str(s) => string_method(bound.method, s, args),
        Value::List(list) => {
            let mut slots = args.bind(name, &["item"], 1)?;
            let item = slot_or(&mut slots[0], Value::None);
            match bound.method {
                Method::Append => list.push(item)?,
                _ => list.extend(item.iterate()?)?,
            }
            Ok(Value::None)
        }
        Value::Dict(dict) => match bound.method {
            Method::Get => {
                let mut slots = args.bind(name, &["key", "default"], 1)?;
                let key = DictKey::from_value(&slot_or(&mut slots[0], Value::None))?;
                Ok(dict
                    .get(&key)
                    .unwrap_or_else(|| slot_or(&mut slots[1], Value::None)))
            }
            Method::Keys => {
                args.bind(name, &[], 0)?;
                Ok(Value::list(dict.keys()))
            }
            Method::Values => {
                args.bind(name, &[], 0)?;
                Ok(Value::list(dict.values()))
            }
            Method::Items => {
                args.bind(name, &[], 0)?;
                Ok(Value::list(
                    dict.entries()
                        .into_iter()
                        .map(|(k, v)| Value::list(vec![k.to_value(), v]))
                        .collect(),
                ))
            }
            _ => {
                let positional = args.positional.len();
                let mut slots = Arguments {
                    positional: args.positional,
                    named: IndexMap::new(),
                }
                .bind(name, &["other"], 0)?;
                if let Some(Value::Dict(other)) = slots[0].take() {
                    for (key, value) in other.entries() {
                        dict.insert(key, value)?;
                    }
                } else if positional > 0 {
                    return Err(type_mismatch("dict for update", "non-dict"));
                }
                for (key, value) in args.named {
                    dict.insert(DictKey::from(key.as_str()), value)?;
                }
                Ok(Value::None)
            }
        },
        other => Err(no_attribute(other.type_name(), name)),
    }
}

fn string_method(method: Method, s: &str, args: Arguments) -> EvalResult<Value> {
    let name = method.name();
    match method {
        Method::Format => format(s, args),
        Method::Lower | Method::Upper => {
            args.bind(name, &[], 0)?;
            Ok(Value::from(if method == Method::Lower {
                s.to_lowercase()
            } else {
                s.to_uppercase()
            }))
        }
        Method::Strip | Method::Lstrip | Method::Rstrip => {
            let mut slots = args.bind(name, &["chars"], 0)?;
            let chars = slots[0].take().filter(|v| !matches!(v, Value::None));
            let chars: Option<Vec<char>> = match &chars {
                Some(value) => Some(value.expect_str("chars")?.chars().collect()),
                None => None,
            };
            let trim = |c: char| match &chars {
                Some(set) => set.contains(&c),
                None => c.is_whitespace(),
            };
            let out = match method {
                Method::Lstrip => s.trim_start_matches(trim),
                Method::Rstrip => s.trim_end_matches(trim),
                _ => s.trim_matches(trim),
            };
            Ok(Value::from(out))
        }
        Method::Startswith | Method::Endswith => {
            let mut slots = args.bind(name, &["prefix"], 1)?;
            let affix = slot_or(&mut slots[0], Value::None);
            let affix = affix.expect_str(name)?;
            Ok(Value::Bool(if method == Method::Startswith {
                s.starts_with(affix)
            } else {
                s.ends_with(affix)
            }))
        }
        Method::Join => {
            let mut slots = args.bind(name, &["elements"], 1)?;
            let parts = slot_or(&mut slots[0], Value::None).iterate()?;
            let mut out = String::new();
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    out.push_str(s);
                }
                out.push_str(part.expect_str("join element")?);
            }
            Ok(Value::from(out))
        }
        Method::Replace => {
            let mut slots = args.bind(name, &["old", "new", "count"], 2)?;
            let old = slot_or(&mut slots[0], Value::None);
            let new = slot_or(&mut slots[1], Value::None);
            let (old, new) = (old.expect_str("old")?, new.expect_str("new")?);
            let out = match slots[2].take() {
                Some(count) => {
                    let count = count.expect_int("count")?;
                    s.replacen(old, new, usize::try_from(count).unwrap_or(0))
                }
                None => s.replace(old, new),
            };
            Ok(Value::from(out))
        }
        _ => {
            let mut slots = args.bind(name, &["sep", "maxsplit"], 0)?;
            let sep = slots[0].take().filter(|v| !matches!(v, Value::None));
            let maxsplit = match slots[1].take() {
                Some(n) => usize::try_from(n.expect_int("maxsplit")?).ok(),
                None => None,
            };
            let parts: Vec<Value> = match &sep {
                Some(sep) => {
                    let sep = sep.expect_str("sep")?;
                    if sep.is_empty() {
                        return Err(EvalError::new("split: empty separator"));
                    }
                    match maxsplit {
                        Some(n) => s.splitn(n + 1, sep).map(Value::from).collect(),
                        None => s.split(sep).map(Value::from).collect(),
                    }
                }
                None => s.split_whitespace().map(Value::from).collect(),
            };
            Ok(Value::list(parts))
        }
    }
}

/// `"{} and {name}".format(...)`: `{}` takes the next positional argument,
/// `{0}` a numbered one and `{name}` a keyword argument. `{{` and `}}` are
/// literal braces.
fn format(template: &str, args: Arguments) -> EvalResult<Value> {
    let mut out = String::with_capacity(template.len());
    let mut next_auto = 0usize;
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => field.push(c),
                        None => return Err(EvalError::new("format: unmatched '{'")),
                    }
                }
                let value = if field.is_empty() {
                    next_auto += 1;
                    args.positional.get(next_auto - 1)
                } else if let Ok(index) = field.parse::<usize>() {
                    args.positional.get(index)
                } else {
                    args.named.get(&field)
                };
                let value = value.ok_or_else(|| {
                    EvalError::new(format!("format: no argument for field {{{field}}}"))
                })?;
                out.push_str(&value.to_string());
            }
            '}' => return Err(EvalError::new("format: single '}' in template")),
            c => out.push(c),
        }
    }
    Ok(Value::from(out))
}
