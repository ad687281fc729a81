//! Functions available in every file.

use std::cmp::Ordering;
use std::sync::Arc;

use indexmap::IndexMap;
use sky_diagnostic::Diagnostic;
use sky_ir::Location;

use super::methods::{get_attr, has_attr};
use super::{slot_or, Arguments};
use crate::errors::{fail as fail_error, type_mismatch, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{DictKey, StructValue};
use crate::Value;

/// Largest sequence `range()` will materialize.
const MAX_RANGE_LEN: i64 = 1 << 24;

pub(super) fn all(args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("all", &["x"], 1)?;
    let items = slot_or(&mut slots[0], Value::None).iterate()?;
    Ok(Value::Bool(items.iter().all(Value::truth)))
}

pub(super) fn any(args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("any", &["x"], 1)?;
    let items = slot_or(&mut slots[0], Value::None).iterate()?;
    Ok(Value::Bool(items.iter().any(Value::truth)))
}

pub(super) fn bool(args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("bool", &["x"], 0)?;
    Ok(Value::Bool(
        slot_or(&mut slots[0], Value::Bool(false)).truth(),
    ))
}

/// `dict()`, `dict(mapping)`, `dict(pairs)`, each optionally followed by
/// keyword entries.
pub(super) fn dict(args: Arguments) -> EvalResult<Value> {
    if args.positional.len() > 1 {
        return Err(crate::errors::too_many_arguments(
            "dict",
            1,
            args.positional.len(),
        ));
    }
    let mut entries = IndexMap::new();
    if let Some(source) = args.positional.first() {
        match source {
            Value::Dict(d) => entries.extend(d.entries()),
            other => {
                for pair in other.iterate()? {
                    let items = pair.iterate()?;
                    let [key, value] = items.as_slice() else {
                        return Err(EvalError::new(format!(
                            "dict: expected a pair, got a sequence of length {}",
                            items.len()
                        )));
                    };
                    entries.insert(DictKey::from_value(key)?, value.clone());
                }
            }
        }
    }
    for (name, value) in args.named {
        entries.insert(DictKey::from(name.as_str()), value);
    }
    Ok(Value::dict(entries))
}

pub(super) fn enumerate(args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("enumerate", &["x", "start"], 1)?;
    let items = slot_or(&mut slots[0], Value::None).iterate()?;
    let start = slot_or(&mut slots[1], Value::Int(0)).expect_int("start")?;
    let mut out = Vec::with_capacity(items.len());
    for (offset, item) in (0i64..).zip(items) {
        let index = start
            .checked_add(offset)
            .ok_or_else(crate::errors::integer_overflow)?;
        out.push(Value::list(vec![Value::Int(index), item]));
    }
    Ok(Value::list(out))
}

pub(super) fn fail(args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("fail", &["msg", "attr"], 0)?;
    let message = match slot_or(&mut slots[0], Value::None) {
        Value::None => "failed".to_string(),
        value => value.to_string(),
    };
    match slots[1].take() {
        Some(attr) if !matches!(attr, Value::None) => {
            Err(fail_error(format!("attribute {attr}: {message}")))
        }
        _ => Err(fail_error(message)),
    }
}

pub(super) fn getattr(args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("getattr", &["x", "name", "default"], 2)?;
    let object = slot_or(&mut slots[0], Value::None);
    let name = slot_or(&mut slots[1], Value::None);
    let name = name.expect_str("getattr name")?;
    match slots[2].take() {
        Some(default) if !has_attr(&object, name) => Ok(default),
        _ => get_attr(&object, name),
    }
}

pub(super) fn hasattr(args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("hasattr", &["x", "name"], 2)?;
    let object = slot_or(&mut slots[0], Value::None);
    let name = slot_or(&mut slots[1], Value::None);
    Ok(Value::Bool(has_attr(&object, name.expect_str("hasattr name")?)))
}

pub(super) fn int(args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("int", &["x", "base"], 0)?;
    let base = match slots[1].take() {
        Some(base) => Some(base.expect_int("base")?),
        None => None,
    };
    match slot_or(&mut slots[0], Value::Int(0)) {
        Value::Int(n) if base.is_none() => Ok(Value::Int(n)),
        Value::Bool(b) if base.is_none() => Ok(Value::Int(i64::from(b))),
        Value::Str(s) => {
            let radix = u32::try_from(base.unwrap_or(10))
                .ok()
                .filter(|r| (2..=36).contains(r))
                .ok_or_else(|| EvalError::new("int: base must be between 2 and 36"))?;
            i64::from_str_radix(s.trim(), radix)
                .map(Value::Int)
                .map_err(|_| EvalError::new(format!("int: invalid literal {}", Value::Str(s).repr())))
        }
        other => Err(type_mismatch("string, bool or int", other.type_name())),
    }
}

pub(super) fn len(args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("len", &["x"], 1)?;
    let len = match slot_or(&mut slots[0], Value::None) {
        Value::Str(s) => s.chars().count(),
        Value::List(list) => list.len(),
        Value::Dict(dict) => dict.len(),
        other => return Err(type_mismatch("string, list or dict", other.type_name())),
    };
    i64::try_from(len)
        .map(Value::Int)
        .map_err(|_| crate::errors::integer_overflow())
}

pub(super) fn list(args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("list", &["x"], 0)?;
    match slots[0].take() {
        Some(x) => Ok(Value::list(x.iterate()?)),
        None => Ok(Value::list(Vec::new())),
    }
}

/// Report through the diagnostics sink rather than stdout.
pub(super) fn print(
    interp: &mut Interpreter<'_>,
    args: Arguments,
    location: &Location,
) -> EvalResult<Value> {
    let mut sep = " ".to_string();
    for (name, value) in &args.named {
        if name != "sep" {
            return Err(crate::errors::unexpected_argument("print", name));
        }
        sep = value.expect_str("sep")?.to_string();
    }
    let message = args
        .positional
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(&sep);
    interp
        .context()
        .sink
        .handle(Diagnostic::note(message).at(location.clone()));
    Ok(Value::None)
}

pub(super) fn range(args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("range", &["start_or_stop", "stop", "step"], 1)?;
    let first = slot_or(&mut slots[0], Value::None).expect_int("range")?;
    let (start, stop) = match slots[1].take() {
        Some(stop) => (first, stop.expect_int("range stop")?),
        None => (0, first),
    };
    let step = slot_or(&mut slots[2], Value::Int(1)).expect_int("range step")?;
    if step == 0 {
        return Err(EvalError::new("range: step must not be zero"));
    }

    let span = i128::from(stop) - i128::from(start);
    let step_wide = i128::from(step);
    let len = if (span > 0) == (step_wide > 0) && span != 0 {
        (span.abs() + step_wide.abs() - 1) / step_wide.abs()
    } else {
        0
    };
    if len > i128::from(MAX_RANGE_LEN) {
        return Err(EvalError::new(format!(
            "range: {len} elements exceeds the limit of {MAX_RANGE_LEN}"
        )));
    }

    let mut items = Vec::new();
    let mut current = start;
    for _ in 0..len {
        items.push(Value::Int(current));
        current = current.wrapping_add(step);
    }
    Ok(Value::list(items))
}

pub(super) fn repr(args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("repr", &["x"], 1)?;
    Ok(Value::from(slot_or(&mut slots[0], Value::None).repr()))
}

pub(super) fn sorted(args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("sorted", &["iterable", "reverse"], 1)?;
    let mut items = slot_or(&mut slots[0], Value::None).iterate()?;
    let reverse = slot_or(&mut slots[1], Value::Bool(false)).truth();

    let mut incomparable: Option<EvalError> = None;
    items.sort_by(|a, b| {
        let (x, y) = if reverse { (b, a) } else { (a, b) };
        x.compare(y).unwrap_or_else(|| {
            incomparable.get_or_insert_with(|| {
                crate::errors::invalid_operands("<", x.type_name(), y.type_name())
            });
            Ordering::Equal
        })
    });
    match incomparable {
        Some(error) => Err(error),
        None => Ok(Value::list(items)),
    }
}

pub(super) fn str(args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("str", &["x"], 0)?;
    match slots[0].take() {
        Some(value @ Value::Str(_)) => Ok(value),
        Some(value) => Ok(Value::from(value.to_string())),
        None => Ok(Value::from("")),
    }
}

pub(super) fn structure(args: Arguments) -> EvalResult<Value> {
    let fields = args.named_only("struct")?;
    Ok(Value::Struct(Arc::new(StructValue::new(fields))))
}

pub(super) fn type_of(args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("type", &["x"], 1)?;
    Ok(Value::from(slot_or(&mut slots[0], Value::None).type_name()))
}
