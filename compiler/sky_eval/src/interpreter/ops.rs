//! Operators.
//!
//! Integer arithmetic is checked and reports `IntegerOverflow` instead of
//! wrapping. `//` and `%` round toward negative infinity.

use std::cmp::Ordering;

use sky_ir::{BinaryOp, UnaryOp};

use crate::errors::{
    division_by_zero, index_out_of_bounds, integer_overflow, invalid_operands, key_not_found,
    type_mismatch, EvalError, EvalResult,
};
use crate::value::DictKey;
use crate::Value;

pub(super) fn unary(op: UnaryOp, operand: &Value) -> EvalResult<Value> {
    match (op, operand) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.truth())),
        (UnaryOp::Neg, Value::Int(n)) => n.checked_neg().map(Value::Int).ok_or_else(integer_overflow),
        (UnaryOp::Plus, Value::Int(n)) => Ok(Value::Int(*n)),
        (UnaryOp::Neg | UnaryOp::Plus, other) => Err(type_mismatch("int", other.type_name())),
    }
}

pub(super) fn binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult<Value> {
    let invalid = || invalid_operands(op.symbol(), left.type_name(), right.type_name());
    match op {
        BinaryOp::Add => match (left, right) {
            (Value::Int(a), Value::Int(b)) => checked(a.checked_add(*b)),
            (Value::Str(a), Value::Str(b)) => Ok(Value::from(format!("{a}{b}"))),
            (Value::List(a), Value::List(b)) => {
                let mut items = a.snapshot();
                items.extend(b.snapshot());
                Ok(Value::list(items))
            }
            _ => Err(invalid()),
        },
        BinaryOp::Sub => match (left, right) {
            (Value::Int(a), Value::Int(b)) => checked(a.checked_sub(*b)),
            _ => Err(invalid()),
        },
        BinaryOp::Mul => match (left, right) {
            (Value::Int(a), Value::Int(b)) => checked(a.checked_mul(*b)),
            (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
                Ok(Value::from(s.repeat(repeat_count(s.len(), *n)?)))
            }
            (Value::List(list), Value::Int(n)) | (Value::Int(n), Value::List(list)) => {
                let items = list.snapshot();
                let count = repeat_count(items.len(), *n)?;
                let mut out = Vec::with_capacity(items.len() * count);
                for _ in 0..count {
                    out.extend(items.iter().cloned());
                }
                Ok(Value::list(out))
            }
            _ => Err(invalid()),
        },
        BinaryOp::FloorDiv => match (left, right) {
            (Value::Int(_), Value::Int(0)) => Err(division_by_zero()),
            (Value::Int(a), Value::Int(b)) => {
                let quotient = a.checked_div(*b).ok_or_else(integer_overflow)?;
                if a % b != 0 && ((*a < 0) != (*b < 0)) {
                    checked(quotient.checked_sub(1))
                } else {
                    Ok(Value::Int(quotient))
                }
            }
            _ => Err(invalid()),
        },
        BinaryOp::Mod => match (left, right) {
            (Value::Int(_), Value::Int(0)) => Err(division_by_zero()),
            (Value::Int(a), Value::Int(b)) => {
                let remainder = a.checked_rem(*b).ok_or_else(integer_overflow)?;
                if remainder != 0 && ((remainder < 0) != (*b < 0)) {
                    checked(remainder.checked_add(*b))
                } else {
                    Ok(Value::Int(remainder))
                }
            }
            (Value::Str(template), args) => percent_format(template, args),
            _ => Err(invalid()),
        },
        BinaryOp::Eq => Ok(Value::Bool(left.equals(right))),
        BinaryOp::NotEq => Ok(Value::Bool(!left.equals(right))),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let ordering = left.compare(right).ok_or_else(invalid)?;
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::LtEq => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }))
        }
        BinaryOp::In => contains(right, left).map(Value::Bool),
        BinaryOp::NotIn => contains(right, left).map(|found| Value::Bool(!found)),
        // Short-circuit operators are evaluated by the interpreter.
        BinaryOp::And | BinaryOp::Or => Err(invalid()),
    }
}

/// `target op= value`. Lists are extended in place.
pub(super) fn augmented(op: BinaryOp, current: &Value, rhs: &Value) -> EvalResult<Value> {
    if let (BinaryOp::Add, Value::List(list), Value::List(extra)) = (op, current, rhs) {
        list.extend(extra.snapshot())?;
        return Ok(current.clone());
    }
    binary(op, current, rhs)
}

pub(super) fn index(object: &Value, index: &Value) -> EvalResult<Value> {
    match object {
        Value::List(list) => {
            let i = normalize_index(index.expect_int("list index")?, list.len())?;
            list.get(i)
                .ok_or_else(|| index_out_of_bounds(i64::try_from(i).unwrap_or(i64::MAX), list.len()))
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let i = normalize_index(index.expect_int("string index")?, chars.len())?;
            Ok(Value::from(chars[i].to_string()))
        }
        Value::Dict(dict) => {
            let key = DictKey::from_value(index)?;
            dict.get(&key).ok_or_else(|| key_not_found(index.repr()))
        }
        other => Err(type_mismatch("indexable value", other.type_name())),
    }
}

/// Resolve a possibly negative index against `len`.
fn normalize_index(index: i64, len: usize) -> EvalResult<usize> {
    let len_i = i64::try_from(len).map_err(|_| integer_overflow())?;
    let resolved = if index < 0 { index + len_i } else { index };
    if (0..len_i).contains(&resolved) {
        usize::try_from(resolved).map_err(|_| integer_overflow())
    } else {
        Err(index_out_of_bounds(index, len))
    }
}

fn contains(container: &Value, item: &Value) -> EvalResult<bool> {
    match container {
        Value::Str(haystack) => {
            let needle = item.expect_str("left operand of `in`")?;
            Ok(haystack.contains(needle))
        }
        Value::List(list) => Ok(list.snapshot().iter().any(|x| x.equals(item))),
        Value::Dict(dict) => Ok(dict.contains_key(&DictKey::from_value(item)?)),
        other => Err(invalid_operands("in", item.type_name(), other.type_name())),
    }
}

fn checked(result: Option<i64>) -> EvalResult<Value> {
    result.map(Value::Int).ok_or_else(integer_overflow)
}

/// Largest string or list `*` will build.
const MAX_REPEAT_LEN: usize = 1 << 24;

/// Copies of a `len`-element sequence to make for `* n`. Negative counts
/// give an empty result, and so does an empty sequence whatever the count.
fn repeat_count(len: usize, n: i64) -> EvalResult<usize> {
    let count = usize::try_from(n).unwrap_or(0);
    if len == 0 || count == 0 {
        return Ok(0);
    }
    match len.checked_mul(count) {
        Some(total) if total <= MAX_REPEAT_LEN => Ok(count),
        _ => Err(EvalError::new(format!(
            "repeating a sequence of length {len} {n} times exceeds the limit of {MAX_REPEAT_LEN}"
        ))),
    }
}

/// `"%s-%d" % (args)`: a list on the right supplies one value per
/// conversion, anything else is a single value.
fn percent_format(template: &str, args: &Value) -> EvalResult<Value> {
    let values = match args {
        Value::List(list) => list.snapshot(),
        single => vec![single.clone()],
    };
    let mut values = values.into_iter();
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let conversion = chars
            .next()
            .ok_or_else(|| EvalError::new("incomplete format: trailing '%'"))?;
        if conversion == '%' {
            out.push('%');
            continue;
        }
        let value = values
            .next()
            .ok_or_else(|| EvalError::new("not enough arguments for format string"))?;
        match conversion {
            's' => out.push_str(&value.to_string()),
            'r' => out.push_str(&value.repr()),
            'd' => out.push_str(&value.expect_int("%d")?.to_string()),
            other => {
                return Err(EvalError::new(format!(
                    "unsupported format character '{other}'"
                )))
            }
        }
    }
    if values.next().is_some() {
        return Err(EvalError::new(
            "not all arguments converted during string formatting",
        ));
    }
    Ok(Value::from(out))
}
