//! Functions tied to the package or extension being evaluated.

use super::{slot_or, Arguments};
use crate::context::{GlobSpec, ParseContext};
use crate::errors::{build_file_only, extension_only, io_error, type_mismatch, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::DictKey;
use crate::Value;

fn parse_context<'a>(interp: &Interpreter<'a>, function: &str) -> EvalResult<&'a ParseContext> {
    interp
        .context()
        .parse
        .ok_or_else(|| build_file_only(function))
}

fn string_list(value: &Value, what: &str) -> EvalResult<Vec<String>> {
    let Value::List(list) = value else {
        return Err(type_mismatch(&format!("list of strings for {what}"), value.type_name()));
    };
    list.snapshot()
        .iter()
        .map(|item| item.expect_str(what).map(str::to_string))
        .collect()
}

pub(super) fn glob(interp: &mut Interpreter<'_>, args: Arguments) -> EvalResult<Value> {
    let parse = parse_context(interp, "glob()")?;
    let mut slots = args.bind("glob", &["include", "exclude", "exclude_directories"], 1)?;
    let spec = GlobSpec {
        include: string_list(&slot_or(&mut slots[0], Value::None), "include")?,
        exclude: match slots[1].take() {
            Some(exclude) => string_list(&exclude, "exclude")?,
            None => Vec::new(),
        },
        exclude_directories: slot_or(&mut slots[2], Value::Bool(true)).truth(),
    };
    let paths = parse.glob(spec).map_err(|e| io_error(&e))?;
    Ok(Value::list(paths.into_iter().map(Value::from).collect()))
}

pub(super) fn package_name(interp: &mut Interpreter<'_>, args: Arguments) -> EvalResult<Value> {
    let parse = parse_context(interp, "package_name()")?;
    args.bind("package_name", &[], 0)?;
    Ok(Value::from(parse.base_path()))
}

/// `@name` of the package's repository; `@` for the main one.
pub(super) fn repository_name(interp: &mut Interpreter<'_>, args: Arguments) -> EvalResult<Value> {
    let parse = parse_context(interp, "repository_name()")?;
    args.bind("repository_name", &[], 0)?;
    Ok(Value::from(format!("@{}", parse.label().repo().name())))
}

pub(super) fn implicit_package_symbol(
    interp: &mut Interpreter<'_>,
    args: Arguments,
) -> EvalResult<Value> {
    let parse = parse_context(interp, "implicit_package_symbol()")?;
    let mut slots = args.bind("implicit_package_symbol", &["symbol", "default"], 1)?;
    let symbol = slot_or(&mut slots[0], Value::None);
    let symbol = symbol.expect_str("symbol")?;
    Ok(parse
        .implicit_symbol(symbol)
        .cloned()
        .unwrap_or_else(|| slot_or(&mut slots[1], Value::None)))
}

pub(super) fn read_config(interp: &mut Interpreter<'_>, args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("read_config", &["section", "field", "default"], 2)?;
    let section = slot_or(&mut slots[0], Value::None);
    let field = slot_or(&mut slots[1], Value::None);
    let value = interp
        .context()
        .config
        .read(section.expect_str("section")?, field.expect_str("field")?);
    Ok(match value {
        Some(value) => Value::from(value),
        None => slot_or(&mut slots[2], Value::None),
    })
}

/// `load_symbols({"name": value})`: add bindings to the extension's exports
/// once its body has finished.
pub(super) fn load_symbols(interp: &mut Interpreter<'_>, args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("load_symbols", &["symbols"], 1)?;
    let Value::Dict(symbols) = slot_or(&mut slots[0], Value::None) else {
        return Err(type_mismatch("dict for load_symbols", "non-dict"));
    };
    let Some(exports) = interp.pending_exports() else {
        return Err(extension_only("load_symbols()"));
    };
    for (key, value) in symbols.entries() {
        let DictKey::Str(name) = key else {
            return Err(type_mismatch("string symbol name", key.to_value().type_name()));
        };
        exports.insert(name.to_string(), value);
    }
    Ok(Value::None)
}
