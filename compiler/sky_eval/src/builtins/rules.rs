//! `rule()`, `provider()` and calling the values they create.
//!
//! Calling a rule declares a target in the build file being evaluated. The
//! recorded entry holds the attributes plus two synthesized keys:
//! `buck.type` (the rule's identity) and `buck.base_path` (the package).

use std::sync::Arc;

use indexmap::IndexMap;

use super::{slot_or, Arguments};
use crate::context::TargetEntry;
use crate::errors::{
    build_file_only, missing_argument, type_mismatch, unexpected_argument, unexported_rule,
    EvalResult,
};
use crate::interpreter::Interpreter;
use crate::value::{DictKey, ProviderValue, RuleValue, StructValue};
use crate::Value;

pub(super) fn rule(args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("rule", &["implementation", "attrs", "doc"], 1)?;
    let implementation = slot_or(&mut slots[0], Value::None);
    if !matches!(implementation, Value::Function(_)) {
        return Err(type_mismatch(
            "function for rule implementation",
            implementation.type_name(),
        ));
    }
    let mut attrs = IndexMap::new();
    match slots[1].take() {
        Some(Value::Dict(dict)) => {
            for (key, default) in dict.entries() {
                let DictKey::Str(name) = key else {
                    return Err(type_mismatch("string attribute name", key.to_value().type_name()));
                };
                attrs.insert(name.to_string(), default);
            }
        }
        Some(Value::None) | None => {}
        Some(other) => return Err(type_mismatch("dict for attrs", other.type_name())),
    }
    let doc = match slots[2].take() {
        Some(doc) => doc.expect_str("doc")?.to_string(),
        None => String::new(),
    };
    Ok(Value::Rule(Arc::new(RuleValue::new(implementation, attrs, doc))))
}

pub(super) fn provider(args: Arguments) -> EvalResult<Value> {
    let mut slots = args.bind("provider", &["fields", "doc"], 0)?;
    let fields = match slots[0].take() {
        Some(Value::None) | None => None,
        Some(Value::List(list)) => Some(
            list.snapshot()
                .iter()
                .map(|field| field.expect_str("provider field").map(str::to_string))
                .collect::<EvalResult<Vec<_>>>()?,
        ),
        Some(other) => return Err(type_mismatch("list of fields", other.type_name())),
    };
    let doc = match slots[1].take() {
        Some(doc) => doc.expect_str("doc")?.to_string(),
        None => String::new(),
    };
    Ok(Value::Provider(Arc::new(ProviderValue::new(fields, doc))))
}

/// Take the mandatory `name` out of rule-call arguments.
fn target_name(rule: &str, attrs: &mut IndexMap<String, Value>) -> EvalResult<String> {
    let name = attrs
        .shift_remove("name")
        .ok_or_else(|| missing_argument(rule, "name"))?;
    Ok(name.expect_str("target name")?.to_string())
}

fn record(
    interp: &Interpreter<'_>,
    rule: &str,
    name: String,
    rule_type: String,
    attrs: IndexMap<String, Value>,
) -> EvalResult<Value> {
    let parse = interp
        .context()
        .parse
        .ok_or_else(|| build_file_only(&format!("{rule}()")))?;
    let mut entry = TargetEntry::with_capacity(attrs.len() + 3);
    entry.insert("name".to_string(), Value::from(name.as_str()));
    entry.extend(attrs);
    entry.insert("buck.type".to_string(), Value::from(rule_type));
    entry.insert("buck.base_path".to_string(), Value::from(parse.base_path()));
    tracing::trace!(target_name = %name, rule, "declared target");
    parse.record_target(&name, entry)?;
    Ok(Value::None)
}

pub(crate) fn call_rule(
    interp: &mut Interpreter<'_>,
    rule: &RuleValue,
    args: Arguments,
) -> EvalResult<Value> {
    let identity = rule.exported_name().ok_or_else(unexported_rule)?;
    let rule_name = identity.name();
    let mut given = args.named_only(rule_name)?;
    let name = target_name(rule_name, &mut given)?;

    if let Some(unknown) = given.keys().find(|key| !rule.attrs().contains_key(*key)) {
        return Err(unexpected_argument(rule_name, unknown));
    }
    let mut attrs = IndexMap::with_capacity(rule.attrs().len());
    for (attr, default) in rule.attrs() {
        let value = given.shift_remove(attr).unwrap_or_else(|| default.clone());
        attrs.insert(attr.clone(), value);
    }
    record(interp, rule_name, name, identity.to_string(), attrs)
}

pub(crate) fn call_native_rule(
    interp: &mut Interpreter<'_>,
    rule: &str,
    args: Arguments,
) -> EvalResult<Value> {
    let mut attrs = args.named_only(rule)?;
    let name = target_name(rule, &mut attrs)?;
    record(interp, rule, name, rule.to_string(), attrs)
}

pub(crate) fn call_provider(
    provider: &Arc<ProviderValue>,
    args: Arguments,
) -> EvalResult<Value> {
    let name = provider
        .exported_name()
        .map_or_else(|| "provider".to_string(), |id| id.name().to_string());
    let fields = args.named_only(&name)?;
    if let Some(allowed) = provider.fields() {
        if let Some(unknown) = fields.keys().find(|key| !allowed.contains(*key)) {
            return Err(unexpected_argument(&name, unknown));
        }
    }
    Ok(Value::Struct(Arc::new(StructValue::from_provider(
        Arc::clone(provider),
        fields,
    ))))
}
