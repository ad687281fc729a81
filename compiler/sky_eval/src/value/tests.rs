#![allow(clippy::unwrap_used)]

use std::cmp::Ordering;
use std::sync::Arc;

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use sky_ir::{Label, RepoName};

use super::{
    DictKey, DictValue, Exportable, ListValue, ProviderValue, RuleValue, StructValue, Value,
};
use crate::errors::EvalErrorKind;

fn label(package: &str, name: &str) -> Label {
    Label::new_unvalidated(RepoName::Main, package, name)
}

#[test]
fn test_truth() {
    assert!(!Value::None.truth());
    assert!(!Value::from(0).truth());
    assert!(!Value::from("").truth());
    assert!(!Value::list(vec![]).truth());
    assert!(Value::from("x").truth());
    assert!(Value::list(vec![Value::None]).truth());
}

#[test]
fn test_repr_and_str() {
    let value = Value::list(vec![Value::from("a\"b"), Value::from(1), Value::None]);
    assert_eq!(value.repr(), r#"["a\"b", 1, None]"#);
    assert_eq!(Value::from("plain").to_string(), "plain");
    assert_eq!(Value::from("plain").repr(), "\"plain\"");

    let mut entries = IndexMap::new();
    entries.insert(DictKey::from("k"), Value::Bool(true));
    assert_eq!(Value::dict(entries).repr(), r#"{"k": True}"#);

    let mut fields = IndexMap::new();
    fields.insert("x".to_string(), Value::from(1));
    let s = Value::Struct(Arc::new(StructValue::new(fields)));
    assert_eq!(s.repr(), "struct(x = 1)");
}

#[test]
fn test_equality_is_structural_for_data() {
    let a = Value::list(vec![Value::from(1), Value::from("x")]);
    let b = Value::list(vec![Value::from(1), Value::from("x")]);
    assert!(a.equals(&b));
    assert!(!a.equals(&Value::list(vec![Value::from(1)])));
    assert!(!Value::from(1).equals(&Value::from("1")));
}

#[test]
fn test_cyclic_lists_terminate() {
    let cyclic = || {
        let list = Arc::new(ListValue::new(vec![Value::from(1)]));
        list.push(Value::List(Arc::clone(&list))).unwrap();
        Value::List(list)
    };
    let (a, b) = (cyclic(), cyclic());

    assert_eq!(a.repr(), "[1, [...]]");
    assert!(a.equals(&b));
    assert_eq!(a.compare(&b), Some(Ordering::Equal));
    assert!(!a.equals(&Value::list(vec![Value::from(1), Value::list(vec![])])));

    let outer = Value::list(vec![a.clone(), a]);
    assert_eq!(outer.repr(), "[[1, [...]], [1, [...]]]");
}

#[test]
fn test_cyclic_dict_repr() {
    let dict = Arc::new(DictValue::new(IndexMap::new()));
    dict.insert(DictKey::from("me"), Value::Dict(Arc::clone(&dict)))
        .unwrap();
    assert_eq!(Value::Dict(dict).repr(), r#"{"me": {...}}"#);
}

#[test]
fn test_compare_lists_lexicographically() {
    let a = Value::list(vec![Value::from(1), Value::from(2)]);
    let b = Value::list(vec![Value::from(1), Value::from(3)]);
    assert_eq!(a.compare(&b), Some(Ordering::Less));
    assert_eq!(Value::from(1).compare(&Value::from("a")), None);
}

#[test]
fn test_freeze_is_deep() {
    let inner = Value::list(vec![]);
    let mut entries = IndexMap::new();
    entries.insert(DictKey::from("inner"), inner.clone());
    let outer = Value::dict(entries);

    outer.freeze();

    let Value::List(list) = &inner else {
        panic!("expected list");
    };
    let err = list.push(Value::None).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::FrozenMutation {
            type_name: "list".to_string()
        }
    );
    let Value::Dict(dict) = &outer else {
        panic!("expected dict");
    };
    assert!(dict.insert(DictKey::from("x"), Value::None).is_err());
}

#[test]
fn test_self_referencing_list_freezes() {
    let value = Value::list(vec![]);
    let Value::List(list) = &value else {
        panic!("expected list");
    };
    list.push(value.clone()).unwrap();
    value.freeze();
    assert!(list.is_frozen());
}

#[test]
fn test_unhashable_dict_key() {
    assert!(DictKey::from_value(&Value::list(vec![])).is_err());
    assert_eq!(
        DictKey::from_value(&Value::from(3)).unwrap(),
        DictKey::Int(3)
    );
}

#[test]
fn test_export_stamps_identity_once() {
    let rule = RuleValue::new(Value::None, IndexMap::new(), String::new());
    let exportable = Exportable::Rule(&rule);
    assert!(!exportable.is_exported());

    assert!(exportable.export(&label("lib", "defs.bzl"), "java_rule"));
    assert!(!exportable.export(&label("other", "x.bzl"), "alias"));

    let name = rule.exported_name().unwrap();
    assert_eq!(name.name(), "java_rule");
    assert_eq!(name.to_string(), "//lib:defs.bzl:java_rule");
}

#[test]
fn test_provider_instance_named_after_provider() {
    let provider = Arc::new(ProviderValue::new(None, String::new()));
    Exportable::Provider(&provider).export(&label("", "p.bzl"), "Info");
    let mut fields = IndexMap::new();
    fields.insert("a".to_string(), Value::from(1));
    let instance = StructValue::from_provider(provider, fields);
    assert_eq!(instance.constructor_name(), "Info");
}
