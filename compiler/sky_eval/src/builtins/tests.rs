#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use sky_ir::FileKind;

use super::{universe, Arguments, Builtin};
use crate::errors::EvalErrorKind;
use crate::Value;

fn positional(values: Vec<Value>) -> Arguments {
    Arguments {
        positional: values,
        ..Arguments::default()
    }
}

#[test]
fn test_build_universe_has_package_functions_at_top_level() {
    let names = universe(FileKind::Build, &["genrule".to_string()]);
    assert!(names.contains_key("glob"));
    assert!(names.contains_key("genrule"));
    assert!(names.contains_key("len"));
    assert!(!names.contains_key("native"));
    assert!(!names.contains_key("load_symbols"));
}

#[test]
fn test_extension_universe_exposes_native_struct() {
    let names = universe(FileKind::Extension, &["genrule".to_string()]);
    assert!(!names.contains_key("glob"));
    assert!(names.contains_key("load_symbols"));
    let Some(Value::Struct(native)) = names.get("native") else {
        panic!("expected native struct");
    };
    assert!(matches!(native.get("genrule"), Some(Value::NativeRule(name)) if &**name == "genrule"));
    assert!(matches!(
        native.get("glob"),
        Some(Value::Builtin(Builtin::Glob))
    ));
}

#[test]
fn test_bind_positional_and_named() {
    let mut args = positional(vec![Value::from(1)]);
    args.add_named("b", Value::from(2)).unwrap();
    let slots = args.bind("f", &["a", "b", "c"], 2).unwrap();
    assert_eq!(slots.len(), 3);
    assert!(slots[0].as_ref().is_some_and(|v| v.equals(&Value::from(1))));
    assert!(slots[1].as_ref().is_some_and(|v| v.equals(&Value::from(2))));
    assert!(slots[2].is_none());
}

#[test]
fn test_bind_errors() {
    let err = positional(vec![Value::None, Value::None])
        .bind("f", &["a"], 0)
        .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::TooManyArguments {
            function: "f".to_string(),
            max: 1,
            got: 2
        }
    );

    let err = Arguments::default().bind("f", &["a"], 1).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::MissingArgument { .. }));

    let mut args = Arguments::default();
    args.add_named("zzz", Value::None).unwrap();
    let err = args.bind("f", &["a"], 0).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UnexpectedArgument { .. }));
}

#[test]
fn test_repeated_keyword_rejected() {
    let mut args = Arguments::default();
    args.add_named("a", Value::None).unwrap();
    assert!(args.add_named("a", Value::None).is_err());
}

#[test]
fn test_native_rule_names_shared() {
    let names = universe(FileKind::Build, &["java_library".to_string()]);
    let Some(Value::NativeRule(rule)) = names.get("java_library") else {
        panic!("expected native rule");
    };
    assert_eq!(rule, &Arc::<str>::from("java_library"));
}
