use pretty_assertions::assert_eq;
use sky_diagnostic::ErrorCode;
use sky_ir::{ArgKind, BinaryOp, ExprKind, ParamKind, StmtKind, UnaryOp};

use crate::{check_build_syntax, parse, ParsedFile};

fn parse_ok(source: &str) -> ParsedFile {
    let parsed = parse(source);
    assert!(
        !parsed.has_errors(),
        "unexpected errors for {source:?}: {:?}",
        parsed.errors
    );
    parsed
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    parse(source).errors.iter().map(|e| e.code).collect()
}

#[test]
fn test_load_with_plain_and_aliased_symbols() {
    let parsed = parse_ok("load(\"//tools:defs.bzl\", \"java_rule\", lib = \"library\")\n");
    let loads: Vec<_> = parsed.loads().collect();
    assert_eq!(loads.len(), 1);
    assert_eq!(loads[0].module, "//tools:defs.bzl");
    let pairs: Vec<(&str, &str)> = loads[0]
        .symbols
        .iter()
        .map(|s| (s.local.as_str(), s.remote.as_str()))
        .collect();
    assert_eq!(pairs, vec![("java_rule", "java_rule"), ("lib", "library")]);
}

#[test]
fn test_load_trailing_comma() {
    let parsed = parse_ok("load(\":a.bzl\", \"x\",)\n");
    assert_eq!(parsed.loads().count(), 1);
}

#[test]
fn test_load_without_symbols_is_error() {
    assert_eq!(error_codes("load(\":a.bzl\")\n"), vec![ErrorCode::E1003]);
}

#[test]
fn test_load_private_symbol_is_error() {
    assert_eq!(error_codes("load(\":a.bzl\", \"_hidden\")\n"), vec![ErrorCode::E1003]);
}

#[test]
fn test_load_module_must_be_string() {
    assert_eq!(error_codes("load(x, \"y\")\n"), vec![ErrorCode::E1003]);
}

#[test]
fn test_load_inside_function_is_error() {
    let codes = error_codes("def f():\n    load(\":a.bzl\", \"x\")\n");
    assert_eq!(codes, vec![ErrorCode::E1004]);
}

#[test]
fn test_assignment_and_augmented_assignment() {
    let parsed = parse_ok("srcs = [\"a.c\"]\nsrcs += [\"b.c\"]\n");
    assert!(matches!(&parsed.stmts[0].kind, StmtKind::Assign { target, .. } if target == "srcs"));
    assert!(matches!(
        &parsed.stmts[1].kind,
        StmtKind::AugAssign { target, op: BinaryOp::Add, .. } if target == "srcs"
    ));
}

#[test]
fn test_assignment_to_attribute_is_error() {
    assert_eq!(error_codes("a.b = 1\n"), vec![ErrorCode::E1009]);
}

#[test]
fn test_rule_call_with_keyword_arguments() {
    let parsed = parse_ok("java_library(\n    name = \"lib\",\n    srcs = glob([\"*.java\"]),\n)\n");
    let StmtKind::Expr(expr) = &parsed.stmts[0].kind else {
        panic!("expected expression statement");
    };
    let ExprKind::Call { callee, args } = &expr.kind else {
        panic!("expected call");
    };
    assert_eq!(callee.kind, ExprKind::Ident("java_library".to_string()));
    let names: Vec<_> = args
        .iter()
        .map(|arg| match &arg.kind {
            ArgKind::Named(name) => name.as_str(),
            _ => "",
        })
        .collect();
    assert_eq!(names, vec!["name", "srcs"]);
}

#[test]
fn test_positional_after_keyword_is_error() {
    assert_eq!(error_codes("f(a = 1, 2)\n"), vec![ErrorCode::E1001]);
}

#[test]
fn test_def_with_defaults_and_kwargs() {
    let parsed = parse_ok("def macro(name, visibility = None, **kwargs):\n    return name\n");
    let StmtKind::Def(function) = &parsed.stmts[0].kind else {
        panic!("expected def");
    };
    assert_eq!(function.name, "macro");
    let params: Vec<_> = function
        .params
        .iter()
        .map(|p| (p.name.as_str(), p.kind, p.default.is_some()))
        .collect();
    assert_eq!(
        params,
        vec![
            ("name", ParamKind::Normal, false),
            ("visibility", ParamKind::Normal, true),
            ("kwargs", ParamKind::Kwargs, false),
        ]
    );
    assert_eq!(function.body.len(), 1);
}

#[test]
fn test_parameter_errors() {
    assert_eq!(error_codes("def f(a, a):\n    pass\n"), vec![ErrorCode::E1007]);
    assert_eq!(error_codes("def f(**kw, a):\n    pass\n"), vec![ErrorCode::E1008]);
    assert_eq!(error_codes("def f(a = 1, b):\n    pass\n"), vec![ErrorCode::E1008]);
}

#[test]
fn test_nested_def_is_error() {
    let codes = error_codes("def f():\n    def g():\n        pass\n");
    assert_eq!(codes, vec![ErrorCode::E1010]);
}

#[test]
fn test_return_outside_def_is_error() {
    assert_eq!(error_codes("return 1\n"), vec![ErrorCode::E1005]);
}

#[test]
fn test_break_outside_loop_is_error() {
    assert_eq!(error_codes("break\n"), vec![ErrorCode::E1006]);
    assert_eq!(
        error_codes("for x in []:\n    def f():\n        continue\n"),
        vec![ErrorCode::E1006]
    );
}

#[test]
fn test_break_inside_if_inside_loop_is_allowed() {
    parse_ok("def f(xs):\n    for x in xs:\n        if x:\n            break\n    return None\n");
}

#[test]
fn test_elif_becomes_nested_if() {
    let parsed = parse_ok("if a:\n    x = 1\nelif b:\n    x = 2\nelse:\n    x = 3\n");
    let StmtKind::If { else_body, .. } = &parsed.stmts[0].kind else {
        panic!("expected if");
    };
    assert_eq!(else_body.len(), 1);
    let StmtKind::If {
        else_body: inner_else,
        ..
    } = &else_body[0].kind
    else {
        panic!("expected nested if");
    };
    assert_eq!(inner_else.len(), 1);
}

#[test]
fn test_single_line_suite() {
    let parsed = parse_ok("for x in [1, 2]: y = x\n");
    let StmtKind::For { var, body, .. } = &parsed.stmts[0].kind else {
        panic!("expected for");
    };
    assert_eq!(var, "x");
    assert_eq!(body.len(), 1);
}

#[test]
fn test_semicolon_separated_statements() {
    let parsed = parse_ok("a = 1; b = 2\n");
    assert_eq!(parsed.stmts.len(), 2);
}

#[test]
fn test_operator_precedence() {
    let parsed = parse_ok("x = 1 + 2 * 3\n");
    let StmtKind::Assign { value, .. } = &parsed.stmts[0].kind else {
        panic!("expected assignment");
    };
    let ExprKind::Binary { op, right, .. } = &value.kind else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn test_not_in_and_not() {
    let parsed = parse_ok("x = not a not in b\n");
    let StmtKind::Assign { value, .. } = &parsed.stmts[0].kind else {
        panic!("expected assignment");
    };
    let ExprKind::Unary { op, operand } = &value.kind else {
        panic!("expected unary");
    };
    assert_eq!(*op, UnaryOp::Not);
    assert!(matches!(operand.kind, ExprKind::Binary { op: BinaryOp::NotIn, .. }));
}

#[test]
fn test_chained_comparison_is_error() {
    assert_eq!(error_codes("x = a < b < c\n"), vec![ErrorCode::E1001]);
}

#[test]
fn test_conditional_expression() {
    let parsed = parse_ok("x = \"a\" if flag else \"b\"\n");
    let StmtKind::Assign { value, .. } = &parsed.stmts[0].kind else {
        panic!("expected assignment");
    };
    assert!(matches!(value.kind, ExprKind::Conditional { .. }));
}

#[test]
fn test_dict_list_index_and_attribute() {
    parse_ok("d = {\"a\": [1, 2], \"b\": {}}\ny = d[\"a\"][0]\nz = native.glob([\"*\"])\n");
}

#[test]
fn test_recovery_continues_after_bad_line() {
    let parsed = parse("x = = 1\ny = 2\n");
    assert_eq!(parsed.errors.len(), 1);
    assert_eq!(parsed.errors[0].code, ErrorCode::E1002);
    assert!(matches!(&parsed.stmts[0].kind, StmtKind::Assign { target, .. } if target == "y"));
}

#[test]
fn test_recovery_skips_broken_block() {
    let parsed = parse("def f(a b):\n    pass\nz = 3\n");
    assert_eq!(parsed.errors.len(), 1);
    assert_eq!(parsed.stmts.len(), 1);
}

#[test]
fn test_unexpected_indent() {
    let parsed = parse("x = 1\n    y = 2\nz = 3\n");
    assert_eq!(parsed.errors.len(), 1);
    assert_eq!(parsed.stmts.len(), 2);
}

#[test]
fn test_missing_block_is_error() {
    let parsed = parse("if x:\ny = 1\n");
    assert!(parsed.has_errors());
}

#[test]
fn test_lexer_errors_are_reported() {
    assert_eq!(error_codes("x = \"open\n"), vec![ErrorCode::E0001]);
}

#[test]
fn test_errors_sorted_by_position() {
    let parsed = parse("return 1\nx = $\n");
    let starts: Vec<u32> = parsed.errors.iter().map(|e| e.span.start).collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted);
    assert!(parsed.errors.len() >= 2);
}

#[test]
fn test_build_check_rejects_def() {
    let parsed = parse_ok("def f():\n    pass\n");
    let errors = check_build_syntax(&parsed.stmts);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::E2001);
}

#[test]
fn test_build_check_rejects_spreads() {
    let parsed = parse_ok("genrule(*args)\ngenrule(name = \"x\", **kwargs)\n");
    let codes: Vec<_> = check_build_syntax(&parsed.stmts)
        .iter()
        .map(|e| e.code)
        .collect();
    assert_eq!(codes, vec![ErrorCode::E2002, ErrorCode::E2002]);
}

#[test]
fn test_build_check_accepts_plain_build_file() {
    let parsed = parse_ok(
        "load(\"//tools:defs.bzl\", \"java_rule\")\n\njava_rule(\n    name = \"lib\",\n    deps = [\":other\"] if True else [],\n)\n",
    );
    assert!(check_build_syntax(&parsed.stmts).is_empty());
}

#[test]
fn test_deeply_nested_expression() {
    let depth = 2000;
    let source = format!("x = {}1{}\n", "(".repeat(depth), ")".repeat(depth));
    parse_ok(&source);
}
