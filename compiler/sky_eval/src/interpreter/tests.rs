#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use sky_diagnostic::{BufferSink, Severity};
use sky_ir::{FileKind, Label, RepoName, SourceInfo};

use super::{Interpreter, LoadedModules};
use crate::errors::{EvalErrorKind, EvalResult};
use crate::{
    CancellationToken, EvalContext, ExportOnBind, Globber, KnownRuleTypes, Module, ParseContext,
    Program, RawConfig, ReadConfigContext, Value,
};

struct StaticGlobber(Vec<String>);

impl Globber for StaticGlobber {
    fn glob(&self, _include: &[String], _exclude: &[String], _dirs: bool) -> io::Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

fn label(text: &str) -> Label {
    let (package, name) = text.split_once(':').unwrap();
    Label::new_unvalidated(RepoName::Main, package, name)
}

fn program(text: &str, kind: FileKind, source: &str) -> Arc<Program> {
    let parsed = sky_parse::parse(source);
    assert!(!parsed.has_errors(), "{:?}", parsed.errors);
    let label = label(text);
    let info = SourceInfo::new(label.to_path_fragment().display().to_string(), source);
    Program::new(label, kind, info, parsed.stmts)
}

struct Env {
    sink: BufferSink,
    cancel: CancellationToken,
    config: ReadConfigContext,
    rules: KnownRuleTypes,
    native_rules: Vec<String>,
}

impl Env {
    fn new() -> Self {
        let mut raw = RawConfig::new();
        raw.insert(
            "java".to_string(),
            BTreeMap::from([("version".to_string(), "17".to_string())]),
        );
        Env {
            sink: BufferSink::new(),
            cancel: CancellationToken::new(),
            config: ReadConfigContext::new(Arc::new(raw)),
            rules: KnownRuleTypes::new(),
            native_rules: vec!["genrule".to_string()],
        }
    }

    fn eval_full(
        &self,
        text: &str,
        kind: FileKind,
        source: &str,
        loaded: &LoadedModules,
        parse: Option<&ParseContext>,
    ) -> EvalResult<Arc<Module>> {
        let hook = ExportOnBind::new(&self.rules);
        let ctx = EvalContext {
            sink: &self.sink,
            cancel: &self.cancel,
            config: &self.config,
            rules: &self.rules,
            hook: &hook,
            native_rules: &self.native_rules,
            parse,
        };
        let program = program(text, kind, source);
        Interpreter::new(&ctx).eval_module(&program, loaded, &IndexMap::new())
    }

    fn extension(&self, text: &str, source: &str) -> EvalResult<Arc<Module>> {
        self.eval_full(text, FileKind::Extension, source, &LoadedModules::default(), None)
    }
}

fn parse_context(text: &str) -> ParseContext {
    ParseContext::new(
        label(text),
        Arc::new(StaticGlobber(vec!["A.java".to_string(), "B.java".to_string()])),
        IndexMap::new(),
    )
}

fn get(module: &Module, name: &str) -> Value {
    module
        .get(name)
        .unwrap_or_else(|| panic!("`{name}` not bound"))
}

#[test]
fn test_arithmetic_rounds_toward_negative_infinity() {
    let env = Env::new();
    let module = env
        .extension("lib:m.bzl", "a = 7 // 2\nb = -7 // 2\nc = -7 % 3\nd = 7 % -3\n")
        .unwrap();
    assert_eq!(get(&module, "a").as_int(), Some(3));
    assert_eq!(get(&module, "b").as_int(), Some(-4));
    assert_eq!(get(&module, "c").as_int(), Some(2));
    assert_eq!(get(&module, "d").as_int(), Some(-2));
}

#[test]
fn test_string_operations() {
    let env = Env::new();
    let source = "\
a = \"%s-%d\" % [\"lib\", 3]
b = \"{}:{name}\".format(\"x\", name = \"y\")
c = \",\".join([\"a\", \"b\"])
d = \"a b  c\".split()
e = \"src/main\".startswith(\"src\")
f = \"x\" * 3
";
    let module = env.extension("lib:m.bzl", source).unwrap();
    assert_eq!(get(&module, "a").as_str(), Some("lib-3"));
    assert_eq!(get(&module, "b").as_str(), Some("x:y"));
    assert_eq!(get(&module, "c").as_str(), Some("a,b"));
    assert_eq!(get(&module, "d").repr(), r#"["a", "b", "c"]"#);
    assert!(get(&module, "e").truth());
    assert_eq!(get(&module, "f").as_str(), Some("xxx"));
}

#[test]
fn test_integer_overflow_is_error() {
    let env = Env::new();
    let err = env
        .extension("lib:m.bzl", "x = 9223372036854775807 + 1\n")
        .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::IntegerOverflow);
    assert_eq!(err.location.map(|l| l.line()), Some(1));
}

#[test]
fn test_sequence_repetition_is_bounded() {
    let env = Env::new();
    for source in [
        "x = \"ab\" * 9223372036854775807\n",
        "x = 9223372036854775807 * [1, 2]\n",
        "x = [None] * 16777217\n",
    ] {
        let err = env.extension("lib:m.bzl", source).unwrap_err();
        assert!(
            matches!(err.kind, EvalErrorKind::Custom { .. }),
            "{source}: {err:?}"
        );
        assert!(err.message.contains("exceeds the limit"), "{}", err.message);
        assert_eq!(err.location.map(|l| l.line()), Some(1));
    }
}

#[test]
fn test_repeating_empty_or_negative_is_empty() {
    let env = Env::new();
    let source = "\
a = [] * 9223372036854775807
b = \"\" * 9223372036854775807
c = [1] * -3
d = \"ab\" * 0
";
    let module = env.extension("lib:m.bzl", source).unwrap();
    assert_eq!(get(&module, "a").repr(), "[]");
    assert_eq!(get(&module, "b").as_str(), Some(""));
    assert_eq!(get(&module, "c").repr(), "[]");
    assert_eq!(get(&module, "d").as_str(), Some(""));
}

#[test]
fn test_self_referential_list_prints() {
    let env = Env::new();
    let source = "\
x = [1]
x.append(x)
d = {\"k\": 1}
d.update(me = d)
print(str(x), d)
same = x == x
s = str([x, x])
";
    let module = env.extension("lib:m.bzl", source).unwrap();
    assert_eq!(get(&module, "x").repr(), "[1, [...]]");
    assert_eq!(get(&module, "s").as_str(), Some("[[1, [...]], [1, [...]]]"));
    assert!(get(&module, "same").truth());
    let diagnostics = env.sink.diagnostics();
    assert_eq!(diagnostics[0].message, r#"[1, [...]] {"k": 1, "me": {...}}"#);
}

#[test]
fn test_function_defaults_and_kwargs() {
    let env = Env::new();
    let source = "\
def f(a, b = 2, **kw):
    return [a, b, kw]

x = f(1)
y = f(1, b = 3, extra = 4)
";
    let module = env.extension("lib:m.bzl", source).unwrap();
    assert_eq!(get(&module, "x").repr(), "[1, 2, {}]");
    assert_eq!(get(&module, "y").repr(), r#"[1, 3, {"extra": 4}]"#);
}

#[test]
fn test_control_flow() {
    let env = Env::new();
    let source = "\
def pick(items):
    out = []
    for i in items:
        if i == 3:
            break
        elif i % 2 == 0:
            continue
        out += [i]
    return out

x = pick(range(10))
y = 1 if len(x) > 1 else 2
";
    let module = env.extension("lib:m.bzl", source).unwrap();
    assert_eq!(get(&module, "x").repr(), "[1]");
    assert_eq!(get(&module, "y").as_int(), Some(2));
}

#[test]
fn test_missing_argument_has_traceback() {
    let env = Env::new();
    let source = "\
def inner(a):
    return a

def outer():
    return inner()

outer()
";
    let err = env.extension("lib:m.bzl", source).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::MissingArgument { .. }));
    let frames: Vec<&str> = err.backtrace.iter().map(|f| f.function.as_str()).collect();
    assert_eq!(frames, vec!["outer"]);
    assert!(err.message_with_stack().starts_with("Traceback"));
}

#[test]
fn test_recursion_is_rejected() {
    let env = Env::new();
    let source = "\
def f(n):
    return f(n - 1)

f(3)
";
    let err = env.extension("lib:m.bzl", source).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::RecursiveCall {
            function: "f".to_string()
        }
    );
}

#[test]
fn test_undefined_name_reports_location() {
    let env = Env::new();
    let err = env.extension("lib:m.bzl", "x = 1\ny = nope\n").unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedVariable {
            name: "nope".to_string()
        }
    );
    let location = err.location.unwrap();
    assert_eq!((location.line(), location.column()), (2, 5));
}

#[test]
fn test_module_is_frozen_after_evaluation() {
    let env = Env::new();
    let defs = env
        .extension(
            "lib:defs.bzl",
            "SRCS = [\"a\"]\ndef add(x):\n    SRCS.append(x)\n",
        )
        .unwrap();
    assert!(defs.is_frozen());

    let mut loaded = LoadedModules::default();
    loaded.insert(":defs.bzl".to_string(), defs);
    let err = env
        .eval_full(
            "lib:user.bzl",
            FileKind::Extension,
            "load(\":defs.bzl\", \"add\")\nadd(\"b\")\n",
            &loaded,
            None,
        )
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::FrozenMutation { .. }));
}

#[test]
fn test_loaded_symbols_are_file_local() {
    let env = Env::new();
    let defs = env.extension("lib:defs.bzl", "x = 1\n").unwrap();
    let mut loaded = LoadedModules::default();
    loaded.insert("//lib:defs.bzl".to_string(), defs);

    let user = env
        .eval_full(
            "app:user.bzl",
            FileKind::Extension,
            "load(\"//lib:defs.bzl\", y = \"x\")\nz = y + 1\n",
            &loaded,
            None,
        )
        .unwrap();
    assert!(user.get("y").is_none());
    assert!(user.lookup("y").is_some());
    assert_eq!(get(&user, "z").as_int(), Some(2));
    assert_eq!(user.names(), vec!["z".to_string()]);
}

#[test]
fn test_missing_loaded_symbol() {
    let env = Env::new();
    let defs = env.extension("lib:defs.bzl", "x = 1\n").unwrap();
    let mut loaded = LoadedModules::default();
    loaded.insert(":defs.bzl".to_string(), defs);
    let err = env
        .eval_full(
            "lib:user.bzl",
            FileKind::Extension,
            "load(\":defs.bzl\", \"missing\")\n",
            &loaded,
            None,
        )
        .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::MissingSymbol {
            symbol: "missing".to_string(),
            module: ":defs.bzl".to_string()
        }
    );
}

#[test]
fn test_export_on_bind_names_rule_once() {
    let env = Env::new();
    let source = "\
def _impl(ctx):
    pass

java_rule = rule(implementation = _impl, attrs = {\"srcs\": []})
alias = java_rule
";
    let module = env.extension("lib:defs.bzl", source).unwrap();
    let Value::Rule(rule) = get(&module, "alias") else {
        panic!("expected rule");
    };
    assert_eq!(rule.exported_name().unwrap().name(), "java_rule");
    assert_eq!(env.rules.rule_names(&label("lib:defs.bzl")), vec!["java_rule"]);
}

#[test]
fn test_reevaluation_invalidates_registered_rules() {
    let env = Env::new();
    let first = "def _i(ctx):\n    pass\n\nold = rule(implementation = _i)\n";
    let second = "def _i(ctx):\n    pass\n\nnew = rule(implementation = _i)\n";
    env.extension("lib:defs.bzl", first).unwrap();
    env.extension("lib:defs.bzl", second).unwrap();
    assert_eq!(env.rules.rule_names(&label("lib:defs.bzl")), vec!["new"]);
}

#[test]
fn test_function_locals_are_not_exported() {
    let env = Env::new();
    let source = "\
def make():
    local_rule = provider()
    return local_rule

Info = make()
";
    let module = env.extension("lib:defs.bzl", source).unwrap();
    let Value::Provider(provider) = get(&module, "Info") else {
        panic!("expected provider");
    };
    assert_eq!(provider.exported_name().unwrap().name(), "Info");
}

#[test]
fn test_load_symbols_extends_exports() {
    let env = Env::new();
    let module = env
        .extension("lib:m.bzl", "load_symbols({\"extra\": 42})\nx = 1\n")
        .unwrap();
    assert_eq!(get(&module, "extra").as_int(), Some(42));
    assert_eq!(module.names(), vec!["x".to_string(), "extra".to_string()]);
}

#[test]
fn test_load_symbols_outside_extension() {
    let env = Env::new();
    let parse = parse_context("pkg:BUCK");
    let err = env
        .eval_full(
            "pkg:BUCK",
            FileKind::Build,
            "load_symbols({})\n",
            &LoadedModules::default(),
            Some(&parse),
        )
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UndefinedVariable { .. }));
}

#[test]
fn test_rule_call_records_target() {
    let env = Env::new();
    let defs = env
        .extension(
            "lib:defs.bzl",
            "def _i(ctx):\n    pass\n\nmy_rule = rule(implementation = _i, attrs = {\"srcs\": [], \"deps\": []})\n",
        )
        .unwrap();
    let mut loaded = LoadedModules::default();
    loaded.insert("//lib:defs.bzl".to_string(), defs);

    let parse = parse_context("app:BUCK");
    env.eval_full(
        "app:BUCK",
        FileKind::Build,
        "load(\"//lib:defs.bzl\", \"my_rule\")\nmy_rule(name = \"a\", srcs = glob([\"*.java\"]))\ngenrule(name = \"g\", cmd = \"true\")\n",
        &loaded,
        Some(&parse),
    )
    .unwrap();

    let targets = parse.targets();
    assert_eq!(targets.len(), 2);
    let rendered: Vec<(String, String)> = targets[0]
        .iter()
        .map(|(k, v)| (k.clone(), v.repr()))
        .collect();
    assert_eq!(
        rendered,
        vec![
            ("name".to_string(), "\"a\"".to_string()),
            ("srcs".to_string(), r#"["A.java", "B.java"]"#.to_string()),
            ("deps".to_string(), "[]".to_string()),
            ("buck.type".to_string(), "\"//lib:defs.bzl:my_rule\"".to_string()),
            ("buck.base_path".to_string(), "\"app\"".to_string()),
        ]
    );
    assert_eq!(targets[1]["buck.type"].as_str(), Some("genrule"));
    assert_eq!(parse.globs().len(), 1);
}

#[test]
fn test_rule_rejects_undeclared_attribute() {
    let env = Env::new();
    let defs = env
        .extension("lib:defs.bzl", "def _i(ctx):\n    pass\n\nr = rule(implementation = _i)\n")
        .unwrap();
    let mut loaded = LoadedModules::default();
    loaded.insert(":defs.bzl".to_string(), defs);
    let parse = parse_context("lib:BUCK");
    let err = env
        .eval_full(
            "lib:BUCK",
            FileKind::Build,
            "load(\":defs.bzl\", \"r\")\nr(name = \"a\", bogus = 1)\n",
            &loaded,
            Some(&parse),
        )
        .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UnexpectedArgument {
            function: "r".to_string(),
            name: "bogus".to_string()
        }
    );
}

#[test]
fn test_duplicate_target_name() {
    let env = Env::new();
    let parse = parse_context("pkg:BUCK");
    let err = env
        .eval_full(
            "pkg:BUCK",
            FileKind::Build,
            "genrule(name = \"a\")\ngenrule(name = \"a\")\n",
            &LoadedModules::default(),
            Some(&parse),
        )
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::DuplicateTarget { .. }));
}

#[test]
fn test_rule_call_at_extension_top_level() {
    let env = Env::new();
    let err = env
        .extension(
            "lib:defs.bzl",
            "def _i(ctx):\n    pass\n\nr = rule(implementation = _i)\nr(name = \"x\")\n",
        )
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::BuildFileOnly { .. }));
}

#[test]
fn test_unexported_rule_call() {
    let env = Env::new();
    let parse = parse_context("pkg:BUCK");
    let defs = env
        .extension(
            "pkg:defs.bzl",
            "def _i(ctx):\n    pass\n\ndef make():\n    return rule(implementation = _i)\n",
        )
        .unwrap();
    let mut loaded = LoadedModules::default();
    loaded.insert(":defs.bzl".to_string(), defs);
    let err = env
        .eval_full(
            "pkg:BUCK",
            FileKind::Build,
            "load(\":defs.bzl\", \"make\")\nmake()(name = \"x\")\n",
            &loaded,
            Some(&parse),
        )
        .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::UnexportedRule);
}

#[test]
fn test_native_functions_from_extension_macro() {
    let env = Env::new();
    let defs = env
        .extension(
            "lib:defs.bzl",
            "def lib(name):\n    native.genrule(name = name, out = native.package_name())\n",
        )
        .unwrap();
    let mut loaded = LoadedModules::default();
    loaded.insert("//lib:defs.bzl".to_string(), defs);
    let parse = parse_context("app/sub:BUCK");
    env.eval_full(
        "app/sub:BUCK",
        FileKind::Build,
        "load(\"//lib:defs.bzl\", \"lib\")\nlib(\"x\")\n",
        &loaded,
        Some(&parse),
    )
    .unwrap();
    let targets = parse.targets();
    assert_eq!(targets[0]["out"].as_str(), Some("app/sub"));
}

#[test]
fn test_print_goes_to_sink() {
    let env = Env::new();
    env.extension("lib:m.bzl", "print(\"hello\", 1)\n").unwrap();
    let diagnostics = env.sink.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Note);
    assert_eq!(diagnostics[0].message, "hello 1");
    assert_eq!(diagnostics[0].location.as_ref().map(|l| l.line()), Some(1));
}

#[test]
fn test_read_config_tracks_reads() {
    let env = Env::new();
    let module = env
        .extension(
            "lib:m.bzl",
            "v = read_config(\"java\", \"version\")\nw = read_config(\"java\", \"missing\", \"dflt\")\n",
        )
        .unwrap();
    assert_eq!(get(&module, "v").as_str(), Some("17"));
    assert_eq!(get(&module, "w").as_str(), Some("dflt"));
    let reads = env.config.reads();
    assert_eq!(reads["java"]["version"].as_deref(), Some("17"));
    assert_eq!(reads["java"]["missing"], None);
}

#[test]
fn test_fail_message() {
    let env = Env::new();
    let err = env
        .extension("lib:m.bzl", "fail(\"bad value\", attr = \"srcs\")\n")
        .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::Fail {
            message: "attribute srcs: bad value".to_string()
        }
    );
}

#[test]
fn test_cancellation_interrupts() {
    let env = Env::new();
    env.cancel.cancel();
    let err = env.extension("lib:m.bzl", "x = 1\n").unwrap_err();
    assert!(err.is_interrupted());
}

#[test]
fn test_provider_rejects_unknown_field() {
    let env = Env::new();
    let err = env
        .extension(
            "lib:m.bzl",
            "Info = provider(fields = [\"a\"])\nx = Info(a = 1)\ny = Info(b = 2)\n",
        )
        .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UnexpectedArgument {
            function: "Info".to_string(),
            name: "b".to_string()
        }
    );
}

#[test]
fn test_dict_and_struct_access() {
    let env = Env::new();
    let source = "\
d = {\"a\": 1}
d[\"b\"] = 2
";
    // Index assignment is not part of the language.
    assert!(sky_parse::parse(source).has_errors());

    let module = env
        .extension(
            "lib:m.bzl",
            "d = {\"a\": 1}\nd.update(b = 2)\ns = struct(v = d[\"b\"])\nx = s.v\nk = sorted(d.keys(), reverse = True)\n",
        )
        .unwrap();
    assert_eq!(get(&module, "x").as_int(), Some(2));
    assert_eq!(get(&module, "k").repr(), r#"["b", "a"]"#);
}
