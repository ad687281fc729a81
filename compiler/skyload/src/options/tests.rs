#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use pretty_assertions::assert_eq;

use super::{ConfigError, ImplicitInclude, LoaderConfig, DEFAULT_NATIVE_RULES};

#[test]
fn test_implicit_include_text_form() {
    let include = ImplicitInclude::parse("//tools:defs.bzl::java_library::lib=cxx_library").unwrap();
    assert_eq!(include.load_path(), "//tools:defs.bzl");
    assert_eq!(
        include.symbols(),
        &IndexMap::from([
            ("java_library".to_string(), "java_library".to_string()),
            ("lib".to_string(), "cxx_library".to_string()),
        ])
    );
    assert_eq!(
        include.to_string(),
        "//tools:defs.bzl::java_library::lib=cxx_library"
    );
}

#[test]
fn test_implicit_include_rejects_malformed_text() {
    assert!(ImplicitInclude::parse("::sym").unwrap_err().contains("no load path"));
    assert!(ImplicitInclude::parse("//a:b.bzl::")
        .unwrap_err()
        .contains("empty symbol"));
    assert!(ImplicitInclude::parse("//a:b.bzl::x=")
        .unwrap_err()
        .contains("empty symbol"));
    assert!(ImplicitInclude::parse("//a:b.bzl")
        .unwrap_err()
        .contains("names no symbols"));
}

#[test]
fn test_config_into_options() {
    let config = LoaderConfig::from_json(
        r#"{
            "cell_name": "main",
            "cell_roots": { "tp": "../third_party", "abs": "/opt/abs" },
            "implicit_includes": {
                "": "//tools:root.bzl::ROOT",
                "java": { "load_path": "//tools:java.bzl", "symbols": { "lib": "java_library" } }
            },
            "config": { "java": { "version": "17" } },
            "build_file_name": "TARGETS"
        }"#,
    )
    .unwrap();
    let options = config.into_options(Path::new("/work/repo")).unwrap();

    assert_eq!(options.project_root, PathBuf::from("/work/repo"));
    assert_eq!(options.cell_name, "main");
    assert_eq!(options.cell_roots["tp"], PathBuf::from("/work/repo/../third_party"));
    assert_eq!(options.cell_roots["abs"], PathBuf::from("/opt/abs"));
    assert_eq!(options.implicit_includes[""].to_string(), "//tools:root.bzl::ROOT");
    assert_eq!(options.implicit_includes["java"].to_string(), "//tools:java.bzl::lib=java_library");
    assert_eq!(options.raw_config["java"]["version"], "17");
    assert_eq!(options.build_file_name, "TARGETS");
    assert_eq!(options.native_rules, DEFAULT_NATIVE_RULES.to_vec());
}

#[test]
fn test_config_errors() {
    assert!(matches!(
        LoaderConfig::from_json(r#"{ "cell_nmae": "x" }"#),
        Err(ConfigError::Json(_))
    ));

    let config = LoaderConfig::from_json(r#"{ "implicit_includes": { "pkg": "//a:b.bzl" } }"#).unwrap();
    let error = config.into_options(Path::new("/repo")).unwrap_err();
    assert!(matches!(&error, ConfigError::ImplicitInclude { base_path, .. } if base_path == "pkg"));

    assert!(matches!(
        LoaderConfig::from_file(Path::new("/definitely/not/here.json")),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn test_empty_config_uses_defaults() {
    let options = LoaderConfig::from_json("{}")
        .unwrap()
        .into_options(Path::new("/repo"))
        .unwrap();
    assert_eq!(options.project_root, PathBuf::from("/repo"));
    assert_eq!(options.build_file_name, "BUCK");
    assert!(options.implicit_includes.is_empty());
    assert!(options.native_rules.contains(&"genrule".to_string()));
}
