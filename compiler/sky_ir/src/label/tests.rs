#![allow(clippy::unwrap_used)]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn build_label(package: &str) -> Label {
    Label::new_unvalidated(RepoName::Main, package, "BUCK")
}

#[test]
fn test_same_package_relative() {
    let label = build_label("pkg").relative(":sibling").unwrap();
    assert_eq!(label.to_string(), "//pkg:sibling");
    assert_eq!(label.to_path_fragment(), PathBuf::from("pkg/sibling"));
}

#[test]
fn test_relative_with_slash_parses() {
    // Rejected by the loader, not by label syntax.
    let label = build_label("pkg").relative(":nested/sibling").unwrap();
    assert_eq!(label.name(), "nested/sibling");
}

#[test]
fn test_absolute_in_containing_repo() {
    let containing = Label::new_unvalidated(RepoName::from_stripped("other"), "a", "BUCK");
    let label = containing.relative("//lib:defs.bzl").unwrap();
    assert_eq!(label.repo(), &RepoName::from_stripped("other"));
    assert_eq!(label.to_string(), "@other//lib:defs.bzl");
}

#[test]
fn test_at_repo_and_cell_forms() {
    let base = build_label("pkg");
    let at = base.relative("@tools//build:rules.bzl").unwrap();
    let cell = base.relative("tools//build:rules.bzl").unwrap();
    assert_eq!(at, cell);
    assert_eq!(at.repo().name(), "tools");
}

#[test]
fn test_explicit_main_repo() {
    let containing = Label::new_unvalidated(RepoName::from_stripped("other"), "a", "BUCK");
    let label = containing.relative("@//lib:defs.bzl").unwrap();
    assert!(label.repo().is_main());
}

#[test]
fn test_package_shorthand() {
    let label = build_label("").relative("//foo/bar").unwrap();
    assert_eq!(label.package(), "foo/bar");
    assert_eq!(label.name(), "bar");
}

#[test]
fn test_root_package() {
    let label = build_label("pkg").relative("//:defs.bzl").unwrap();
    assert_eq!(label.package(), "");
    assert_eq!(label.to_path_fragment(), PathBuf::from("defs.bzl"));
}

#[test]
fn test_invalid_forms() {
    let base = build_label("pkg");
    assert!(base.relative("").is_err());
    assert!(base.relative("defs.bzl").is_err());
    assert!(base.relative("//pkg/../x:y").is_err());
    assert!(base.relative("//pkg:").is_err());
    assert!(base.relative("//pkg:../y").is_err());
    assert!(base.relative("@bad repo//pkg:y").is_err());
}

proptest! {
    #[test]
    fn prop_relative_name_keeps_package(name in "[a-z][a-z0-9_]{0,8}(\\.bzl)?") {
        let base = build_label("some/pkg");
        let label = base.relative(&format!(":{name}")).unwrap();
        prop_assert_eq!(label.package(), "some/pkg");
        prop_assert_eq!(label.name(), name.as_str());
    }

    #[test]
    fn prop_display_round_trips(pkg in "[a-z]{1,5}(/[a-z]{1,5}){0,2}", name in "[a-z]{1,6}\\.bzl") {
        let base = build_label("");
        let text = format!("//{pkg}:{name}");
        let label = base.relative(&text).unwrap();
        prop_assert_eq!(label.to_string(), text);
    }
}
