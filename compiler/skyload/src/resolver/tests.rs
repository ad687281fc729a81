#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sky_ir::{Label, Location, RepoName};

use super::LabelResolver;
use crate::error::ParseErrorKind;
use crate::load::LoadImport;

fn resolver() -> LabelResolver {
    LabelResolver::new(
        PathBuf::from("/repo"),
        "",
        BTreeMap::from([("third_party".to_string(), PathBuf::from("/tp"))]),
    )
}

fn import_from(package: &str, import: &str) -> LoadImport {
    LoadImport::new(
        Label::new_unvalidated(RepoName::Main, package, "BUCK"),
        import,
        Location::new("/repo/pkg/BUCK", 1, 6),
    )
}

#[test]
fn test_relative_import_stays_in_package() {
    let (label, path) = resolver().resolve(&import_from("pkg", ":sibling")).unwrap();
    assert_eq!(label.to_string(), "//pkg:sibling");
    assert_eq!(path, PathBuf::from("/repo/pkg/sibling"));
}

#[test]
fn test_nested_relative_import_rejected() {
    let error = resolver()
        .resolve(&import_from("pkg", ":nested/sibling"))
        .unwrap_err();
    assert_eq!(error.kind, ParseErrorKind::InvalidRelativeImport);
    assert_eq!(error.location, Some(Location::new("/repo/pkg/BUCK", 1, 6)));
    assert!(error.message.contains("Please use absolute label instead"));
}

#[test]
fn test_absolute_and_named_repositories() {
    let resolver = resolver();
    let (_, path) = resolver.resolve(&import_from("pkg", "//lib/java:defs.bzl")).unwrap();
    assert_eq!(path, PathBuf::from("/repo/lib/java/defs.bzl"));

    let (label, path) = resolver
        .resolve(&import_from("pkg", "@third_party//guava:defs.bzl"))
        .unwrap();
    assert_eq!(label.repo(), &RepoName::from_stripped("third_party"));
    assert_eq!(path, PathBuf::from("/tp/guava/defs.bzl"));

    // Without the `@`.
    let (_, path) = resolver
        .resolve(&import_from("pkg", "third_party//guava:defs.bzl"))
        .unwrap();
    assert_eq!(path, PathBuf::from("/tp/guava/defs.bzl"));
}

#[test]
fn test_unknown_repository() {
    let error = resolver()
        .resolve(&import_from("pkg", "@missing//x:y.bzl"))
        .unwrap_err();
    assert_eq!(error.kind, ParseErrorKind::UnresolvedRepository);
    assert_eq!(
        error.message,
        "@missing//x:y.bzl references an unknown repository @missing"
    );
}

#[test]
fn test_malformed_label() {
    let error = resolver()
        .resolve(&import_from("pkg", "lib:defs.bzl"))
        .unwrap_err();
    assert_eq!(error.kind, ParseErrorKind::InvalidLabel);
    assert!(error
        .message
        .starts_with("Incorrect load location in /repo/pkg/BUCK:1:6: "));
}

#[test]
fn test_cell_name_maps_to_project_root() {
    let resolver = LabelResolver::new(PathBuf::from("/repo"), "main", BTreeMap::new());
    let containing = Label::new_unvalidated(RepoName::from_stripped("main"), "pkg", "BUCK");
    let import = LoadImport::new(containing, "//lib:defs.bzl", Location::builtin());
    let (label, path) = resolver.resolve(&import).unwrap();
    assert_eq!(label.to_string(), "@main//lib:defs.bzl");
    assert_eq!(path, PathBuf::from("/repo/lib/defs.bzl"));
}

proptest! {
    #[test]
    fn prop_absolute_import_joins_root(pkg in "[a-z]{1,5}(/[a-z]{1,5}){0,2}", name in "[a-z]{1,6}\\.bzl") {
        let (_, path) = resolver()
            .resolve(&import_from("other", &format!("//{pkg}:{name}")))
            .unwrap();
        prop_assert_eq!(path, PathBuf::from("/repo").join(&pkg).join(&name));
    }

    #[test]
    fn prop_relative_import_never_leaves_package(name in "[a-z][a-z0-9_]{0,8}(\\.bzl)?") {
        let (label, path) = resolver()
            .resolve(&import_from("a/b", &format!(":{name}")))
            .unwrap();
        prop_assert_eq!(label.package(), "a/b");
        prop_assert_eq!(path.parent(), Some(std::path::Path::new("/repo/a/b")));
    }
}
