#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use super::PackageImplicitIncludes;
use crate::options::ImplicitInclude;

fn includes(entries: &[(&str, &str)]) -> PackageImplicitIncludes {
    PackageImplicitIncludes::new(
        entries
            .iter()
            .map(|(base, text)| ((*base).to_string(), ImplicitInclude::parse(text).unwrap()))
            .collect::<BTreeMap<_, _>>(),
    )
}

#[test]
fn test_nearest_ancestor_wins() {
    let includes = includes(&[
        ("", "//tools:root.bzl::ROOT"),
        ("java", "//tools:java.bzl::JAVA"),
        ("java/android", "//tools:android.bzl::ANDROID"),
    ]);
    let load_path = |base: &str| includes.find(base).map(ImplicitInclude::load_path);

    assert_eq!(load_path("java/android/app"), Some("//tools:android.bzl"));
    assert_eq!(load_path("java/server"), Some("//tools:java.bzl"));
    assert_eq!(load_path("java"), Some("//tools:java.bzl"));
    assert_eq!(load_path("cxx"), Some("//tools:root.bzl"));
    assert_eq!(load_path(""), Some("//tools:root.bzl"));
}

#[test]
fn test_prefix_is_not_an_ancestor() {
    let includes = includes(&[("java", "//tools:java.bzl::JAVA")]);
    assert!(includes.find("javascript").is_none());
    assert!(includes.find("").is_none());
}
