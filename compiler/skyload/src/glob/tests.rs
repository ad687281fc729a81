#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sky_eval::Globber;

use super::{matches_segment, matches_segments, FsGlobber};
use crate::fs::MemoryFileSystem;

#[test]
fn test_segment_wildcards() {
    assert!(matches_segment("*.java", "A.java"));
    assert!(matches_segment("*.java", ".java"));
    assert!(!matches_segment("*.java", "A.javac"));
    assert!(matches_segment("a?c", "abc"));
    assert!(!matches_segment("a?c", "ac"));
    assert!(matches_segment("*a*b*", "xxaybzz"));
    assert!(!matches_segment("*a*b*", "xxbyazz"));
    assert!(matches_segment("*", ""));
    assert!(!matches_segment("", "a"));
}

#[test]
fn test_double_star_spans_segments() {
    assert!(matches_segments(&["**", "*.java"], &["A.java"]));
    assert!(matches_segments(&["**", "*.java"], &["a", "b", "A.java"]));
    assert!(matches_segments(&["src", "**"], &["src"]));
    assert!(matches_segments(&["src", "**"], &["src", "x", "y"]));
    assert!(!matches_segments(&["*.java"], &["sub", "A.java"]));
    assert!(!matches_segments(&["src", "*"], &["src"]));
}

fn globber() -> FsGlobber {
    let fs = MemoryFileSystem::new();
    fs.insert("/repo/pkg/BUCK", "");
    fs.insert("/repo/pkg/A.java", "");
    fs.insert("/repo/pkg/A_test.java", "");
    fs.insert("/repo/pkg/res/icon.png", "");
    fs.insert("/repo/pkg/sub/B.java", "");
    fs.insert("/repo/pkg/nested/BUCK", "");
    fs.insert("/repo/pkg/nested/C.java", "");
    FsGlobber::new(Arc::new(fs), PathBuf::from("/repo/pkg"), "BUCK")
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

#[test]
fn test_glob_with_exclude() {
    let found = globber()
        .glob(&strings(&["**/*.java"]), &strings(&["*_test.java"]), true)
        .unwrap();
    assert_eq!(found, strings(&["A.java", "sub/B.java"]));
}

#[test]
fn test_glob_directories() {
    let globber = globber();
    assert_eq!(globber.glob(&strings(&["*"]), &[], true).unwrap(), strings(&["A.java", "A_test.java", "BUCK"]));
    assert_eq!(
        globber.glob(&strings(&["*"]), &strings(&["*.java"]), false).unwrap(),
        strings(&["BUCK", "res", "sub"])
    );
}

#[test]
fn test_glob_missing_root_is_empty() {
    let globber = FsGlobber::new(
        Arc::new(MemoryFileSystem::new()),
        PathBuf::from("/nowhere"),
        "BUCK",
    );
    assert!(globber.glob(&strings(&["**"]), &[], true).unwrap().is_empty());
}

proptest! {
    #[test]
    fn prop_literal_segments_match_themselves(segments in prop::collection::vec("[a-zA-Z0-9_.]{1,8}", 1..4)) {
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        prop_assert!(matches_segments(&segments, &segments));
        prop_assert!(matches_segments(&["**"], &segments));
    }
}
