use super::*;

#[test]
fn test_shallow_recursion() {
    fn depth_of_chain(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { 1 + depth_of_chain(n - 1) })
    }

    assert_eq!(depth_of_chain(16), 16);
}

#[test]
fn test_deep_recursion() {
    // A load chain this deep would overflow a typical 8MB stack without growth
    fn walk(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { walk(n - 1) + 1 })
    }

    assert_eq!(walk(100_000), 100_000);
}

#[test]
fn test_works_with_result_type() {
    let result: Result<&str, String> = ensure_sufficient_stack(|| Ok("//pkg:defs.bzl"));
    assert_eq!(result, Ok("//pkg:defs.bzl"));
}
