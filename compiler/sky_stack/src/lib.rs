//! Stack safety for deep recursion.
//!
//! Extension import chains are resolved on an explicit worklist, but a few
//! walks remain naturally recursive: parsing nested expressions, evaluating
//! nested calls, and the included-files query that walks `load` edges
//! depth-first. Those paths wrap their recursive step in
//! [`ensure_sufficient_stack`] so a deep input grows the stack instead of
//! overflowing it.
//!
//! - **Red zone**: 100KB. Below this much remaining stack, we grow.
//! - **Growth size**: 1MB per growth.

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
///
/// If the remaining stack is below the red zone threshold, additional
/// stack space is allocated before calling `f`.
///
/// ```text
/// fn walk(&self, label: &Label) -> Result<IncludesData, LoaderError> {
///     ensure_sufficient_stack(|| {
///         // ... recurse into each load of `label` ...
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack; call through directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
