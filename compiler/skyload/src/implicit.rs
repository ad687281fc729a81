//! Package implicit includes.
//!
//! A package subtree can be configured with an extension that every build
//! file in it sees without a `load`. The nearest configured ancestor of a
//! package wins; the empty base path covers the whole repository.

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use sky_eval::Value;
use sky_ir::{Label, Location};

use crate::error::{BuildFileParseError, LoaderResult, ParseErrorKind};
use crate::extension::{ExtensionLoader, ExtensionResult};
use crate::load::{LoadImport, LoadStack};
use crate::options::ImplicitInclude;

/// Implicit-include configuration keyed by package base path.
#[derive(Clone, Debug, Default)]
pub struct PackageImplicitIncludes {
    by_base_path: BTreeMap<String, ImplicitInclude>,
}

impl PackageImplicitIncludes {
    pub fn new(by_base_path: BTreeMap<String, ImplicitInclude>) -> Self {
        PackageImplicitIncludes { by_base_path }
    }

    /// Include configured for `base_path` or its nearest ancestor.
    pub fn find(&self, base_path: &str) -> Option<&ImplicitInclude> {
        let mut current = base_path;
        loop {
            if let Some(include) = self.by_base_path.get(current) {
                return Some(include);
            }
            if current.is_empty() {
                return None;
            }
            current = current.rsplit_once('/').map_or("", |(parent, _)| parent);
        }
    }
}

/// Extension and symbols implicitly available to one build file.
#[derive(Clone, Debug, Default)]
pub struct ImplicitInclusion {
    extension: Option<Arc<ExtensionResult>>,
    /// Local name -> value.
    symbols: IndexMap<String, Value>,
}

impl ImplicitInclusion {
    pub fn extension(&self) -> Option<&Arc<ExtensionResult>> {
        self.extension.as_ref()
    }

    pub fn symbols(&self) -> &IndexMap<String, Value> {
        &self.symbols
    }
}

/// Load the implicit include for a build file in `base_path` and check it
/// exports everything the configuration asks for.
pub(crate) fn resolve_implicit(
    includes: &PackageImplicitIncludes,
    loader: &ExtensionLoader<'_>,
    base_path: &str,
    containing: &Label,
    stack: &LoadStack,
) -> LoaderResult<ImplicitInclusion> {
    let Some(include) = includes.find(base_path) else {
        return Ok(ImplicitInclusion::default());
    };
    tracing::debug!(base_path, include = %include, "loading implicit include");

    let import = LoadImport::new(containing.clone(), include.load_path(), Location::builtin());
    let extension = loader.load(import, &stack.child(Location::builtin()))?;

    let mut symbols = IndexMap::with_capacity(include.symbols().len());
    for (local, remote) in include.symbols() {
        let Some(value) = extension.module().get(remote) else {
            return Err(BuildFileParseError::new(
                ParseErrorKind::UnsatisfiedSymbol,
                format!(
                    "Could not find symbol '{remote}' in implicitly loaded extension '{}'",
                    include.load_path()
                ),
            )
            .with_stack(stack)
            .into());
        };
        symbols.insert(local.clone(), value);
    }

    Ok(ImplicitInclusion {
        extension: Some(extension),
        symbols,
    })
}

#[cfg(test)]
mod tests;
