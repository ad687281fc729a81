//! Files a build file depends on, without evaluating anything.
//!
//! The query follows `load` edges depth-first. Results are cached per label
//! in a concurrent map, so files shared by many build files are walked
//! once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use sky_eval::Program;
use sky_ir::{FileKind, Label};
use sky_stack::ensure_sufficient_stack;

use crate::compiler::SourceCompiler;
use crate::error::{BuildFileParseError, LoaderResult, ParseErrorKind};
use crate::load::{LoadImport, LoadStack};
use crate::resolver::LabelResolver;

/// Load graph of one extension.
#[derive(Debug)]
pub struct IncludesData {
    path: PathBuf,
    dependencies: Vec<Arc<IncludesData>>,
    closure: IndexSet<PathBuf>,
}

impl IncludesData {
    fn new(path: PathBuf, dependencies: Vec<Arc<IncludesData>>) -> Self {
        let mut closure = IndexSet::new();
        closure.insert(path.clone());
        for dependency in &dependencies {
            closure.extend(dependency.closure.iter().cloned());
        }
        IncludesData {
            path,
            dependencies,
            closure,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dependencies(&self) -> &[Arc<IncludesData>] {
        &self.dependencies
    }

    pub fn closure(&self) -> &IndexSet<PathBuf> {
        &self.closure
    }
}

pub(crate) struct IncludesWalker<'a> {
    pub(crate) resolver: &'a LabelResolver,
    pub(crate) compiler: SourceCompiler<'a>,
    pub(crate) cache: &'a DashMap<Label, Arc<IncludesData>>,
}

impl IncludesWalker<'_> {
    /// Graphs of every distinct import of `program`.
    pub(crate) fn dependencies(
        &self,
        program: &Program,
        stack: &LoadStack,
    ) -> LoaderResult<Vec<Arc<IncludesData>>> {
        let mut active = Vec::new();
        self.walk_dependencies(program, stack, &mut active)
    }

    fn walk_dependencies(
        &self,
        program: &Program,
        stack: &LoadStack,
        active: &mut Vec<Label>,
    ) -> LoaderResult<Vec<Arc<IncludesData>>> {
        let mut seen = FxHashSet::default();
        let mut dependencies = Vec::new();
        for (load, location) in program.loads() {
            if !seen.insert(load.module.as_str()) {
                continue;
            }
            let import = LoadImport::new(program.label().clone(), load.module.clone(), location.clone());
            dependencies.push(self.walk(&import, &stack.child(location), active)?);
        }
        Ok(dependencies)
    }

    fn walk(
        &self,
        import: &LoadImport,
        stack: &LoadStack,
        active: &mut Vec<Label>,
    ) -> LoaderResult<Arc<IncludesData>> {
        let (label, path) = self
            .resolver
            .resolve(import)
            .map_err(|error| error.with_stack(stack))?;
        if let Some(cached) = self.cache.get(&label).map(|entry| Arc::clone(entry.value())) {
            return Ok(cached);
        }
        if let Some(start) = active.iter().position(|l| *l == label) {
            let mut chain: Vec<String> = active[start..].iter().map(ToString::to_string).collect();
            chain.push(label.to_string());
            return Err(BuildFileParseError::new(
                ParseErrorKind::ImportCycle,
                format!("circular import detected: {}", chain.join(" -> ")),
            )
            .at(import.location().clone())
            .with_stack(stack)
            .into());
        }

        let program = self
            .compiler
            .compile(&path, FileKind::Extension, &label, stack)?;
        active.push(label.clone());
        let dependencies =
            ensure_sufficient_stack(|| self.walk_dependencies(&program, stack, active));
        active.pop();

        let data = Arc::new(IncludesData::new(path, dependencies?));
        self.cache.insert(label, Arc::clone(&data));
        Ok(data)
    }
}
