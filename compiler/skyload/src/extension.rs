//! Extension loading.
//!
//! Imports are resolved on an explicit last-in-first-out worklist instead of
//! by recursion, so deep import chains cost heap, not stack. Each item is
//! compiled once, pushes the dependencies that are not cached yet, and is
//! evaluated once all of them have been. A dependency reached along several
//! paths is found in the result store the second time and reused.
//!
//! Items on the worklist whose program is compiled are exactly the ancestors
//! of the item on top: a new dependency matching one of them is a cycle.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;
use sky_diagnostic::DiagnosticSink;
use sky_eval::{
    BindHook, CancellationToken, ConfigReads, EvalContext, ExportOnBind, Interpreter,
    KnownRuleTypes, LoadedModules, Module, ParseContext, Program, RawConfig, ReadConfigContext,
};
use sky_ir::{FileKind, Label};

use crate::compiler::SourceCompiler;
use crate::error::{BuildFileParseError, LoaderError, LoaderResult, ParseErrorKind};
use crate::load::{LoadImport, LoadStack};
use crate::resolver::LabelResolver;
use crate::store::CacheStore;

/// A fully loaded extension. Never changes once built.
#[derive(Debug)]
pub struct ExtensionResult {
    label: Label,
    path: PathBuf,
    module: Arc<Module>,
    dependencies: Vec<Arc<ExtensionResult>>,
    /// Own path first, then each dependency's closure in import order.
    closure: IndexSet<PathBuf>,
    /// Configuration read while evaluating this file and its dependencies.
    config_reads: ConfigReads,
}

impl ExtensionResult {
    fn new(
        label: Label,
        path: PathBuf,
        module: Arc<Module>,
        dependencies: Vec<Arc<ExtensionResult>>,
        own_reads: &ConfigReads,
    ) -> Self {
        let mut closure = IndexSet::new();
        closure.insert(path.clone());
        let mut config_reads = ConfigReads::new();
        for dependency in &dependencies {
            closure.extend(dependency.closure.iter().cloned());
            merge_reads(&mut config_reads, &dependency.config_reads);
        }
        merge_reads(&mut config_reads, own_reads);
        ExtensionResult {
            label,
            path,
            module,
            dependencies,
            closure,
            config_reads,
        }
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn module(&self) -> &Arc<Module> {
        &self.module
    }

    pub fn dependencies(&self) -> &[Arc<ExtensionResult>] {
        &self.dependencies
    }

    /// Every file read to produce this result, this one included.
    pub fn closure(&self) -> &IndexSet<PathBuf> {
        &self.closure
    }

    pub fn config_reads(&self) -> &ConfigReads {
        &self.config_reads
    }
}

pub(crate) fn merge_reads(into: &mut ConfigReads, from: &ConfigReads) {
    for (section, keys) in from {
        let entries = into.entry(section.clone()).or_default();
        for (key, value) in keys {
            entries.insert(key.clone(), value.clone());
        }
    }
}

/// What every evaluation shares, owned by the parser.
pub(crate) struct EvalEnv {
    pub(crate) sink: Arc<dyn DiagnosticSink>,
    pub(crate) cancel: CancellationToken,
    pub(crate) rules: KnownRuleTypes,
    pub(crate) raw_config: Arc<RawConfig>,
    pub(crate) native_rules: Vec<String>,
}

impl EvalEnv {
    pub(crate) fn context<'a>(
        &'a self,
        config: &'a ReadConfigContext,
        hook: &'a dyn BindHook,
        parse: Option<&'a ParseContext>,
    ) -> EvalContext<'a> {
        EvalContext {
            sink: &*self.sink,
            cancel: &self.cancel,
            config,
            rules: &self.rules,
            hook,
            native_rules: &self.native_rules,
            parse,
        }
    }
}

/// One pending import on the worklist.
struct LoadState {
    import: LoadImport,
    label: Label,
    path: PathBuf,
    stack: LoadStack,
    program: Option<Arc<Program>>,
    /// Direct imports of this file with their resolved paths, first
    /// occurrence of each import string only.
    dependencies: Vec<(LoadImport, PathBuf)>,
}

impl LoadState {
    fn new(import: LoadImport, label: Label, path: PathBuf, stack: LoadStack) -> Self {
        LoadState {
            import,
            label,
            path,
            stack,
            program: None,
            dependencies: Vec::new(),
        }
    }
}

pub(crate) struct ExtensionLoader<'a> {
    pub(crate) resolver: &'a LabelResolver,
    pub(crate) compiler: SourceCompiler<'a>,
    pub(crate) store: &'a dyn CacheStore<Arc<ExtensionResult>>,
    pub(crate) env: &'a EvalEnv,
}

impl ExtensionLoader<'_> {
    /// Load `import` and everything it transitively imports.
    ///
    /// `stack` is the chain of loads that led to `import`, ending with its
    /// own location.
    pub(crate) fn load(
        &self,
        import: LoadImport,
        stack: &LoadStack,
    ) -> LoaderResult<Arc<ExtensionResult>> {
        let (label, path) = self
            .resolver
            .resolve(&import)
            .map_err(|error| error.with_stack(stack))?;
        let mut work = vec![LoadState::new(import, label, path, stack.clone())];
        let mut answer = None;

        while let Some(top) = work.last_mut() {
            if self.env.cancel.is_cancelled() {
                return Err(LoaderError::Interrupted);
            }
            if let Some(done) = self.store.get(&top.path) {
                tracing::trace!(path = %top.path.display(), "extension already loaded");
                work.pop();
                answer = Some(done);
                continue;
            }

            let program = match &top.program {
                Some(program) => Arc::clone(program),
                None => {
                    let (program, pending) = self.compile_state(top)?;
                    if !pending.is_empty() {
                        check_cycles(&work, &pending)?;
                        tracing::trace!(pending = pending.len(), depth = work.len(), "pushing imports");
                        work.extend(pending);
                        continue;
                    }
                    program
                }
            };

            let Some(state) = work.pop() else {
                break;
            };
            answer = Some(self.evaluate(state, &program)?);
        }

        answer.ok_or_else(|| {
            BuildFileParseError::new(
                ParseErrorKind::MissingDependency,
                "extension worklist finished without a result",
            )
            .with_stack(stack)
            .into()
        })
    }

    /// Compile `state` and return the states for its imports that still
    /// need loading, first import on top.
    fn compile_state(&self, state: &mut LoadState) -> LoaderResult<(Arc<Program>, Vec<LoadState>)> {
        let program = self.compiler.compile(
            &state.path,
            FileKind::Extension,
            &state.label,
            &state.stack,
        )?;

        let mut seen = FxHashSet::default();
        let mut pending = Vec::new();
        for (load, location) in program.loads() {
            if !seen.insert(load.module.as_str()) {
                continue;
            }
            let dependency = LoadImport::new(state.label.clone(), load.module.clone(), location.clone());
            let dependency_stack = state.stack.child(location);
            let (label, path) = self
                .resolver
                .resolve(&dependency)
                .map_err(|error| error.with_stack(&dependency_stack))?;
            if self.store.get(&path).is_none() {
                pending.push(LoadState::new(
                    dependency.clone(),
                    label,
                    path.clone(),
                    dependency_stack,
                ));
            }
            state.dependencies.push((dependency, path));
        }
        pending.reverse();
        state.program = Some(Arc::clone(&program));
        Ok((program, pending))
    }

    fn evaluate(&self, state: LoadState, program: &Program) -> LoaderResult<Arc<ExtensionResult>> {
        let mut loaded = LoadedModules::default();
        let mut dependencies = Vec::with_capacity(state.dependencies.len());
        for (dependency, path) in &state.dependencies {
            let Some(result) = self.store.get(path) else {
                return Err(BuildFileParseError::new(
                    ParseErrorKind::MissingDependency,
                    format!(
                        "Cannot evaluate extension file {}; missing dependency is {}",
                        state.label,
                        dependency.import()
                    ),
                )
                .with_stack(&state.stack)
                .into());
            };
            loaded.insert(dependency.import().to_string(), Arc::clone(result.module()));
            dependencies.push(result);
        }

        let config = ReadConfigContext::new(Arc::clone(&self.env.raw_config));
        let hook = ExportOnBind::new(&self.env.rules);
        let ctx = self.env.context(&config, &hook, None);
        let module = Interpreter::new(&ctx)
            .eval_module(program, &loaded, &IndexMap::new())
            .map_err(|error| {
                let what = format!(
                    "extension {} referenced from {}",
                    state.label,
                    state.import.containing()
                );
                LoaderError::from_eval(&error, &state.path, &what, &state.stack)
            })?;

        let result = Arc::new(ExtensionResult::new(
            state.label,
            state.path.clone(),
            module,
            dependencies,
            &config.reads(),
        ));
        self.store.insert(state.path, Arc::clone(&result));
        Ok(result)
    }
}

/// Fail if any of `pending` is already being loaded further down the chain.
fn check_cycles(work: &[LoadState], pending: &[LoadState]) -> LoaderResult<()> {
    for dependency in pending {
        let Some(start) = work
            .iter()
            .position(|state| state.program.is_some() && state.path == dependency.path)
        else {
            continue;
        };
        let mut chain: Vec<String> = work[start..]
            .iter()
            .filter(|state| state.program.is_some())
            .map(|state| state.label.to_string())
            .collect();
        chain.push(dependency.label.to_string());
        return Err(BuildFileParseError::new(
            ParseErrorKind::ImportCycle,
            format!("circular import detected: {}", chain.join(" -> ")),
        )
        .at(dependency.import.location().clone())
        .with_stack(&dependency.stack)
        .into());
    }
    Ok(())
}
