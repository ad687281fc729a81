//! Entry point: parse one build file.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use sky_diagnostic::{DiagnosticSink, TracingSink};
use sky_eval::{
    CancellationToken, ConfigReads, ExportOnBind, Interpreter, KnownRuleTypes, LoadedModules,
    ParseContext, Program, ReadConfigContext,
};
use sky_ir::{FileKind, Label, Location, RepoName};

use crate::compiler::SourceCompiler;
use crate::error::{BuildFileParseError, LoaderError, LoaderResult, ParseErrorKind};
use crate::extension::{merge_reads, EvalEnv, ExtensionLoader, ExtensionResult};
use crate::fs::{FileSystem, OsFileSystem};
use crate::glob::FsGlobber;
use crate::implicit::{resolve_implicit, PackageImplicitIncludes};
use crate::includes::{IncludesData, IncludesWalker};
use crate::load::{LoadImport, LoadStack};
use crate::options::LoaderOptions;
use crate::resolver::LabelResolver;
use crate::result::{target_to_json, GlobManifest, ParseResult};
use crate::store::{CacheStore, MemoryStore};

/// Loads build files and everything they import.
///
/// Compiled programs and evaluated extensions are cached by path for the
/// lifetime of the parser: create one parser per snapshot of the source
/// tree. Requests run synchronously; the caches may be shared by parsers
/// on other threads.
pub struct BuildFileParser {
    options: LoaderOptions,
    resolver: LabelResolver,
    implicit: PackageImplicitIncludes,
    fs: Arc<dyn FileSystem>,
    programs: Arc<dyn CacheStore<Arc<Program>>>,
    extensions: Arc<dyn CacheStore<Arc<ExtensionResult>>>,
    includes: DashMap<Label, Arc<IncludesData>>,
    env: EvalEnv,
}

impl BuildFileParser {
    /// Parser over the real file system, reporting diagnostics to `tracing`.
    pub fn new(options: LoaderOptions) -> Self {
        let resolver = LabelResolver::new(
            options.project_root.clone(),
            &options.cell_name,
            options.cell_roots.clone(),
        );
        let implicit = PackageImplicitIncludes::new(options.implicit_includes.clone());
        let env = EvalEnv {
            sink: Arc::new(TracingSink),
            cancel: CancellationToken::new(),
            rules: KnownRuleTypes::new(),
            raw_config: Arc::new(options.raw_config.clone()),
            native_rules: options.native_rules.clone(),
        };
        BuildFileParser {
            options,
            resolver,
            implicit,
            fs: Arc::new(OsFileSystem),
            programs: Arc::new(MemoryStore::new()),
            extensions: Arc::new(MemoryStore::new()),
            includes: DashMap::new(),
            env,
        }
    }

    #[must_use]
    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.env.sink = sink;
        self
    }

    #[must_use]
    pub fn with_program_store(mut self, store: Arc<dyn CacheStore<Arc<Program>>>) -> Self {
        self.programs = store;
        self
    }

    #[must_use]
    pub fn with_extension_store(
        mut self,
        store: Arc<dyn CacheStore<Arc<ExtensionResult>>>,
    ) -> Self {
        self.extensions = store;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.env.cancel = cancel;
        self
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Rule types exported by the extensions loaded so far.
    pub fn known_rule_types(&self) -> &KnownRuleTypes {
        &self.env.rules
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.env.cancel
    }

    fn compiler(&self) -> SourceCompiler<'_> {
        SourceCompiler {
            fs: &*self.fs,
            sink: &*self.env.sink,
            cache: &*self.programs,
        }
    }

    fn extension_loader(&self) -> ExtensionLoader<'_> {
        ExtensionLoader {
            resolver: &self.resolver,
            compiler: self.compiler(),
            store: &*self.extensions,
            env: &self.env,
        }
    }

    /// Package path of the build file at `path`, `/`-separated.
    pub fn base_path(&self, path: &Path) -> LoaderResult<String> {
        let relative = path
            .parent()
            .and_then(|dir| dir.strip_prefix(&self.options.project_root).ok())
            .ok_or_else(|| {
                BuildFileParseError::new(
                    ParseErrorKind::InvalidLabel,
                    format!(
                        "{} is not inside the project root {}",
                        path.display(),
                        self.options.project_root.display()
                    ),
                )
            })?;
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_string_lossy()),
                Component::CurDir => {}
                _ => {
                    return Err(BuildFileParseError::new(
                        ParseErrorKind::InvalidLabel,
                        format!("{} is not a normalized path", path.display()),
                    )
                    .into())
                }
            }
        }
        Ok(segments.join("/"))
    }

    fn build_file_label(&self, base_path: &str) -> Label {
        Label::new_unvalidated(
            RepoName::from_stripped(&self.options.cell_name),
            base_path,
            self.options.build_file_name.clone(),
        )
    }

    /// Evaluate the build file at `path`.
    pub fn parse(&self, path: &Path) -> LoaderResult<ParseResult> {
        let base_path = self.base_path(path)?;
        let label = self.build_file_label(&base_path);
        let stack = LoadStack::top(Location::from_file(path.display().to_string()));
        tracing::debug!(path = %path.display(), %label, "parsing build file");

        let loader = self.extension_loader();
        let implicit = resolve_implicit(&self.implicit, &loader, &base_path, &label, &stack)?;
        let program = self
            .compiler()
            .compile(path, FileKind::Build, &label, &stack)?;
        let dependencies = self.load_dependencies(&loader, &program, &stack)?;

        let mut loaded = LoadedModules::default();
        for (import, extension) in &dependencies {
            loaded.insert(import.clone(), Arc::clone(extension.module()));
        }

        let package_dir = path
            .parent()
            .map_or_else(|| self.options.project_root.clone(), Path::to_path_buf);
        let globber = Arc::new(FsGlobber::new(
            Arc::clone(&self.fs),
            package_dir,
            self.options.build_file_name.clone(),
        ));
        let parse = ParseContext::new(label, globber, implicit.symbols().clone());
        let config = ReadConfigContext::new(Arc::clone(&self.env.raw_config));
        let hook = ExportOnBind::new(&self.env.rules);
        let ctx = self.env.context(&config, &hook, Some(&parse));
        Interpreter::new(&ctx)
            .eval_module(&program, &loaded, implicit.symbols())
            .map_err(|error| {
                let what = format!("file {}", path.display());
                LoaderError::from_eval(&error, path, &what, &LoadStack::empty())
            })?;

        let mut included_files = IndexSet::new();
        included_files.insert(path.to_path_buf());
        let mut config_reads = ConfigReads::new();
        let extensions = implicit
            .extension()
            .into_iter()
            .chain(dependencies.iter().map(|(_, extension)| extension));
        for extension in extensions {
            included_files.extend(extension.closure().iter().cloned());
            merge_reads(&mut config_reads, extension.config_reads());
        }
        merge_reads(&mut config_reads, &config.reads());

        Ok(ParseResult {
            base_path,
            targets: parse.targets().iter().map(target_to_json).collect(),
            globs: parse.globs().into_iter().map(GlobManifest::from).collect(),
            config_reads,
            included_files: included_files.into_iter().collect(),
        })
    }

    /// Every file `parse(path)` would read, sorted, without evaluating the
    /// build file or any extension it imports directly.
    ///
    /// The implicit include is still loaded since its required symbols must
    /// be checked.
    pub fn list_included_files(&self, path: &Path) -> LoaderResult<BTreeSet<PathBuf>> {
        let base_path = self.base_path(path)?;
        let label = self.build_file_label(&base_path);
        let stack = LoadStack::top(Location::from_file(path.display().to_string()));

        let implicit = resolve_implicit(
            &self.implicit,
            &self.extension_loader(),
            &base_path,
            &label,
            &stack,
        )?;
        let program = self
            .compiler()
            .compile(path, FileKind::Build, &label, &stack)?;
        let walker = IncludesWalker {
            resolver: &self.resolver,
            compiler: self.compiler(),
            cache: &self.includes,
        };
        let dependencies = walker.dependencies(&program, &stack)?;

        let mut files = BTreeSet::new();
        files.insert(path.to_path_buf());
        for dependency in &dependencies {
            files.extend(dependency.closure().iter().cloned());
        }
        if let Some(extension) = implicit.extension() {
            files.extend(extension.closure().iter().cloned());
        }
        Ok(files)
    }

    /// Load every distinct import of a build file, in source order.
    fn load_dependencies(
        &self,
        loader: &ExtensionLoader<'_>,
        program: &Program,
        stack: &LoadStack,
    ) -> LoaderResult<Vec<(String, Arc<ExtensionResult>)>> {
        let mut seen = FxHashSet::default();
        let mut dependencies = Vec::new();
        for (load, location) in program.loads() {
            if !seen.insert(load.module.as_str()) {
                continue;
            }
            let import = LoadImport::new(program.label().clone(), load.module.clone(), location.clone());
            let extension = loader.load(import, &stack.child(location))?;
            dependencies.push((load.module.clone(), extension));
        }
        Ok(dependencies)
    }
}
