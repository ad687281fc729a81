//! Capabilities handed to an evaluation.
//!
//! [`EvalContext`] is what the interpreter may touch outside the program
//! itself: the diagnostics sink, the cancellation flag, configuration, the
//! rule registry and the bind hook. [`ParseContext`] is present only while a
//! build file is evaluated and collects what that file declares.

use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use sky_diagnostic::DiagnosticSink;
use sky_ir::Label;

use crate::errors::{duplicate_target, EvalResult};
use crate::{BindHook, CancellationToken, KnownRuleTypes, Value};

/// `section -> key -> value`, as read from the tool's configuration files.
pub type RawConfig = BTreeMap<String, BTreeMap<String, String>>;

/// Configuration keys read during evaluation, with the value observed.
pub type ConfigReads = BTreeMap<String, BTreeMap<String, Option<String>>>;

/// Read access to configuration, tracking every key that was read.
pub struct ReadConfigContext {
    raw: Arc<RawConfig>,
    reads: Mutex<ConfigReads>,
}

impl ReadConfigContext {
    pub fn new(raw: Arc<RawConfig>) -> Self {
        ReadConfigContext {
            raw,
            reads: Mutex::new(ConfigReads::new()),
        }
    }

    /// Look up `section.key` and record the read.
    pub fn read(&self, section: &str, key: &str) -> Option<String> {
        let value = self
            .raw
            .get(section)
            .and_then(|entries| entries.get(key))
            .cloned();
        self.reads
            .lock()
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.clone());
        value
    }

    /// Keys read so far.
    pub fn reads(&self) -> ConfigReads {
        self.reads.lock().clone()
    }
}

/// File-name expansion bound to one package directory.
pub trait Globber: Send + Sync {
    /// Paths relative to the package directory, sorted.
    fn glob(
        &self,
        include: &[String],
        exclude: &[String],
        exclude_directories: bool,
    ) -> io::Result<Vec<String>>;
}

/// Arguments of one evaluated `glob()` call.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct GlobSpec {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub exclude_directories: bool,
}

/// Attributes of one declared target, including `name`, `buck.type` and
/// `buck.base_path`.
pub type TargetEntry = IndexMap<String, Value>;

/// Package being evaluated plus what it has declared so far.
pub struct ParseContext {
    label: Label,
    globber: Arc<dyn Globber>,
    /// Implicit-include symbols by local name, for `implicit_package_symbol`.
    implicit_symbols: IndexMap<String, Value>,
    targets: Mutex<IndexMap<String, TargetEntry>>,
    globs: Mutex<Vec<GlobSpec>>,
}

impl ParseContext {
    pub fn new(
        label: Label,
        globber: Arc<dyn Globber>,
        implicit_symbols: IndexMap<String, Value>,
    ) -> Self {
        ParseContext {
            label,
            globber,
            implicit_symbols,
            targets: Mutex::new(IndexMap::new()),
            globs: Mutex::new(Vec::new()),
        }
    }

    /// Label of the build file.
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Package path of the build file, `""` for the repository root.
    pub fn base_path(&self) -> &str {
        self.label.package()
    }

    pub fn implicit_symbol(&self, name: &str) -> Option<&Value> {
        self.implicit_symbols.get(name)
    }

    pub(crate) fn glob(&self, spec: GlobSpec) -> io::Result<Vec<String>> {
        let paths = self
            .globber
            .glob(&spec.include, &spec.exclude, spec.exclude_directories)?;
        self.globs.lock().push(spec);
        Ok(paths)
    }

    pub(crate) fn record_target(&self, name: &str, entry: TargetEntry) -> EvalResult<()> {
        let mut targets = self.targets.lock();
        if targets.contains_key(name) {
            return Err(duplicate_target(name));
        }
        targets.insert(name.to_string(), entry);
        Ok(())
    }

    /// Declared targets in declaration order.
    pub fn targets(&self) -> Vec<TargetEntry> {
        self.targets.lock().values().cloned().collect()
    }

    pub fn globs(&self) -> Vec<GlobSpec> {
        self.globs.lock().clone()
    }
}

/// Everything an evaluation may use beyond the program itself.
pub struct EvalContext<'a> {
    pub sink: &'a dyn DiagnosticSink,
    pub cancel: &'a CancellationToken,
    pub config: &'a ReadConfigContext,
    pub rules: &'a KnownRuleTypes,
    pub hook: &'a dyn BindHook,
    /// Names of rules implemented by the build tool.
    pub native_rules: &'a [String],
    /// Set while a build file is evaluated.
    pub parse: Option<&'a ParseContext>,
}
