//! Module scopes.
//!
//! A module owns two binding tables:
//! - **globals**: names bound by the module's own top-level statements; these
//!   are the module's exports.
//! - **file locals**: names brought in by `load` and by implicit includes.
//!   They are visible inside the module but never exported from it.
//!
//! After the module body has run, [`Module::freeze`] makes the module and
//! every value reachable from its globals read-only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use sky_ir::{FileKind, Label, SourceInfo};

use crate::errors::{EvalError, EvalResult};
use crate::Value;

pub struct Module {
    label: Label,
    kind: FileKind,
    source: SourceInfo,
    globals: RwLock<IndexMap<String, Value>>,
    file_locals: RwLock<IndexMap<String, Value>>,
    frozen: AtomicBool,
}

impl Module {
    pub fn new(label: Label, kind: FileKind, source: SourceInfo) -> Arc<Self> {
        Arc::new(Module {
            label,
            kind,
            source,
            globals: RwLock::new(IndexMap::new()),
            file_locals: RwLock::new(IndexMap::new()),
            frozen: AtomicBool::new(false),
        })
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    /// Exported binding `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.globals.read().get(name).cloned()
    }

    /// Exported names in binding order.
    pub fn names(&self) -> Vec<String> {
        self.globals.read().keys().cloned().collect()
    }

    /// Copy of the exported bindings in binding order.
    pub fn bindings(&self) -> IndexMap<String, Value> {
        self.globals.read().clone()
    }

    /// Resolve a name the way code inside the module sees it.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.globals.read().get(name) {
            return Some(value.clone());
        }
        self.file_locals.read().get(name).cloned()
    }

    pub(crate) fn set_global(&self, name: &str, value: Value) -> EvalResult<()> {
        self.check_mutable(name)?;
        self.globals.write().insert(name.to_string(), value);
        Ok(())
    }

    pub(crate) fn set_file_local(&self, name: &str, value: Value) -> EvalResult<()> {
        self.check_mutable(name)?;
        self.file_locals.write().insert(name.to_string(), value);
        Ok(())
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Make the module and all values reachable from its globals read-only.
    pub fn freeze(&self) {
        if self.frozen.swap(true, Ordering::AcqRel) {
            return;
        }
        for value in self.globals.read().values() {
            value.freeze();
        }
    }

    fn check_mutable(&self, name: &str) -> EvalResult<()> {
        if self.is_frozen() {
            Err(EvalError::new(format!(
                "cannot bind `{name}`: module {} is frozen",
                self.label
            )))
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("names", &self.names())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}
