//! Callable values defined in source.

use std::sync::{Arc, Weak};

use sky_ir::FunctionDef;

use super::Value;
use crate::builtins::Method;
use crate::Module;

/// A `def` function.
///
/// The defining module is held weakly: the module's globals hold the
/// function, so a strong reference would form a cycle. The module is kept
/// alive by whoever holds its result.
pub struct FunctionValue {
    def: Arc<FunctionDef>,
    module: Weak<Module>,
    /// Evaluated default for each parameter, computed at `def` time.
    defaults: Vec<Option<Value>>,
}

impl FunctionValue {
    pub fn new(def: Arc<FunctionDef>, module: &Arc<Module>, defaults: Vec<Option<Value>>) -> Self {
        FunctionValue {
            def,
            module: Arc::downgrade(module),
            defaults,
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn def(&self) -> &FunctionDef {
        &self.def
    }

    pub fn module(&self) -> Option<Arc<Module>> {
        self.module.upgrade()
    }

    pub fn defaults(&self) -> &[Option<Value>] {
        &self.defaults
    }
}

/// A method looked up on a receiver, such as `"a,b".split`.
pub struct BoundMethod {
    pub receiver: Value,
    pub method: Method,
}
