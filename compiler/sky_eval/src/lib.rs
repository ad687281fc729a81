//! Sky Eval - evaluator for build and extension files.
//!
//! # Architecture
//!
//! - [`Program`]: a parsed file bound to its label
//! - [`Interpreter`]: runs a program into a frozen [`Module`]
//! - [`Value`]: runtime values; rules and providers are [`Exportable`]
//! - [`EvalContext`] / [`ParseContext`]: what an evaluation may touch
//! - [`BindHook`]: observes top-level bindings ([`ExportOnBind`] names
//!   exportable values and registers rules in [`KnownRuleTypes`])
//!
//! The evaluator knows nothing about files or label resolution. The loader
//! evaluates dependencies first and passes them in by import string.

mod builtins;
mod cancel;
mod context;
mod errors;
mod hook;
mod interpreter;
mod module;
mod program;
mod registry;
pub mod value;

pub use builtins::{Arguments, Builtin, Method};
pub use cancel::CancellationToken;
pub use context::{
    ConfigReads, EvalContext, GlobSpec, Globber, ParseContext, RawConfig, ReadConfigContext,
    TargetEntry,
};
pub use errors::{BacktraceFrame, EvalError, EvalErrorKind, EvalResult};
pub use hook::{BindHook, ExportOnBind};
pub use interpreter::{Interpreter, LoadedModules};
pub use module::Module;
pub use program::Program;
pub use registry::KnownRuleTypes;
pub use value::{Exportable, ExportedName, Value};
