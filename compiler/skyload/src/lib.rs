//! Skyload - loads build files and the extensions they import.
//!
//! # Architecture
//!
//! ```text
//! BuildFileParser::parse(path)
//!     │
//!     ├── implicit include ──► ExtensionLoader
//!     ├── SourceCompiler (read, parse, check, cache by path)
//!     ├── load(...) edges ───► ExtensionLoader (worklist, cache by path)
//!     │                            └── LabelResolver, SourceCompiler, Interpreter
//!     ▼
//! Interpreter (build file) ──► ParseResult
//! ```
//!
//! Every extension is compiled and evaluated at most once per parser. The
//! `included_files` of a [`ParseResult`] is the invalidation key: a change
//! to any file in it must trigger a re-parse.

mod compiler;
mod error;
mod extension;
mod fs;
mod glob;
mod implicit;
mod includes;
mod load;
mod options;
mod parser;
mod resolver;
mod result;
mod store;

use std::sync::Once;

pub use error::{BuildFileParseError, DependencyStack, LoaderError, LoaderResult, ParseErrorKind};
pub use extension::ExtensionResult;
pub use fs::{DirEntry, FileSystem, MemoryFileSystem, OsFileSystem};
pub use glob::FsGlobber;
pub use implicit::{ImplicitInclusion, PackageImplicitIncludes};
pub use includes::IncludesData;
pub use load::{LoadImport, LoadStack};
pub use options::{
    ConfigError, ImplicitInclude, ImplicitIncludeConfig, LoaderConfig, LoaderOptions,
    DEFAULT_BUILD_FILE_NAME, DEFAULT_NATIVE_RULES,
};
pub use parser::BuildFileParser;
pub use resolver::LabelResolver;
pub use result::{to_json, GlobManifest, ParseResult};
pub use store::{CacheStats, CacheStore, MemoryStore};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset, and nothing after the first call.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
