//! Read, parse, validate and cache one file.

use std::io;
use std::path::Path;
use std::sync::Arc;

use sky_diagnostic::{replay, DiagnosticSink};
use sky_eval::Program;
use sky_ir::{FileKind, Label, SourceInfo};

use crate::error::{BuildFileParseError, LoaderError, LoaderResult, ParseErrorKind};
use crate::fs::FileSystem;
use crate::load::LoadStack;
use crate::store::CacheStore;

pub(crate) struct SourceCompiler<'a> {
    pub(crate) fs: &'a dyn FileSystem,
    pub(crate) sink: &'a dyn DiagnosticSink,
    pub(crate) cache: &'a dyn CacheStore<Arc<Program>>,
}

impl SourceCompiler<'_> {
    /// Compiled program for `path`, read at most once per cache.
    ///
    /// Problems found while parsing go to the sink before the error is
    /// returned.
    pub(crate) fn compile(
        &self,
        path: &Path,
        kind: FileKind,
        label: &Label,
        stack: &LoadStack,
    ) -> LoaderResult<Arc<Program>> {
        if let Some(program) = self.cache.get(path) {
            tracing::trace!(path = %path.display(), "program cache hit");
            return Ok(program);
        }

        tracing::debug!(path = %path.display(), ?kind, "compiling");
        let text = match self.fs.read(path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(BuildFileParseError::new(
                    ParseErrorKind::FileNotFound,
                    format!("{} cannot be loaded because it does not exist", path.display()),
                )
                .with_stack(stack)
                .into());
            }
            Err(error) => return Err(LoaderError::io(path, error)),
        };

        let source = SourceInfo::new(path.display().to_string(), &text);
        let parsed = sky_parse::parse(&text);
        replay(self.sink, &parsed.diagnostics(&source));
        if parsed.has_errors() {
            return Err(cannot_parse(ParseErrorKind::SyntaxError, path, stack));
        }

        if kind == FileKind::Build {
            let errors = sky_parse::check_build_syntax(&parsed.stmts);
            if !errors.is_empty() {
                let diagnostics: Vec<_> = errors
                    .iter()
                    .map(|error| error.to_diagnostic(&source))
                    .collect();
                replay(self.sink, &diagnostics);
                return Err(cannot_parse(ParseErrorKind::CompileError, path, stack));
            }
        }

        let program = Program::new(label.clone(), kind, source, parsed.stmts);
        self.cache.insert(path.to_path_buf(), Arc::clone(&program));
        Ok(program)
    }
}

fn cannot_parse(kind: ParseErrorKind, path: &Path, stack: &LoadStack) -> LoaderError {
    BuildFileParseError::new(kind, format!("Cannot parse {}", path.display()))
        .with_stack(stack)
        .into()
}
