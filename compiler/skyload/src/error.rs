//! Loader errors.
//!
//! Everything a user can fix in their files is a [`BuildFileParseError`]
//! with a kind, a display-ready message and the chain of `load` locations
//! that led to it. I/O failures and interruption stay separate so callers
//! can retry them instead of reporting them as configuration mistakes.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use sky_eval::EvalError;
use sky_ir::Location;

use crate::load::LoadStack;

/// What went wrong while loading a build file.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ParseErrorKind {
    FileNotFound,
    SyntaxError,
    /// A construct legal only in extension files appeared in a build file.
    CompileError,
    UnresolvedRepository,
    InvalidRelativeImport,
    InvalidLabel,
    UnsatisfiedSymbol,
    /// A dependency was not evaluated before its dependent. Internal.
    MissingDependency,
    EvaluationError,
    ImportCycle,
}

/// `load` locations from innermost to outermost.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct DependencyStack(Vec<Location>);

impl DependencyStack {
    pub fn locations(&self) -> &[Location] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Location>> for DependencyStack {
    fn from(locations: Vec<Location>) -> Self {
        DependencyStack(locations)
    }
}

impl fmt::Display for DependencyStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for location in &self.0 {
            write!(f, "\n    in {location}")?;
        }
        Ok(())
    }
}

/// A problem in the user's build or extension files.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
#[error("{message}{stack}")]
pub struct BuildFileParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub location: Option<Location>,
    pub stack: DependencyStack,
}

impl BuildFileParseError {
    #[cold]
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        BuildFileParseError {
            kind,
            message: message.into(),
            location: None,
            stack: DependencyStack::default(),
        }
    }

    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach the load chain unless one is already recorded.
    #[must_use]
    pub fn with_stack(mut self, stack: &LoadStack) -> Self {
        if self.stack.is_empty() {
            self.stack = stack.to_dependency_stack();
        }
        self
    }
}

/// Error returned by [`crate::BuildFileParser`].
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error(transparent)]
    Parse(#[from] BuildFileParseError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("loading was interrupted")]
    Interrupted,
}

impl LoaderError {
    /// Kind of the parse error, if this is one.
    pub fn parse_kind(&self) -> Option<ParseErrorKind> {
        match self {
            LoaderError::Parse(error) => Some(error.kind),
            LoaderError::Io { .. } | LoaderError::Interrupted => None,
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        LoaderError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Wrap an evaluator failure of `what` (for example `file /repo/BUCK`).
    ///
    /// Failures caused by I/O or cancellation are unwrapped so they are not
    /// mistaken for mistakes in the evaluated file.
    pub(crate) fn from_eval(error: &EvalError, path: &Path, what: &str, stack: &LoadStack) -> Self {
        if error.is_interrupted() {
            return LoaderError::Interrupted;
        }
        if let Some(source) = error.io_cause() {
            return LoaderError::io(path, source);
        }
        let mut parse = BuildFileParseError::new(
            ParseErrorKind::EvaluationError,
            format!("Cannot evaluate {what}\n{}", error.message_with_stack()),
        )
        .with_stack(stack);
        parse.location = error.location.clone();
        LoaderError::Parse(parse)
    }
}

pub type LoaderResult<T> = Result<T, LoaderError>;
