use std::fmt;

/// Which dialect a source file is parsed and evaluated as.
///
/// Build files declare targets and are checked more strictly; extension
/// files define the functions, rules and constants that build files load.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FileKind {
    /// A package's build description (`BUCK`).
    Build,
    /// A shared module reachable through `load` (`.bzl`).
    Extension,
}

impl FileKind {
    #[inline]
    pub fn is_build(self) -> bool {
        matches!(self, FileKind::Build)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Build => write!(f, "build file"),
            FileKind::Extension => write!(f, "extension file"),
        }
    }
}
