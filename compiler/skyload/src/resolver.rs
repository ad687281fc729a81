//! Import string -> file on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sky_ir::{Label, RepoName};

use crate::error::{BuildFileParseError, ParseErrorKind};
use crate::load::LoadImport;

/// Maps labels to paths across the main repository and named ones.
#[derive(Clone, Debug)]
pub struct LabelResolver {
    project_root: PathBuf,
    cell_roots: BTreeMap<String, PathBuf>,
}

impl LabelResolver {
    /// `cell_name`, when set, is registered as a name for `project_root`.
    pub fn new(
        project_root: PathBuf,
        cell_name: &str,
        mut cell_roots: BTreeMap<String, PathBuf>,
    ) -> Self {
        if !cell_name.is_empty() {
            cell_roots
                .entry(cell_name.to_string())
                .or_insert_with(|| project_root.clone());
        }
        LabelResolver {
            project_root,
            cell_roots,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Label and absolute path of the file `import` refers to.
    ///
    /// Nothing is read: an unknown repository fails before any I/O.
    pub fn resolve(&self, import: &LoadImport) -> Result<(Label, PathBuf), BuildFileParseError> {
        if import.is_relative() && import.import().contains('/') {
            return Err(BuildFileParseError::new(
                ParseErrorKind::InvalidRelativeImport,
                format!(
                    "Relative loads work only for files in the same directory but {} is trying \
                     to load a file from a nested directory. Please use absolute label instead \
                     ([cell]//pkg[/pkg]:target).",
                    import.import()
                ),
            )
            .at(import.location().clone()));
        }
        let label = import.label()?.clone();
        let path = self.path_of(&label).ok_or_else(|| {
            BuildFileParseError::new(
                ParseErrorKind::UnresolvedRepository,
                format!(
                    "{} references an unknown repository {}",
                    import.import(),
                    label.repo()
                ),
            )
            .at(import.location().clone())
        })?;
        tracing::trace!(import = import.import(), %label, path = %path.display(), "resolved import");
        Ok((label, path))
    }

    /// Absolute path of `label`, if its repository is known.
    pub fn path_of(&self, label: &Label) -> Option<PathBuf> {
        let root = match label.repo() {
            RepoName::Main => &self.project_root,
            RepoName::Named(name) => self.cell_roots.get(&**name)?,
        };
        Some(root.join(label.to_path_fragment()))
    }
}

#[cfg(test)]
mod tests;
