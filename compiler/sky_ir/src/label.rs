//! Labels: canonical identities of build and extension files.
//!
//! A label is `(repository, package, name)`, written `//pkg/path:name` for
//! the main repository and `@repo//pkg/path:name` (or `repo//pkg/path:name`)
//! for a named one. Loads name their target with a label string that is
//! interpreted relative to the label of the file containing the `load`.
//!
//! # Relative forms
//!
//! - `:name` stays in the containing repository and package.
//! - `//pkg:name` stays in the containing repository.
//! - `@repo//pkg:name` / `repo//pkg:name` switch repository; `@//pkg:name`
//!   names the main repository explicitly.
//!
//! Whether a relative name may contain `/` is a loader policy, not a label
//! syntax rule, so `:a/b.bzl` parses here and is rejected by the loader.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Repository part of a label.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
pub enum RepoName {
    /// The repository the loader was configured with as its project root.
    Main,
    /// A named external repository (stored without the `@`).
    Named(Arc<str>),
}

impl RepoName {
    /// Build a repository name from a stripped name; the empty name is main.
    pub fn from_stripped(name: &str) -> Self {
        if name.is_empty() {
            RepoName::Main
        } else {
            RepoName::Named(Arc::from(name))
        }
    }

    #[inline]
    pub fn is_main(&self) -> bool {
        matches!(self, RepoName::Main)
    }

    /// Name without the `@` prefix (empty for main).
    pub fn name(&self) -> &str {
        match self {
            RepoName::Main => "",
            RepoName::Named(name) => name,
        }
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoName::Main => Ok(()),
            RepoName::Named(name) => write!(f, "@{name}"),
        }
    }
}

/// Malformed label text.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct LabelError {
    message: String,
}

impl LabelError {
    #[cold]
    fn new(message: impl Into<String>) -> Self {
        LabelError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for LabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LabelError {}

/// Canonical identity of a source file.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
pub struct Label {
    repo: RepoName,
    package: String,
    name: String,
}

impl Label {
    /// Create a validated label.
    pub fn new(
        repo: RepoName,
        package: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, LabelError> {
        let package = package.into();
        let name = name.into();
        validate_package(&package)?;
        validate_name(&name)?;
        Ok(Label {
            repo,
            package,
            name,
        })
    }

    /// Create a label from parts already known to be well-formed, such as
    /// a package path computed from a build file's location on disk.
    pub fn new_unvalidated(
        repo: RepoName,
        package: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Label {
            repo,
            package: package.into(),
            name: name.into(),
        }
    }

    pub fn repo(&self) -> &RepoName {
        &self.repo
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `package/name` relative to the repository root.
    pub fn to_path_fragment(&self) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in self.package.split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        for segment in self.name.split('/') {
            path.push(segment);
        }
        path
    }

    /// Interpret `text` relative to this label.
    pub fn relative(&self, text: &str) -> Result<Label, LabelError> {
        if text.is_empty() {
            return Err(LabelError::new("empty label"));
        }

        if let Some(name) = text.strip_prefix(':') {
            return Label::new(self.repo.clone(), self.package.clone(), name);
        }

        let Some(slashes) = text.find("//") else {
            return Err(LabelError::new(format!(
                "invalid label '{text}': expected '//', '@repo//', 'repo//' or ':' prefix"
            )));
        };

        let prefix = &text[..slashes];
        let repo = if prefix.is_empty() {
            self.repo.clone()
        } else if let Some(stripped) = prefix.strip_prefix('@') {
            validate_repo_name(stripped, text)?;
            RepoName::from_stripped(stripped)
        } else {
            validate_repo_name(prefix, text)?;
            RepoName::from_stripped(prefix)
        };

        let rest = &text[slashes + 2..];
        let (package, name) = match rest.split_once(':') {
            Some((package, name)) => (package, name),
            // `//foo/bar` is shorthand for `//foo/bar:bar`
            None => (rest, rest.rsplit('/').next().unwrap_or(rest)),
        };

        Label::new(repo, package, name)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}//{}:{}", self.repo, self.package, self.name)
    }
}

fn validate_repo_name(name: &str, text: &str) -> Result<(), LabelError> {
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(LabelError::new(format!(
            "invalid repository name '{name}' in label '{text}'"
        )))
    }
}

fn validate_package(package: &str) -> Result<(), LabelError> {
    if package.is_empty() {
        return Ok(());
    }
    if package.starts_with('/') || package.ends_with('/') {
        return Err(LabelError::new(format!(
            "invalid package name '{package}': must not begin or end with '/'"
        )));
    }
    for segment in package.split('/') {
        if segment.is_empty() {
            return Err(LabelError::new(format!(
                "invalid package name '{package}': contains '//'"
            )));
        }
        if segment == "." || segment == ".." {
            return Err(LabelError::new(format!(
                "invalid package name '{package}': contains up-level references"
            )));
        }
        if segment.contains(':') {
            return Err(LabelError::new(format!(
                "invalid package name '{package}': contains ':'"
            )));
        }
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), LabelError> {
    if name.is_empty() {
        return Err(LabelError::new("empty target name"));
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err(LabelError::new(format!(
            "invalid target name '{name}': must not begin or end with '/'"
        )));
    }
    for segment in name.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(LabelError::new(format!(
                "invalid target name '{name}': contains empty or up-level segment"
            )));
        }
    }
    if name.contains(':') {
        return Err(LabelError::new(format!(
            "invalid target name '{name}': contains ':'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
