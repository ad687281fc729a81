//! Loader configuration.
//!
//! [`LoaderOptions`] is what a [`crate::BuildFileParser`] is built from.
//! [`LoaderConfig`] is its JSON form, read by the CLI's `--config` flag.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use sky_eval::RawConfig;

/// Rules provided by the build tool itself.
pub const DEFAULT_NATIVE_RULES: &[&str] = &[
    "genrule",
    "export_file",
    "filegroup",
    "sh_binary",
    "sh_test",
    "cxx_library",
    "java_library",
    "python_library",
];

pub const DEFAULT_BUILD_FILE_NAME: &str = "BUCK";

/// Extension loaded into every build file of a package subtree, with the
/// symbols it must export.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ImplicitInclude {
    load_path: String,
    /// Local name -> name exported by the extension.
    symbols: IndexMap<String, String>,
}

impl ImplicitInclude {
    pub fn new(load_path: impl Into<String>, symbols: IndexMap<String, String>) -> Self {
        ImplicitInclude {
            load_path: load_path.into(),
            symbols,
        }
    }

    /// Parse `//pkg:file.bzl::sym::local=remote`.
    ///
    /// A bare symbol is bound under its own name.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut parts = text.split("::");
        let load_path = parts.next().unwrap_or_default().trim();
        if load_path.is_empty() {
            return Err(format!("implicit include '{text}' has no load path"));
        }
        let mut symbols = IndexMap::new();
        for part in parts {
            let (local, remote) = match part.split_once('=') {
                Some((local, remote)) => (local.trim(), remote.trim()),
                None => (part.trim(), part.trim()),
            };
            if local.is_empty() || remote.is_empty() {
                return Err(format!("implicit include '{text}' has an empty symbol"));
            }
            symbols.insert(local.to_string(), remote.to_string());
        }
        if symbols.is_empty() {
            return Err(format!("implicit include '{text}' names no symbols"));
        }
        Ok(ImplicitInclude::new(load_path, symbols))
    }

    pub fn load_path(&self) -> &str {
        &self.load_path
    }

    pub fn symbols(&self) -> &IndexMap<String, String> {
        &self.symbols
    }
}

impl fmt::Display for ImplicitInclude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.load_path)?;
        for (local, remote) in &self.symbols {
            if local == remote {
                write!(f, "::{local}")?;
            } else {
                write!(f, "::{local}={remote}")?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct LoaderOptions {
    /// Root of the main repository.
    pub project_root: PathBuf,
    /// Name of the main repository, empty when it has none.
    pub cell_name: String,
    /// Named repository -> root.
    pub cell_roots: BTreeMap<String, PathBuf>,
    /// Package base path -> implicit include. `""` covers every package.
    pub implicit_includes: BTreeMap<String, ImplicitInclude>,
    pub raw_config: RawConfig,
    pub native_rules: Vec<String>,
    pub build_file_name: String,
}

impl LoaderOptions {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        LoaderOptions {
            project_root: project_root.into(),
            cell_name: String::new(),
            cell_roots: BTreeMap::new(),
            implicit_includes: BTreeMap::new(),
            raw_config: RawConfig::new(),
            native_rules: DEFAULT_NATIVE_RULES.iter().map(ToString::to_string).collect(),
            build_file_name: DEFAULT_BUILD_FILE_NAME.to_string(),
        }
    }

    #[must_use]
    pub fn with_cell_name(mut self, name: impl Into<String>) -> Self {
        self.cell_name = name.into();
        self
    }

    #[must_use]
    pub fn with_cell_root(mut self, name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.cell_roots.insert(name.into(), root.into());
        self
    }

    #[must_use]
    pub fn with_implicit_include(
        mut self,
        base_path: impl Into<String>,
        include: ImplicitInclude,
    ) -> Self {
        self.implicit_includes.insert(base_path.into(), include);
        self
    }

    #[must_use]
    pub fn with_config(mut self, section: &str, key: &str, value: &str) -> Self {
        self.raw_config
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_native_rules(mut self, rules: Vec<String>) -> Self {
        self.native_rules = rules;
        self
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid implicit include for '{base_path}': {message}")]
    ImplicitInclude { base_path: String, message: String },
}

/// Implicit include as written in JSON: either the `::` text form or
/// `{ "load_path": ..., "symbols": { local: remote } }`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ImplicitIncludeConfig {
    Text(String),
    Structured {
        load_path: String,
        symbols: IndexMap<String, String>,
    },
}

/// JSON form of [`LoaderOptions`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderConfig {
    #[serde(default)]
    pub project_root: Option<PathBuf>,
    #[serde(default)]
    pub cell_name: String,
    #[serde(default)]
    pub cell_roots: BTreeMap<String, PathBuf>,
    #[serde(default)]
    pub implicit_includes: BTreeMap<String, ImplicitIncludeConfig>,
    #[serde(default)]
    pub config: RawConfig,
    #[serde(default)]
    pub native_rules: Option<Vec<String>>,
    #[serde(default)]
    pub build_file_name: Option<String>,
}

impl LoaderConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Resolve into options. Relative roots are taken relative to
    /// `default_root`, which is also the project root when none is given.
    pub fn into_options(self, default_root: &Path) -> Result<LoaderOptions, ConfigError> {
        let project_root = match self.project_root {
            Some(root) => default_root.join(root),
            None => default_root.to_path_buf(),
        };
        let mut options = LoaderOptions::new(project_root).with_cell_name(self.cell_name);
        for (name, root) in self.cell_roots {
            options.cell_roots.insert(name, default_root.join(root));
        }
        for (base_path, include) in self.implicit_includes {
            let include = match include {
                ImplicitIncludeConfig::Text(text) => ImplicitInclude::parse(&text)
                    .map_err(|message| ConfigError::ImplicitInclude {
                        base_path: base_path.clone(),
                        message,
                    })?,
                ImplicitIncludeConfig::Structured { load_path, symbols } => {
                    ImplicitInclude::new(load_path, symbols)
                }
            };
            options.implicit_includes.insert(base_path, include);
        }
        options.raw_config = self.config;
        if let Some(rules) = self.native_rules {
            options.native_rules = rules;
        }
        if let Some(name) = self.build_file_name {
            options.build_file_name = name;
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests;
