//! Exportable values: user-defined rules and providers.
//!
//! A rule or provider is created anonymous. The first time it is bound to a
//! top-level name, the module's bind hook stamps it with the module label and
//! that name. The stamp is set once; rebinding the value to another name, in
//! the same module or another one, leaves the original identity in place.

use std::fmt;
use std::sync::OnceLock;

use indexmap::IndexMap;
use sky_ir::Label;

use super::Value;

/// Permanent identity of an exported value.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExportedName {
    label: Label,
    name: String,
}

impl ExportedName {
    pub fn new(label: Label, name: impl Into<String>) -> Self {
        ExportedName {
            label,
            name: name.into(),
        }
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ExportedName {
    /// `//lib:defs.bzl:java_rule`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.label, self.name)
    }
}

/// Rule created by `rule()`.
pub struct RuleValue {
    implementation: Value,
    /// Declared attributes and their defaults.
    attrs: IndexMap<String, Value>,
    doc: String,
    identity: OnceLock<ExportedName>,
}

impl RuleValue {
    pub fn new(implementation: Value, attrs: IndexMap<String, Value>, doc: String) -> Self {
        RuleValue {
            implementation,
            attrs,
            doc,
            identity: OnceLock::new(),
        }
    }

    pub fn implementation(&self) -> &Value {
        &self.implementation
    }

    pub fn attrs(&self) -> &IndexMap<String, Value> {
        &self.attrs
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn exported_name(&self) -> Option<&ExportedName> {
        self.identity.get()
    }
}

/// Provider created by `provider()`.
pub struct ProviderValue {
    /// Allowed fields; `None` accepts any.
    fields: Option<Vec<String>>,
    doc: String,
    identity: OnceLock<ExportedName>,
}

impl ProviderValue {
    pub fn new(fields: Option<Vec<String>>, doc: String) -> Self {
        ProviderValue {
            fields,
            doc,
            identity: OnceLock::new(),
        }
    }

    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn exported_name(&self) -> Option<&ExportedName> {
        self.identity.get()
    }
}

/// The closed set of values that take part in export-on-bind.
#[derive(Copy, Clone)]
pub enum Exportable<'v> {
    Rule(&'v RuleValue),
    Provider(&'v ProviderValue),
}

impl Exportable<'_> {
    fn identity(&self) -> &OnceLock<ExportedName> {
        match self {
            Exportable::Rule(rule) => &rule.identity,
            Exportable::Provider(provider) => &provider.identity,
        }
    }

    pub fn exported_name(&self) -> Option<&ExportedName> {
        self.identity().get()
    }

    pub fn is_exported(&self) -> bool {
        self.exported_name().is_some()
    }

    /// Stamp the identity. Returns `false` if it was already stamped.
    pub fn export(&self, label: &Label, name: &str) -> bool {
        self.identity()
            .set(ExportedName::new(label.clone(), name))
            .is_ok()
    }
}
