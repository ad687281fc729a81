//! Hooks around top-level bindings.

use sky_ir::Label;

use crate::{KnownRuleTypes, Value};

/// Observer of module evaluation.
pub trait BindHook: Send + Sync {
    /// Called before the body of `label` runs.
    fn before_module(&self, _label: &Label) {}

    /// Called after every top-level binding of `name` in `label`.
    fn after_bind(&self, label: &Label, name: &str, value: &Value);
}

/// Export-on-bind: stamps rules and providers with their first top-level
/// name and registers exported rules.
pub struct ExportOnBind<'r> {
    rules: &'r KnownRuleTypes,
}

impl<'r> ExportOnBind<'r> {
    pub fn new(rules: &'r KnownRuleTypes) -> Self {
        ExportOnBind { rules }
    }
}

impl BindHook for ExportOnBind<'_> {
    fn before_module(&self, label: &Label) {
        self.rules.invalidate(label);
    }

    fn after_bind(&self, label: &Label, name: &str, value: &Value) {
        let Some(exportable) = value.as_exportable() else {
            return;
        };
        if !exportable.export(label, name) {
            return;
        }
        tracing::trace!(%label, name, "exported");
        if let Value::Rule(rule) = value {
            self.rules.register(label, name, rule.clone());
        }
    }
}
