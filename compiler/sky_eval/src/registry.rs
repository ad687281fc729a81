//! Registry of user-defined rule types.
//!
//! Every rule exported by an extension is registered under the extension's
//! label. Re-evaluating an extension first drops its previous registrations,
//! so a reload never leaves two conflicting definitions behind.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use sky_ir::Label;

use crate::value::RuleValue;

#[derive(Default)]
pub struct KnownRuleTypes {
    by_label: RwLock<FxHashMap<Label, IndexMap<String, Arc<RuleValue>>>>,
}

impl KnownRuleTypes {
    pub fn new() -> Self {
        KnownRuleTypes::default()
    }

    pub fn register(&self, label: &Label, name: &str, rule: Arc<RuleValue>) {
        tracing::trace!(%label, name, "registering rule type");
        self.by_label
            .write()
            .entry(label.clone())
            .or_default()
            .insert(name.to_string(), rule);
    }

    /// Drop every rule registered under `label`.
    pub fn invalidate(&self, label: &Label) {
        if self.by_label.write().remove(label).is_some() {
            tracing::debug!(%label, "invalidated rule types");
        }
    }

    pub fn get(&self, label: &Label, name: &str) -> Option<Arc<RuleValue>> {
        self.by_label
            .read()
            .get(label)
            .and_then(|rules| rules.get(name))
            .cloned()
    }

    /// Names registered under `label`, in registration order.
    pub fn rule_names(&self, label: &Label) -> Vec<String> {
        self.by_label
            .read()
            .get(label)
            .map(|rules| rules.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_label.read().values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
