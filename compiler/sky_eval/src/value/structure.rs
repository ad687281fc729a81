//! Immutable records created by `struct()` and by calling a provider.

use std::sync::Arc;

use indexmap::IndexMap;

use super::{ProviderValue, Value};

pub struct StructValue {
    fields: IndexMap<String, Value>,
    /// Provider that created this instance; `None` for plain `struct()`.
    provider: Option<Arc<ProviderValue>>,
}

impl StructValue {
    pub fn new(fields: IndexMap<String, Value>) -> Self {
        StructValue {
            fields,
            provider: None,
        }
    }

    pub fn from_provider(provider: Arc<ProviderValue>, fields: IndexMap<String, Value>) -> Self {
        StructValue {
            fields,
            provider: Some(provider),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    pub fn provider(&self) -> Option<&Arc<ProviderValue>> {
        self.provider.as_ref()
    }

    /// `struct`, or the provider's exported name.
    pub fn constructor_name(&self) -> String {
        self.provider
            .as_ref()
            .and_then(|provider| provider.exported_name())
            .map_or_else(|| "struct".to_string(), |name| name.name().to_string())
    }

    pub fn freeze(&self) {
        for value in self.fields.values() {
            value.freeze();
        }
    }
}
