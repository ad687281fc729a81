//! Mutable containers: lists and dicts.
//!
//! Both stay mutable while their module executes and become read-only when
//! it is frozen. Freezing is one-way and idempotent, which also stops it
//! from looping on a list that contains itself.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::Value;
use crate::errors::{frozen_mutation, type_mismatch, EvalResult};

pub struct ListValue {
    items: RwLock<Vec<Value>>,
    frozen: AtomicBool,
}

impl ListValue {
    pub fn new(items: Vec<Value>) -> Self {
        ListValue {
            items: RwLock::new(items),
            frozen: AtomicBool::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Copy of the current elements.
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.read().clone()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.read().get(index).cloned()
    }

    pub fn push(&self, value: Value) -> EvalResult<()> {
        self.check_mutable()?;
        self.items.write().push(value);
        Ok(())
    }

    pub fn extend(&self, values: Vec<Value>) -> EvalResult<()> {
        self.check_mutable()?;
        self.items.write().extend(values);
        Ok(())
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    pub fn freeze(&self) {
        if self.frozen.swap(true, Ordering::AcqRel) {
            return;
        }
        for item in self.snapshot() {
            item.freeze();
        }
    }

    fn check_mutable(&self) -> EvalResult<()> {
        if self.is_frozen() {
            Err(frozen_mutation("list"))
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for ListValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.snapshot()).finish()
    }
}

/// Hashable values usable as dict keys.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum DictKey {
    None,
    Bool(bool),
    Int(i64),
    Str(Arc<str>),
}

impl DictKey {
    pub fn from_value(value: &Value) -> EvalResult<Self> {
        match value {
            Value::None => Ok(DictKey::None),
            Value::Bool(b) => Ok(DictKey::Bool(*b)),
            Value::Int(n) => Ok(DictKey::Int(*n)),
            Value::Str(s) => Ok(DictKey::Str(Arc::clone(s))),
            other => Err(type_mismatch("hashable dict key", other.type_name())),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            DictKey::None => Value::None,
            DictKey::Bool(b) => Value::Bool(*b),
            DictKey::Int(n) => Value::Int(*n),
            DictKey::Str(s) => Value::Str(Arc::clone(s)),
        }
    }
}

impl From<&str> for DictKey {
    fn from(s: &str) -> Self {
        DictKey::Str(Arc::from(s))
    }
}

/// Insertion-ordered dict.
pub struct DictValue {
    entries: RwLock<IndexMap<DictKey, Value>>,
    frozen: AtomicBool,
}

impl DictValue {
    pub fn new(entries: IndexMap<DictKey, Value>) -> Self {
        DictValue {
            entries: RwLock::new(entries),
            frozen: AtomicBool::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn get(&self, key: &DictKey) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }

    pub fn contains_key(&self, key: &DictKey) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn keys(&self) -> Vec<Value> {
        self.entries.read().keys().map(DictKey::to_value).collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.read().values().cloned().collect()
    }

    /// Copy of the current entries in insertion order.
    pub fn entries(&self) -> Vec<(DictKey, Value)> {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn insert(&self, key: DictKey, value: Value) -> EvalResult<()> {
        if self.is_frozen() {
            return Err(frozen_mutation("dict"));
        }
        self.entries.write().insert(key, value);
        Ok(())
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    pub fn freeze(&self) {
        if self.frozen.swap(true, Ordering::AcqRel) {
            return;
        }
        for value in self.values() {
            value.freeze();
        }
    }
}

impl fmt::Debug for DictValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}
