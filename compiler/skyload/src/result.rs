//! What parsing one build file produces.

use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use sky_eval::value::DictKey;
use sky_eval::{ConfigReads, GlobSpec, TargetEntry, Value};
use sky_stack::ensure_sufficient_stack;

/// Result of [`crate::BuildFileParser::parse`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParseResult {
    /// Package path of the build file relative to the project root.
    pub base_path: String,
    /// Declared targets in declaration order.
    pub targets: Vec<IndexMap<String, serde_json::Value>>,
    pub globs: Vec<GlobManifest>,
    /// Configuration read by the build file and every extension it uses.
    pub config_reads: ConfigReads,
    /// The build file, its implicit include's closure and every direct
    /// import's closure. Any change to one of these files invalidates the
    /// result.
    pub included_files: Vec<PathBuf>,
}

/// One evaluated `glob()` call.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GlobManifest {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub exclude_directories: bool,
}

impl From<GlobSpec> for GlobManifest {
    fn from(spec: GlobSpec) -> Self {
        GlobManifest {
            include: spec.include,
            exclude: spec.exclude,
            exclude_directories: spec.exclude_directories,
        }
    }
}

pub(crate) fn target_to_json(entry: &TargetEntry) -> IndexMap<String, serde_json::Value> {
    entry
        .iter()
        .map(|(name, value)| (name.clone(), to_json(value)))
        .collect()
}

/// JSON form of an attribute value. Functions, rules and other callables
/// are written as their `str()`. A list or dict that contains itself is
/// cut where it loops back, as `"[...]"` or `"{...}"`.
pub fn to_json(value: &Value) -> serde_json::Value {
    to_json_in(value, &mut Vec::new())
}

fn to_json_in(value: &Value, open: &mut Vec<*const ()>) -> serde_json::Value {
    match value {
        Value::None => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(n) => serde_json::Value::from(*n),
        Value::Str(s) => serde_json::Value::String(s.to_string()),
        Value::List(list) => {
            let id = Arc::as_ptr(list).cast::<()>();
            if open.contains(&id) {
                return serde_json::Value::String("[...]".to_string());
            }
            open.push(id);
            let items: serde_json::Value = list
                .snapshot()
                .iter()
                .map(|item| ensure_sufficient_stack(|| to_json_in(item, open)))
                .collect();
            open.pop();
            items
        }
        Value::Dict(dict) => {
            let id = Arc::as_ptr(dict).cast::<()>();
            if open.contains(&id) {
                return serde_json::Value::String("{...}".to_string());
            }
            open.push(id);
            let entries = dict
                .entries()
                .into_iter()
                .map(|(key, value)| {
                    (key_to_string(&key), ensure_sufficient_stack(|| to_json_in(&value, open)))
                })
                .collect();
            open.pop();
            serde_json::Value::Object(entries)
        }
        Value::Struct(fields) => serde_json::Value::Object(
            fields
                .fields()
                .iter()
                .map(|(name, value)| {
                    (name.clone(), ensure_sufficient_stack(|| to_json_in(value, open)))
                })
                .collect(),
        ),
        other => serde_json::Value::String(other.to_string()),
    }
}

fn key_to_string(key: &DictKey) -> String {
    match key {
        DictKey::Str(s) => s.to_string(),
        other => other.to_value().to_string(),
    }
}
