//! Metadata values, ordered metadata maps, and initial packet payloads.

use core::any::Any;
use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A single metadata (or graph property) value.
///
/// Scalars get their own variants; arrays, objects and `null` are kept
/// verbatim as a blob so they survive a round-trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Number(Number),
    String(String),
    Blob(Value),
}

impl MetaValue {
    /// Borrow the value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert into a plain JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            MetaValue::Bool(b) => Value::Bool(*b),
            MetaValue::Number(n) => Value::Number(n.clone()),
            MetaValue::String(s) => Value::String(s.clone()),
            MetaValue::Blob(v) => v.clone(),
        }
    }
}

impl From<Value> for MetaValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(b) => MetaValue::Bool(b),
            Value::Number(n) => MetaValue::Number(n),
            Value::String(s) => MetaValue::String(s),
            other => MetaValue::Blob(other),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::String(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::String(s)
    }
}

impl From<bool> for MetaValue {
    fn from(b: bool) -> Self {
        MetaValue::Bool(b)
    }
}

impl From<i64> for MetaValue {
    fn from(n: i64) -> Self {
        MetaValue::Number(n.into())
    }
}

impl From<u64> for MetaValue {
    fn from(n: u64) -> Self {
        MetaValue::Number(n.into())
    }
}

impl From<f64> for MetaValue {
    /// Non-finite floats have no JSON form and become a `null` blob.
    fn from(n: f64) -> Self {
        match Number::from_f64(n) {
            Some(n) => MetaValue::Number(n),
            None => MetaValue::Blob(Value::Null),
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Bool(b) => write!(f, "{}", b),
            MetaValue::Number(n) => write!(f, "{}", n),
            MetaValue::String(s) => f.write_str(s),
            MetaValue::Blob(v) => write!(f, "{}", v),
        }
    }
}

/// Insertion-ordered metadata map.
pub type Metadata = IndexMap<String, MetaValue>;

/// A metadata delta: `Some` assigns the key, `None` deletes it.
pub type MetadataPatch = IndexMap<String, Option<MetaValue>>;

/// Apply a patch in place. Assigned keys keep their existing position;
/// deleted keys are removed without disturbing the order of the rest.
pub fn apply_patch(target: &mut Metadata, patch: &MetadataPatch) {
    for (key, value) in patch {
        match value {
            Some(value) => {
                target.insert(key.clone(), value.clone());
            }
            None => {
                target.shift_remove(key);
            }
        }
    }
}

/// A patch that deletes every key currently in `metadata`.
pub fn clearing_patch(metadata: &Metadata) -> MetadataPatch {
    metadata.keys().map(|k| (k.clone(), None)).collect()
}

/// A patch that assigns every entry of `metadata`.
pub fn assigning_patch(metadata: &Metadata) -> MetadataPatch {
    metadata
        .iter()
        .map(|(k, v)| (k.clone(), Some(v.clone())))
        .collect()
}

/// Payload of an initial information packet.
///
/// Literal payloads are plain JSON. Opaque payloads are host-side values
/// (callbacks, handles) that have no document form: they encode as `null`
/// and render as a fixed label in visual exports.
#[derive(Clone)]
pub enum IipData {
    Literal(Value),
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl IipData {
    /// Wrap a host value as an opaque payload.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        IipData::Opaque(Arc::new(value))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, IipData::Literal(_))
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            IipData::Literal(v) => Some(v),
            IipData::Opaque(_) => None,
        }
    }

    /// Document form of the payload.
    pub fn to_json(&self) -> Value {
        match self {
            IipData::Literal(v) => v.clone(),
            IipData::Opaque(_) => Value::Null,
        }
    }
}

impl fmt::Debug for IipData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IipData::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            IipData::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl PartialEq for IipData {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (IipData::Literal(a), IipData::Literal(b)) => a == b,
            (IipData::Opaque(a), IipData::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for IipData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IipData::Literal(Value::String(s)) => f.write_str(s),
            IipData::Literal(v) => write!(f, "{}", v),
            IipData::Opaque(_) => f.write_str("Function"),
        }
    }
}

impl From<Value> for IipData {
    fn from(value: Value) -> Self {
        IipData::Literal(value)
    }
}

impl From<&str> for IipData {
    fn from(s: &str) -> Self {
        IipData::Literal(Value::String(s.to_string()))
    }
}

impl From<String> for IipData {
    fn from(s: String) -> Self {
        IipData::Literal(Value::String(s))
    }
}

impl From<i64> for IipData {
    fn from(n: i64) -> Self {
        IipData::Literal(n.into())
    }
}

impl From<bool> for IipData {
    fn from(b: bool) -> Self {
        IipData::Literal(Value::Bool(b))
    }
}
