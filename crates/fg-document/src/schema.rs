//! Graph document schema.
//!
//! Field names and presence follow the JSON graph format used by FBP
//! tooling. Connections carry either `data` (an initial packet) or `src`
//! (an edge), never both.

use fg_core::Metadata;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Top-level document. A missing or `null` section reads as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub case_sensitive: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Metadata,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inports: IndexMap<String, PortDef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub outports: IndexMap<String, PortDef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: Vec<GroupDef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub processes: IndexMap<String, ProcessDef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub connections: Vec<ConnectionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortDef {
    pub process: String,
    pub port: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupDef {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProcessDef {
    #[serde(default)]
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<EndpointDef>,
    /// `Some(Value::Null)` is an explicit `null` packet, distinct from absence.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<Value>,
    pub tgt: EndpointDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl ConnectionDef {
    pub fn is_initial(&self) -> bool {
        self.data.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointDef {
    pub process: String,
    pub port: String,
    /// Kept raw: only integral values are treated as an index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Value>,
}

impl EndpointDef {
    pub fn new(process: impl Into<String>, port: impl Into<String>, index: Option<u32>) -> Self {
        Self {
            process: process.into(),
            port: port.into(),
            index: index.map(Value::from),
        }
    }

    /// The index, if it is a number that fits a port index.
    ///
    /// Port indices are `u32`, so negative and fractional numbers have no
    /// graph form and are dropped, as are strings and other non-numbers.
    /// The raw value is still available in `index`.
    pub fn numeric_index(&self) -> Option<u32> {
        self.index
            .as_ref()
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
