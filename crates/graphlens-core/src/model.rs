//! Core data structures for labeled graphs

use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Edge type used when the creator does not name one.
pub const DEFAULT_EDGE_TYPE: &str = "related";

/// A typed attribute value.
///
/// Serialized as plain JSON. On deserialization the first matching variant
/// wins, so an ISO `YYYY-MM-DD` string becomes a [`AttrValue::Date`] and
/// objects, arrays and `null` become [`AttrValue::Structured`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Str(String),
    Structured(serde_json::Value),
}

impl AttrValue {
    /// Name of the comparison type, as reported in coercion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Int(_) => "integer",
            AttrValue::Float(_) => "float",
            AttrValue::Bool(_) => "boolean",
            AttrValue::Date(_) => "date (YYYY-MM-DD)",
            AttrValue::Str(_) => "string",
            AttrValue::Structured(_) => "structured value",
        }
    }
}

/// Canonical string form used by search and by renderers.
impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{v}"),
            // whole floats keep their fraction so they read like their JSON form
            AttrValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            AttrValue::Float(v) => write!(f, "{v}"),
            AttrValue::Bool(v) => write!(f, "{v}"),
            AttrValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            AttrValue::Str(v) => f.write_str(v),
            AttrValue::Structured(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(v.into())
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<NaiveDate> for AttrValue {
    fn from(v: NaiveDate) -> Self {
        AttrValue::Date(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

/// Ordered attribute map; iteration follows first insertion.
pub type Attributes = IndexMap<String, AttrValue>;

/// A single node in a labeled graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Node {
            id: id.into(),
            name: name.into(),
            attributes: Attributes::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Insert or overwrite an attribute. Overwrites keep the original position.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }
}

/// A relationship between two nodes of the same graph.
///
/// Endpoints are held by node id, so copying an edge into another snapshot
/// never aliases node state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    #[serde(default)]
    pub directed: bool,
    #[serde(rename = "from")]
    pub source: String,
    #[serde(rename = "to")]
    pub target: String,
    #[serde(rename = "type", default = "default_edge_type")]
    pub kind: String,
}

fn default_edge_type() -> String {
    DEFAULT_EDGE_TYPE.to_string()
}

impl Edge {
    /// Create an edge with a freshly generated id.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        kind: impl Into<String>,
        directed: bool,
    ) -> Self {
        Edge::with_id(uuid::Uuid::new_v4().to_string(), source, target, kind, directed)
    }

    pub fn with_id(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        kind: impl Into<String>,
        directed: bool,
    ) -> Self {
        Edge {
            id: id.into(),
            directed,
            source: source.into(),
            target: target.into(),
            kind: kind.into(),
        }
    }

    /// True if `node_id` is either endpoint.
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}
