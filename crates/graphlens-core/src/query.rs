//! Search and filter: pure functions from a graph to an induced subgraph

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::graph::Graph;
use crate::model::{AttrValue, Node};

static FILTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<attr>[A-Za-z_][\w.\-]*)\s*(?P<op>==|!=|>=|<=|>|<)\s*(?P<val>.+)$")
        .expect("filter grammar is a valid regex")
});

/// Comparison operator of a filter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }

    /// Only `==` and `!=` are defined for booleans and structured values.
    pub fn is_equality(self) -> bool {
        matches!(self, CompareOp::Eq | CompareOp::Ne)
    }

    /// Evaluate against an ordering; `None` (incomparable, e.g. NaN) only satisfies `!=`.
    fn holds(self, ordering: Option<Ordering>) -> bool {
        match (self, ordering) {
            (CompareOp::Ne, None) => true,
            (_, None) => false,
            (CompareOp::Eq, Some(o)) => o == Ordering::Equal,
            (CompareOp::Ne, Some(o)) => o != Ordering::Equal,
            (CompareOp::Gt, Some(o)) => o == Ordering::Greater,
            (CompareOp::Ge, Some(o)) => o != Ordering::Less,
            (CompareOp::Lt, Some(o)) => o == Ordering::Less,
            (CompareOp::Le, Some(o)) => o != Ordering::Greater,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompareOp {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "==" => Ok(CompareOp::Eq),
            "!=" => Ok(CompareOp::Ne),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::Ge),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::Le),
            other => Err(EngineError::parse(format!("unknown operator '{other}'"))),
        }
    }
}

/// A parsed `<attr> <op> <value>` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpr {
    pub attribute: String,
    pub op: CompareOp,
    /// Literal with surrounding whitespace and quotes removed.
    pub literal: String,
}

impl FilterExpr {
    pub fn parse(expr: &str) -> Result<Self> {
        let caps = FILTER_RE
            .captures(expr.trim())
            .ok_or_else(|| EngineError::parse("use: <attribute> <operator> <value>"))?;
        let literal = caps["val"]
            .trim()
            .trim_matches('"')
            .trim_matches('\'')
            .to_string();
        Ok(FilterExpr {
            attribute: caps["attr"].to_string(),
            op: caps["op"].parse()?,
            literal,
        })
    }

    /// Evaluate the expression against one attribute value.
    ///
    /// The literal is coerced to the type of `left`, so each node is judged
    /// by its own stored type.
    pub fn matches(&self, left: &AttrValue) -> Result<bool> {
        if matches!(left, AttrValue::Bool(_)) && !self.op.is_equality() {
            return Err(EngineError::Type {
                attribute: self.attribute.clone(),
                message: "only the '==' and '!=' operators are supported for boolean attributes"
                    .to_string(),
            });
        }

        let ordering = match left {
            AttrValue::Bool(l) => Some(l.cmp(&self.coerce_bool(left)?)),
            AttrValue::Int(l) => Some(l.cmp(&self.coerce_int(left)?)),
            AttrValue::Float(l) => l.partial_cmp(&self.coerce_float(left)?),
            AttrValue::Date(l) => Some(l.cmp(&self.coerce_date(left)?)),
            AttrValue::Str(l) => Some(l.as_str().cmp(self.literal.as_str())),
            AttrValue::Structured(value) => {
                if !self.op.is_equality() {
                    return Err(EngineError::Type {
                        attribute: self.attribute.clone(),
                        message: format!(
                            "operator '{}' is not defined for structured values",
                            self.op
                        ),
                    });
                }
                Some(value.to_string().cmp(&self.literal))
            }
        };
        Ok(self.op.holds(ordering))
    }

    fn coercion_error(&self, left: &AttrValue) -> EngineError {
        EngineError::Coercion {
            attribute: self.attribute.clone(),
            expected: left.type_name(),
            literal: self.literal.clone(),
        }
    }

    fn coerce_bool(&self, left: &AttrValue) -> Result<bool> {
        match self.literal.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(self.coercion_error(left)),
        }
    }

    /// Float literals are truncated toward zero when compared with integers.
    fn coerce_int(&self, left: &AttrValue) -> Result<i64> {
        match parse_number(&self.literal) {
            Some(Number::Int(n)) => Ok(n),
            Some(Number::Float(f)) => Ok(f.trunc() as i64),
            None => Err(self.coercion_error(left)),
        }
    }

    fn coerce_float(&self, left: &AttrValue) -> Result<f64> {
        match parse_number(&self.literal) {
            Some(Number::Int(n)) => Ok(n as f64),
            Some(Number::Float(f)) => Ok(f),
            None => Err(self.coercion_error(left)),
        }
    }

    fn coerce_date(&self, left: &AttrValue) -> Result<NaiveDate> {
        parse_date(&self.literal).ok_or_else(|| self.coercion_error(left))
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.attribute, self.op, self.literal)
    }
}

enum Number {
    Int(i64),
    Float(f64),
}

/// Integer unless the literal carries a decimal point or exponent.
fn parse_number(raw: &str) -> Option<Number> {
    if raw.contains(['.', 'e', 'E']) {
        raw.parse::<f64>().ok().map(Number::Float)
    } else {
        raw.parse::<i64>().ok().map(Number::Int)
    }
}

/// ISO-8601 date, or the date part of an ISO-8601 date-time.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if raw.contains('T') {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.date_naive());
        }
        return raw.parse::<NaiveDateTime>().ok().map(|dt| dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Case-insensitive substring search over node name, id, attribute keys and values.
///
/// Blank `text` returns a copy of the input graph.
pub fn search(graph: &Graph, text: &str) -> Graph {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return graph.clone();
    }
    let keep: HashSet<&str> = graph
        .nodes()
        .filter(|node| node_matches_text(node, &needle))
        .map(|node| node.id.as_str())
        .collect();
    graph.induced_subgraph(&keep)
}

fn node_matches_text(node: &Node, needle: &str) -> bool {
    node.name.to_lowercase().contains(needle)
        || node.id.to_lowercase().contains(needle)
        || node.attributes.iter().any(|(key, value)| {
            key.to_lowercase().contains(needle) || value.to_string().to_lowercase().contains(needle)
        })
}

/// Keep the nodes whose `attr` satisfies the expression, plus the edges between them.
///
/// Nodes without the attribute are dropped. Any parse, coercion or type
/// error aborts the whole filter.
pub fn filter(graph: &Graph, expr: &str) -> Result<Graph> {
    let expr = FilterExpr::parse(expr)?;
    if !graph.nodes().any(|n| n.attributes.contains_key(&expr.attribute)) {
        return Err(EngineError::parse(format!(
            "attribute '{}' does not exist on any node",
            expr.attribute
        )));
    }

    let mut keep = HashSet::new();
    for node in graph.nodes() {
        let Some(left) = node.attr(&expr.attribute) else {
            continue;
        };
        if expr.matches(left)? {
            keep.insert(node.id.as_str());
        }
    }
    Ok(graph.induced_subgraph(&keep))
}
