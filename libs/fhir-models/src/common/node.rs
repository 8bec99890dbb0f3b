//! Typed JSON tree for reference resolution
//!
//! [`Node`] mirrors a `serde_json::Value` but splits objects into plain
//! objects and `Reference` objects, so a resolver can match exhaustively
//! instead of probing for a `reference` key at every level.

use serde_json::{Map, Number, Value};

/// Scalar JSON value
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// A JSON object carrying a string `reference` property
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceNode {
    /// Target `fullUrl`
    pub reference: String,
    /// Remaining properties (`display`, `type`, ...), in document order
    pub rest: Vec<(String, Node)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(Leaf),
    /// Plain object, keys in document order
    Object(Vec<(String, Node)>),
    Reference(ReferenceNode),
    Array(Vec<Node>),
}

impl Node {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Node::Leaf(Leaf::Null),
            Value::Bool(b) => Node::Leaf(Leaf::Bool(*b)),
            Value::Number(n) => Node::Leaf(Leaf::Number(n.clone())),
            Value::String(s) => Node::Leaf(Leaf::String(s.clone())),
            Value::Array(items) => Node::Array(items.iter().map(Node::from_value).collect()),
            Value::Object(map) => match map.get("reference") {
                Some(Value::String(reference)) => Node::Reference(ReferenceNode {
                    reference: reference.clone(),
                    rest: map
                        .iter()
                        .filter(|(k, _)| k.as_str() != "reference")
                        .map(|(k, v)| (k.clone(), Node::from_value(v)))
                        .collect(),
                }),
                _ => Node::Object(
                    map.iter()
                        .map(|(k, v)| (k.clone(), Node::from_value(v)))
                        .collect(),
                ),
            },
        }
    }

    /// Convert back to JSON; references are written in their wire form
    pub fn to_value(&self) -> Value {
        match self {
            Node::Leaf(leaf) => leaf.to_value(),
            Node::Array(items) => Value::Array(items.iter().map(Node::to_value).collect()),
            Node::Object(fields) => Value::Object(fields_to_map(fields)),
            Node::Reference(r) => {
                let mut map = Map::new();
                map.insert("reference".to_string(), Value::String(r.reference.clone()));
                map.extend(fields_to_map(&r.rest));
                Value::Object(map)
            }
        }
    }
}

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        Node::from_value(value)
    }
}

impl Leaf {
    pub fn to_value(&self) -> Value {
        match self {
            Leaf::Null => Value::Null,
            Leaf::Bool(b) => Value::Bool(*b),
            Leaf::Number(n) => Value::Number(n.clone()),
            Leaf::String(s) => Value::String(s.clone()),
        }
    }
}

fn fields_to_map(fields: &[(String, Node)]) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), v.to_value()))
        .collect()
}

/// Whether any object in `value` still has the reference shape
pub fn contains_reference(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            matches!(map.get("reference"), Some(Value::String(_)))
                || map.values().any(contains_reference)
        }
        Value::Array(items) => items.iter().any(contains_reference),
        _ => false,
    }
}
