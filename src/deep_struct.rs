//! Dynamic configuration tree.
//!
//! A [`DeepStruct`] wraps a mapping and turns every nested mapping into
//! another `DeepStruct` at construction time, and every sequence into a
//! list of wrapped elements. Keys are not validated; anything a mapping
//! can hold is reachable through the accessors. [`DeepStruct::to_hash`]
//! gives back the plain mapping.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// One entry of a [`DeepStruct`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Struct(DeepStruct),
    List(Vec<Node>),
    /// Scalar value: null, bool, number or string. Never an object or array.
    Leaf(Value),
}

impl Node {
    pub fn wrap(value: Value) -> Self {
        match value {
            Value::Object(map) => Node::Struct(DeepStruct::new(map)),
            Value::Array(items) => Node::List(items.into_iter().map(Node::wrap).collect()),
            leaf => Node::Leaf(leaf),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Node::Struct(inner) => Value::Object(inner.to_hash()),
            Node::List(items) => Value::Array(items.iter().map(Node::to_value).collect()),
            Node::Leaf(value) => value.clone(),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Node::Struct(inner) => Value::Object(inner.into_hash()),
            Node::List(items) => Value::Array(items.into_iter().map(Node::into_value).collect()),
            Node::Leaf(value) => value,
        }
    }

    pub fn as_struct(&self) -> Option<&DeepStruct> {
        match self {
            Node::Struct(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut DeepStruct> {
        match self {
            Node::Struct(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Leaf(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Node::Leaf(value) => value.as_u64(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Leaf(value) => value.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Leaf(value) => value.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Leaf(value) => value.as_bool(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Leaf(Value::Null))
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Node::Struct(_) => "a mapping",
            Node::List(_) => "a sequence",
            Node::Leaf(value) => value_kind(value),
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::wrap(value)
    }
}

impl From<DeepStruct> for Node {
    fn from(inner: DeepStruct) -> Self {
        Node::Struct(inner)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::List(items)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Leaf(Value::String(s.to_string()))
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Leaf(Value::String(s))
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Leaf(Value::Bool(b))
    }
}

impl From<u64> for Node {
    fn from(n: u64) -> Self {
        Node::Leaf(Value::from(n))
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Leaf(Value::from(n))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeepStruct {
    fields: BTreeMap<String, Node>,
}

impl DeepStruct {
    pub fn new(map: Map<String, Value>) -> Self {
        Self {
            fields: map.into_iter().map(|(k, v)| (k, Node::wrap(v))).collect(),
        }
    }

    /// Wraps `value`, which must be a mapping.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::new(map)),
            other => Err(Error::Shape {
                path: "<root>".to_string(),
                expected: "a mapping",
                found: value_kind(&other),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.fields.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Replaces the entry under `key`, returning the previous one.
    /// Plain mappings passed as [`Value`] are wrapped like at construction.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Node>) -> Option<Node> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.fields.remove(key)
    }

    pub fn section(&self, key: &str) -> Option<&DeepStruct> {
        self.get(key).and_then(Node::as_struct)
    }

    pub fn section_mut(&mut self, key: &str) -> Option<&mut DeepStruct> {
        self.get_mut(key).and_then(Node::as_struct_mut)
    }

    pub fn list(&self, key: &str) -> Option<&[Node]> {
        self.get(key).and_then(Node::as_list)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Node::as_str)
    }

    pub fn u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Node::as_u64)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Node::as_bool)
    }

    /// Follows a dotted path such as `kafka.client_id`. Numeric segments
    /// index into lists.
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        let mut segments = path.split('.');
        let mut node = self.get(segments.next()?)?;
        for segment in segments {
            node = match node {
                Node::Struct(inner) => inner.get(segment)?,
                Node::List(items) => items.get(segment.parse::<usize>().ok()?)?,
                Node::Leaf(_) => return None,
            };
        }
        Some(node)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_hash(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_value()))
            .collect()
    }

    pub fn into_hash(self) -> Map<String, Value> {
        self.fields
            .into_iter()
            .map(|(k, v)| (k, v.into_value()))
            .collect()
    }
}

impl From<Map<String, Value>> for DeepStruct {
    fn from(map: Map<String, Value>) -> Self {
        Self::new(map)
    }
}

impl From<DeepStruct> for Value {
    fn from(inner: DeepStruct) -> Self {
        Value::Object(inner.into_hash())
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
