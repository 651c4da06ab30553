use std::{borrow::Cow, fmt};

use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeMap, ser::SerializeSeq};

/// Insertion-ordered mapping used by both map shapes.
pub type Map = IndexMap<String, Data>;

/// A JSON-like value.
///
/// `Map` and `OrderedMap` share the same storage and both keep insertion
/// order. They differ only in identity: a value built as `OrderedMap` comes
/// back out of a tree as `OrderedMap`.
///
/// Equality of two maps ignores key order (it follows [`IndexMap`]); compare
/// `keys()` when order matters.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Data {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Integer above `i64::MAX`. Smaller unsigned values are stored as `Int`.
    UInt(u64),
    Float(f64),
    Str(String),
    List(Vec<Data>),
    Map(Map),
    OrderedMap(Map),
}

impl Data {
    /// Short lowercase name of the value shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Data::Null => "null",
            Data::Bool(_) => "boolean",
            Data::Int(_) | Data::UInt(_) => "integer",
            Data::Float(_) => "float",
            Data::Str(_) => "string",
            Data::List(_) => "list",
            Data::Map(_) => "map",
            Data::OrderedMap(_) => "ordered map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Data::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Data::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Data::Int(i) => u64::try_from(*i).ok(),
            Data::UInt(u) => Some(*u),
            _ => None,
        }
    }

    /// Numeric value of either integer or float data.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Data::Int(i) => Some(*i as f64),
            Data::UInt(u) => Some(*u as f64),
            Data::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Data>> {
        match self {
            Data::List(l) => Some(l),
            _ => None,
        }
    }

    /// Entries of either map shape.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Data::Map(m) | Data::OrderedMap(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Data::Map(m) | Data::OrderedMap(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Data::Int(_) | Data::UInt(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Data::Int(_) | Data::UInt(_) | Data::Float(_))
    }

    /// Build a plain map from key/value pairs, keeping their order.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Data)>) -> Self {
        Data::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build an ordered map from key/value pairs.
    pub fn ordered_map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Data)>) -> Self {
        Data::OrderedMap(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Human readable label: strings without quotes, everything else as
    /// compact JSON.
    pub fn label(&self) -> String {
        match self {
            Data::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Convert to a `serde_json::Value`. Non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Data::Null => serde_json::Value::Null,
            Data::Bool(b) => serde_json::Value::Bool(*b),
            Data::Int(i) => serde_json::Value::Number((*i).into()),
            Data::UInt(u) => serde_json::Value::Number((*u).into()),
            Data::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Data::Str(s) => serde_json::Value::String(s.clone()),
            Data::List(items) => serde_json::Value::Array(items.iter().map(Data::to_json).collect()),
            Data::Map(m) | Data::OrderedMap(m) => serde_json::Value::Object(
                m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<&serde_json::Value> for Data {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Data::Null,
            serde_json::Value::Bool(b) => Data::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Data::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Data::UInt(u)
                } else {
                    Data::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Data::Str(s.clone()),
            serde_json::Value::Array(arr) => Data::List(arr.iter().map(Data::from).collect()),
            serde_json::Value::Object(obj) => {
                Data::Map(obj.iter().map(|(k, v)| (k.clone(), Data::from(v))).collect())
            }
        }
    }
}

impl From<serde_json::Value> for Data {
    fn from(value: serde_json::Value) -> Self {
        Data::from(&value)
    }
}

impl From<&Data> for serde_json::Value {
    fn from(value: &Data) -> Self {
        value.to_json()
    }
}

impl From<bool> for Data {
    fn from(b: bool) -> Self {
        Data::Bool(b)
    }
}

impl From<i64> for Data {
    fn from(i: i64) -> Self {
        Data::Int(i)
    }
}

impl From<u64> for Data {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Data::Int(i),
            Err(_) => Data::UInt(u),
        }
    }
}

impl From<f64> for Data {
    fn from(f: f64) -> Self {
        Data::Float(f)
    }
}

impl From<&str> for Data {
    fn from(s: &str) -> Self {
        Data::Str(s.to_string())
    }
}

impl From<String> for Data {
    fn from(s: String) -> Self {
        Data::Str(s)
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for Data {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Data::Null => serializer.serialize_unit(),
            Data::Bool(b) => serializer.serialize_bool(*b),
            Data::Int(i) => serializer.serialize_i64(*i),
            Data::UInt(u) => serializer.serialize_u64(*u),
            Data::Float(f) => serializer.serialize_f64(*f),
            Data::Str(s) => serializer.serialize_str(s),
            Data::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Data::Map(m) | Data::OrderedMap(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

/// Position of a node inside its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// The implicit document root.
    Root,
    /// Map entry.
    Name(String),
    /// List element.
    Index(usize),
}

impl Key {
    /// Segment used in dot-separated paths and schema lookups.
    pub fn segment(&self) -> Cow<'_, str> {
        match self {
            Key::Root => Cow::Borrowed(""),
            Key::Name(name) => Cow::Borrowed(name),
            Key::Index(i) => Cow::Owned(i.to_string()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Key::Name(name) => Some(name),
            _ => None,
        }
    }
}

/// List elements are shown as `-`.
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Root => Ok(()),
            Key::Name(name) => f.write_str(name),
            Key::Index(_) => f.write_str("-"),
        }
    }
}
