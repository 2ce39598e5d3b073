//! The tagwire value tree.
//!
//! A [`Value`] is a plain recursive tree with exactly three node kinds. Every
//! node is owned by its parent, so there is no shared substructure and no way
//! to form a cycle. Mappings keep their pairs in insertion order because the
//! wire form writes them in that order.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::CodecError;

/// A tagwire document value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    /// Text is measured in characters (Unicode scalar values), not bytes.
    Text(String),
    Mapping(Mapping),
}

/// The kind of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Number,
    Text,
    Mapping,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Number => "number",
            Self::Text => "text",
            Self::Mapping => "mapping",
        })
    }
}

impl Value {
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Number(_) => Kind::Number,
            Self::Text(_) => Kind::Text,
            Self::Mapping(_) => Kind::Mapping,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Self::Mapping(m)
    }
}

/// Key/value pairs in insertion order, with unique keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    pairs: Vec<(String, Value)>,
}

impl Mapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(capacity),
        }
    }

    /// Insert a pair. An existing key keeps its position and gets the new
    /// value, which is returned as the old one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.pairs.push((key, value));
                None
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Mapping(m) => m.serialize(serializer),
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Convert JSON into a tagwire value.
///
/// Arrays become mappings keyed by their decimal indices (`"0"`, `"1"`, ...).
/// `null` and booleans have no tagwire kind and fail with
/// [`CodecError::UnsupportedType`].
impl TryFrom<serde_json::Value> for Value {
    type Error = CodecError;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Null => Err(CodecError::UnsupportedType("null")),
            serde_json::Value::Bool(_) => Err(CodecError::UnsupportedType("boolean")),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Self::Number)
                .ok_or(CodecError::UnsupportedType("non-f64 number")),
            serde_json::Value::String(s) => Ok(Self::Text(s)),
            serde_json::Value::Array(items) => {
                let mut mapping = Mapping::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    mapping.insert(i.to_string(), Self::try_from(item)?);
                }
                Ok(Self::Mapping(mapping))
            }
            serde_json::Value::Object(map) => {
                let mut mapping = Mapping::with_capacity(map.len());
                for (k, v) in map {
                    mapping.insert(k, Self::try_from(v)?);
                }
                Ok(Self::Mapping(mapping))
            }
        }
    }
}
