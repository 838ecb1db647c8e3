//! Structured values exchanged with schema objects.
//!
//! [`Value`] is the closed set of shapes a field can take: on input to a
//! schema object, on the wire between a schema object and the canonical
//! encoder, and inside the opaque custom-field bag. Keeping it closed means
//! every projection (wire, JSON) is an exhaustive `match`.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map as JsonMap, Number as JsonNumber, Value as Json};

use crate::cid::Cid;

/// Key under which JSON encodes a link: `{"/": "<cid>"}`.
pub const LINK_KEY: &str = "/";

/// A structured value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// Any integer that fits in 128 bits; narrower ranges are enforced by the
    /// property that consumes it.
    Integer(i128),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Link(Cid),
    Array(Vec<Value>),
    Map(Fields),
}

impl Value {
    /// Short name of the variant, used in type-mismatch messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Link(_) => "link",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&Cid> {
        match self {
            Self::Link(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// JSON projection.
    ///
    /// Links become `{"/": "<cid>"}`, bytes become lowercase hex, and
    /// integers outside the 64-bit range become decimal strings.
    pub fn to_json(&self) -> Json {
        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Integer(i) => integer_to_json(*i),
            Self::Float(f) => JsonNumber::from_f64(*f).map_or(Json::Null, Json::Number),
            Self::Text(s) => Json::String(s.clone()),
            Self::Bytes(b) => Json::String(hex::encode(b)),
            Self::Link(cid) => link_to_json(cid),
            Self::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Self::Map(fields) => Json::Object(fields.to_json_map()),
        }
    }

    /// Build a value from JSON input.
    ///
    /// An object whose only key is `"/"` holding a parseable CID string is a
    /// link; every other object is a map. Numbers stay integers when they are
    /// integral and become floats otherwise.
    pub fn from_json(json: &Json) -> Self {
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(*b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i128::from(i))
                } else if let Some(u) = n.as_u64() {
                    Self::Integer(i128::from(u))
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Self::Text(s.clone()),
            Json::Array(items) => Self::Array(items.iter().map(Value::from_json).collect()),
            Json::Object(map) => {
                if map.len() == 1 {
                    if let Some(Json::String(s)) = map.get(LINK_KEY) {
                        if let Ok(cid) = s.parse::<Cid>() {
                            return Self::Link(cid);
                        }
                    }
                }
                Self::Map(Fields::from_json_map(map))
            }
        }
    }
}

/// JSON form of a link.
pub fn link_to_json(cid: &Cid) -> Json {
    let mut map = JsonMap::new();
    map.insert(LINK_KEY.to_string(), Json::String(cid.to_string()));
    Json::Object(map)
}

fn integer_to_json(i: i128) -> Json {
    if let Ok(v) = i64::try_from(i) {
        Json::Number(v.into())
    } else if let Ok(v) = u64::try_from(i) {
        Json::Number(v.into())
    } else {
        Json::String(i.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

macro_rules! integer_from {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Self::Integer(i128::from(v))
            }
        })*
    };
}

integer_from!(i8, i16, i32, i64, u8, u16, u32, u64, i128);

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Self::Integer(v as i128)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Cid> for Value {
    fn from(v: Cid) -> Self {
        Self::Link(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<Fields> for Value {
    fn from(v: Fields) -> Self {
        Self::Map(v)
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// Insertion-ordered map from field name to [`Value`].
///
/// Order is significant: it is part of a document's canonical form, so this
/// map never re-sorts. Inserting an existing key replaces the value in place
/// and keeps the original position. Lookups go through a key index, so
/// building a map of `n` fields is linear.
#[derive(Clone, Debug, Default)]
pub struct Fields {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or replace. Returns the previous value for `key`, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Append `key` only if it is not present yet. Returns `false`, leaving
    /// the map untouched, on a duplicate.
    pub fn try_insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value.into()));
        true
    }

    /// Remove `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let pos = self.index.remove(key)?;
        let (_, value) = self.entries.remove(pos);
        for (k, _) in &self.entries[pos..] {
            if let Some(i) = self.index.get_mut(k.as_str()) {
                *i -= 1;
            }
        }
        Some(value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Append every entry of `other`, replacing keys already present.
    pub fn extend(&mut self, other: Fields) {
        for (k, v) in other {
            self.insert(k, v);
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn to_json_map(&self) -> JsonMap<String, Json> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }

    pub fn from_json_map(map: &JsonMap<String, Json>) -> Self {
        map.iter()
            .map(|(k, v)| (k.clone(), Value::from_json(v)))
            .collect()
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// The index is derived from `entries`.
impl PartialEq for Fields {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}
