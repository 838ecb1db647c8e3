use iscn_types::Value;
use serde_json::Value as Json;

use super::{past_leaf, Meta, PropertyHandler};
use crate::error::{SchemaError, SchemaResult};
use crate::resolve::{Resolution, Resolved};

/// Byte string of a fixed length.
///
/// Accepts raw bytes or, for JSON input, a lowercase hex string. Projects to
/// JSON as hex.
#[derive(Clone, Debug)]
pub struct BytesProperty {
    meta: Meta,
    len: usize,
    value: Option<Vec<u8>>,
}

impl BytesProperty {
    pub fn new(key: &str, required: bool, len: usize) -> Self {
        Self {
            meta: Meta::new(key, required),
            len,
            value: None,
        }
    }

    /// The required length in bytes.
    pub fn byte_len(&self) -> usize {
        self.len
    }

    pub fn get(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    fn check(&self, bytes: Vec<u8>) -> SchemaResult<Vec<u8>> {
        if bytes.len() != self.len {
            return Err(SchemaError::constraint(
                self.key(),
                format!("{} bytes are expected but {} are found", self.len, bytes.len()),
            ));
        }
        Ok(bytes)
    }
}

impl PropertyHandler for BytesProperty {
    fn key(&self) -> &str {
        self.meta.key()
    }

    fn is_required(&self) -> bool {
        self.meta.required()
    }

    fn is_defined(&self) -> bool {
        self.value.is_some()
    }

    fn prototype(&self) -> Self {
        Self {
            meta: self.meta.clone(),
            len: self.len,
            value: None,
        }
    }

    fn set(&mut self, value: &Value) -> SchemaResult<()> {
        self.value = None;
        let bytes = match value {
            Value::Bytes(b) => b.clone(),
            Value::Text(s) => hex::decode(s)
                .map_err(|e| SchemaError::constraint(self.key(), format!("invalid hex: {e}")))?,
            other => return Err(self.meta.mismatch("bytes", other)),
        };
        self.value = Some(self.check(bytes)?);
        Ok(())
    }

    fn value(&self) -> Option<Value> {
        self.value.clone().map(Value::Bytes)
    }

    fn encode(&self) -> SchemaResult<Value> {
        self.value().ok_or_else(|| self.meta.undefined())
    }

    fn decode(&mut self, wire: &Value) -> SchemaResult<Value> {
        self.value = None;
        match wire {
            Value::Bytes(b) => {
                self.value = Some(self.check(b.clone())?);
                self.encode()
            }
            other => Err(self.meta.mismatch("bytes", other)),
        }
    }

    fn to_json(&self) -> Json {
        self.value
            .as_ref()
            .map_or(Json::Null, |b| Json::String(hex::encode(b)))
    }

    fn resolve<'a>(&'a self, path: &[&str]) -> SchemaResult<Resolution<'a>> {
        if !path.is_empty() {
            return Err(past_leaf(self.key(), path));
        }
        let value = self.value().ok_or_else(|| SchemaError::NoSuchLink(self.key().into()))?;
        Ok(Resolution::done(Resolved::Value(value)))
    }
}
