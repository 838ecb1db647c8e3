use std::sync::Arc;

use iscn_types::Value;
use serde_json::Value as Json;

use super::{past_leaf, Meta, PropertyHandler};
use crate::error::{SchemaError, SchemaResult};
use crate::resolve::{Resolution, Resolved};

/// Free-form UTF-8 text.
#[derive(Clone, Debug)]
pub struct TextProperty {
    pub(super) meta: Meta,
    pub(super) value: Option<String>,
}

impl TextProperty {
    pub fn new(key: &str, required: bool) -> Self {
        Self {
            meta: Meta::new(key, required),
            value: None,
        }
    }

    /// The stored text.
    pub fn get(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Pull text out of `value` or fail with a type mismatch naming this key.
    pub(crate) fn accept(meta: &Meta, value: &Value) -> SchemaResult<String> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => Err(meta.mismatch("text", other)),
        }
    }
}

impl PropertyHandler for TextProperty {
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
            value: None,
        }
    }

    fn set(&mut self, value: &Value) -> SchemaResult<()> {
        self.value = None;
        self.value = Some(Self::accept(&self.meta, value)?);
        Ok(())
    }

    fn value(&self) -> Option<Value> {
        self.value.clone().map(Value::Text)
    }

    fn encode(&self) -> SchemaResult<Value> {
        self.value().ok_or_else(|| self.meta.undefined())
    }

    fn decode(&mut self, wire: &Value) -> SchemaResult<Value> {
        self.set(wire)?;
        self.encode()
    }

    fn to_json(&self) -> Json {
        self.value.clone().map_or(Json::Null, Json::String)
    }

    fn resolve<'a>(&'a self, path: &[&str]) -> SchemaResult<Resolution<'a>> {
        if !path.is_empty() {
            return Err(past_leaf(self.key(), path));
        }
        let value = self.value().ok_or_else(|| SchemaError::NoSuchLink(self.key().into()))?;
        Ok(Resolution::done(Resolved::Value(value)))
    }
}

/// Text restricted to a closed set of values, e.g. an enumeration of roles.
#[derive(Clone, Debug)]
pub struct FilteredProperty {
    text: TextProperty,
    allowed: Arc<[String]>,
}

impl FilteredProperty {
    pub fn new(key: &str, required: bool, allowed: &[&str]) -> Self {
        Self {
            text: TextProperty::new(key, required),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The accepted values, in declaration order.
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    pub fn get(&self) -> Option<&str> {
        self.text.get()
    }
}

impl PropertyHandler for FilteredProperty {
    fn key(&self) -> &str {
        self.text.key()
    }

    fn is_required(&self) -> bool {
        self.text.is_required()
    }

    fn is_defined(&self) -> bool {
        self.text.is_defined()
    }

    fn prototype(&self) -> Self {
        Self {
            text: self.text.prototype(),
            allowed: Arc::clone(&self.allowed),
        }
    }

    fn set(&mut self, value: &Value) -> SchemaResult<()> {
        self.text.value = None;
        let s = TextProperty::accept(&self.text.meta, value)?;
        if !self.allowed.iter().any(|a| *a == s) {
            return Err(SchemaError::constraint(
                self.key(),
                format!("{s:?} is not one of [{}]", self.allowed.join(", ")),
            ));
        }
        self.text.value = Some(s);
        Ok(())
    }

    fn value(&self) -> Option<Value> {
        self.text.value()
    }

    fn encode(&self) -> SchemaResult<Value> {
        self.text.encode()
    }

    fn decode(&mut self, wire: &Value) -> SchemaResult<Value> {
        self.set(wire)?;
        self.encode()
    }

    fn to_json(&self) -> Json {
        self.text.to_json()
    }

    fn resolve<'a>(&'a self, path: &[&str]) -> SchemaResult<Resolution<'a>> {
        self.text.resolve(path)
    }
}
