use iscn_types::value::link_to_json;
use iscn_types::{Cid, Value};
use serde_json::Value as Json;

use super::{Meta, PropertyHandler, TextProperty};
use crate::error::{SchemaError, SchemaResult};
use crate::resolve::{Link, Resolution, Resolved};

/// Accept a link from input, either as a [`Value::Link`] or as a CID string.
fn accept_link(meta: &Meta, scope: Option<u64>, value: &Value) -> SchemaResult<Cid> {
    let cid = match value {
        Value::Link(cid) => *cid,
        Value::Text(s) => Cid::parse(s).map_err(|e| {
            SchemaError::constraint(meta.key(), format!("invalid CID {s:?}: {e}"))
        })?,
        other => return Err(meta.mismatch("link", other)),
    };
    check_scope(meta, scope, cid)
}

/// Parse a link from its wire form, the raw CID bytes.
fn decode_link(meta: &Meta, scope: Option<u64>, bytes: &[u8]) -> SchemaResult<Cid> {
    let cid = Cid::from_bytes(bytes)
        .map_err(|e| SchemaError::MalformedWire(format!("{}: {e}", meta.key())))?;
    check_scope(meta, scope, cid)
}

fn check_scope(meta: &Meta, scope: Option<u64>, cid: Cid) -> SchemaResult<Cid> {
    match scope {
        Some(codec) if cid.codec() != codec => Err(SchemaError::constraint(
            meta.key(),
            format!(
                "a link to codec 0x{codec:x} is expected but 0x{:x} is found",
                cid.codec()
            ),
        )),
        _ => Ok(cid),
    }
}

fn link_resolution<'a>(meta: &Meta, cid: Cid, path: &[&str]) -> Resolution<'a> {
    Resolution::partial(
        Resolved::Link(Link {
            name: meta.key().to_string(),
            cid,
        }),
        path,
    )
}

/// Content link to another document, optionally scoped to one codec tag.
///
/// Resolution never crosses the link: the descriptor is returned together
/// with whatever path is left.
#[derive(Clone, Debug)]
pub struct LinkProperty {
    meta: Meta,
    scope: Option<u64>,
    value: Option<Cid>,
}

impl LinkProperty {
    pub fn new(key: &str, required: bool, scope: Option<u64>) -> Self {
        Self {
            meta: Meta::new(key, required),
            scope,
            value: None,
        }
    }

    /// The codec tag targets must carry, if scoped.
    pub fn scope(&self) -> Option<u64> {
        self.scope
    }

    pub fn get(&self) -> Option<Cid> {
        self.value
    }
}

impl PropertyHandler for LinkProperty {
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
            scope: self.scope,
            value: None,
        }
    }

    fn set(&mut self, value: &Value) -> SchemaResult<()> {
        self.value = None;
        self.value = Some(accept_link(&self.meta, self.scope, value)?);
        Ok(())
    }

    fn value(&self) -> Option<Value> {
        self.value.map(Value::Link)
    }

    fn encode(&self) -> SchemaResult<Value> {
        let cid = self.value.ok_or_else(|| self.meta.undefined())?;
        Ok(Value::Bytes(cid.to_bytes()))
    }

    fn decode(&mut self, wire: &Value) -> SchemaResult<Value> {
        self.value = None;
        let cid = match wire {
            Value::Bytes(b) => decode_link(&self.meta, self.scope, b)?,
            other => return Err(self.meta.mismatch("link bytes", other)),
        };
        self.value = Some(cid);
        Ok(Value::Link(cid))
    }

    fn to_json(&self) -> Json {
        self.value.as_ref().map_or(Json::Null, link_to_json)
    }

    fn resolve<'a>(&'a self, path: &[&str]) -> SchemaResult<Resolution<'a>> {
        let cid = self
            .value
            .ok_or_else(|| SchemaError::NoSuchLink(self.key().into()))?;
        Ok(link_resolution(&self.meta, cid, path))
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Target {
    Link(Cid),
    Text(String),
}

/// Either a content link or a plain string such as a URL.
///
/// Links are written as CID bytes and text as text, so the two stay
/// distinguishable on the wire.
#[derive(Clone, Debug)]
pub struct LinkOrTextProperty {
    meta: Meta,
    scope: Option<u64>,
    value: Option<Target>,
}

impl LinkOrTextProperty {
    pub fn new(key: &str, required: bool, scope: Option<u64>) -> Self {
        Self {
            meta: Meta::new(key, required),
            scope,
            value: None,
        }
    }

    pub fn get_link(&self) -> Option<Cid> {
        match &self.value {
            Some(Target::Link(cid)) => Some(*cid),
            _ => None,
        }
    }

    pub fn get_text(&self) -> Option<&str> {
        match &self.value {
            Some(Target::Text(s)) => Some(s),
            _ => None,
        }
    }
}

impl PropertyHandler for LinkOrTextProperty {
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
            scope: self.scope,
            value: None,
        }
    }

    fn set(&mut self, value: &Value) -> SchemaResult<()> {
        self.value = None;
        let target = match value {
            Value::Link(_) => Target::Link(accept_link(&self.meta, self.scope, value)?),
            Value::Text(_) => Target::Text(TextProperty::accept(&self.meta, value)?),
            other => return Err(self.meta.mismatch("link or text", other)),
        };
        self.value = Some(target);
        Ok(())
    }

    fn value(&self) -> Option<Value> {
        self.value.as_ref().map(|t| match t {
            Target::Link(cid) => Value::Link(*cid),
            Target::Text(s) => Value::Text(s.clone()),
        })
    }

    fn encode(&self) -> SchemaResult<Value> {
        match self.value.as_ref().ok_or_else(|| self.meta.undefined())? {
            Target::Link(cid) => Ok(Value::Bytes(cid.to_bytes())),
            Target::Text(s) => Ok(Value::Text(s.clone())),
        }
    }

    fn decode(&mut self, wire: &Value) -> SchemaResult<Value> {
        self.value = None;
        let target = match wire {
            Value::Bytes(b) => Target::Link(decode_link(&self.meta, self.scope, b)?),
            Value::Text(s) => Target::Text(s.clone()),
            other => return Err(self.meta.mismatch("link bytes or text", other)),
        };
        self.value = Some(target);
        self.value().ok_or_else(|| self.meta.undefined())
    }

    fn to_json(&self) -> Json {
        match &self.value {
            Some(Target::Link(cid)) => link_to_json(cid),
            Some(Target::Text(s)) => Json::String(s.clone()),
            None => Json::Null,
        }
    }

    fn resolve<'a>(&'a self, path: &[&str]) -> SchemaResult<Resolution<'a>> {
        match &self.value {
            Some(Target::Link(cid)) => Ok(link_resolution(&self.meta, *cid, path)),
            Some(Target::Text(s)) if path.is_empty() => {
                Ok(Resolution::done(Resolved::Value(Value::Text(s.clone()))))
            }
            Some(Target::Text(_)) => Err(super::past_leaf(self.key(), path)),
            None => Err(SchemaError::NoSuchLink(self.key().into())),
        }
    }
}
