//! Typed property handlers.
//!
//! A handler owns one named field of a schema. Handlers built at schema
//! registration time are *templates*: they carry configuration (key,
//! required flag, compiled pattern, filter set, link scope, nested schema)
//! and never hold a value. Every stateful call happens on a fresh instance
//! produced by [`PropertyHandler::prototype`], which shares the template's
//! immutable configuration and starts undefined.
//!
//! The set of handler kinds is closed and enumerated by [`Property`].

mod array;
mod bytes;
mod context;
mod link;
mod number;
mod object;
mod pattern;
mod string;

use std::sync::Arc;

use iscn_types::Value;
use serde_json::Value as Json;

use crate::error::{SchemaError, SchemaResult};
use crate::resolve::Resolution;
use crate::schema::Schema;

pub use array::ArrayProperty;
pub use bytes::BytesProperty;
pub use context::{ContextProperty, CONTEXT_KEY};
pub use link::{LinkOrTextProperty, LinkProperty};
pub use number::{NumberKind, NumberProperty};
pub use object::ObjectProperty;
pub use pattern::{PatternProperty, PatternSpec, UrlProperty};
pub use string::{FilteredProperty, TextProperty};

// ---------------------------------------------------------------------------
// Handler contract
// ---------------------------------------------------------------------------

/// Capability contract shared by every handler kind.
pub trait PropertyHandler {
    /// Field name, unique within a schema.
    fn key(&self) -> &str;

    /// Whether the field must be present.
    fn is_required(&self) -> bool;

    /// Whether the handler currently holds a validated value.
    fn is_defined(&self) -> bool;

    /// A fresh, undefined instance configured like this one.
    fn prototype(&self) -> Self
    where
        Self: Sized;

    /// Validate and store an input value.
    ///
    /// On failure the handler is left undefined.
    fn set(&mut self, value: &Value) -> SchemaResult<()>;

    /// The stored value in its structured form, if defined.
    fn value(&self) -> Option<Value>;

    /// The canonical wire form of the stored value.
    fn encode(&self) -> SchemaResult<Value>;

    /// Validate and store a wire value, returning its structured form.
    fn decode(&mut self, wire: &Value) -> SchemaResult<Value>;

    /// Human JSON projection. `null` when undefined.
    fn to_json(&self) -> Json;

    /// Resolve `path` starting at this field.
    fn resolve<'a>(&'a self, path: &[&str]) -> SchemaResult<Resolution<'a>>;
}

// ---------------------------------------------------------------------------
// Shared handler state
// ---------------------------------------------------------------------------

/// Key and required flag common to every handler.
#[derive(Clone, Debug)]
pub(crate) struct Meta {
    key: Arc<str>,
    required: bool,
}

impl Meta {
    pub(crate) fn new(key: &str, required: bool) -> Self {
        Self {
            key: Arc::from(key),
            required,
        }
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn required(&self) -> bool {
        self.required
    }

    pub(crate) fn mismatch(&self, expected: &str, found: &Value) -> SchemaError {
        SchemaError::type_mismatch(&self.key, expected, found.type_name())
    }

    pub(crate) fn undefined(&self) -> SchemaError {
        SchemaError::Internal(format!("property {:?} is not defined", self.key()))
    }
}

/// Error for a path that continues past a leaf value.
pub(crate) fn past_leaf(key: &str, path: &[&str]) -> SchemaError {
    SchemaError::NoSuchLink(format!("unexpected path elements past {key}: {}", path.join("/")))
}

// ---------------------------------------------------------------------------
// Closed handler set
// ---------------------------------------------------------------------------

/// Every handler kind a schema may declare.
#[derive(Clone, Debug)]
pub enum Property {
    Text(TextProperty),
    Filtered(FilteredProperty),
    Pattern(PatternProperty),
    Url(UrlProperty),
    Number(NumberProperty),
    Bytes(BytesProperty),
    Link(LinkProperty),
    LinkOrText(LinkOrTextProperty),
    Array(ArrayProperty),
    Object(ObjectProperty),
}

macro_rules! dispatch {
    ($self:expr, $h:ident => $body:expr) => {
        match $self {
            Property::Text($h) => $body,
            Property::Filtered($h) => $body,
            Property::Pattern($h) => $body,
            Property::Url($h) => $body,
            Property::Number($h) => $body,
            Property::Bytes($h) => $body,
            Property::Link($h) => $body,
            Property::LinkOrText($h) => $body,
            Property::Array($h) => $body,
            Property::Object($h) => $body,
        }
    };
}

impl Property {
    /// Free-form text.
    pub fn text(key: &str, required: bool) -> Self {
        Self::Text(TextProperty::new(key, required))
    }

    /// Text restricted to a closed set of values.
    pub fn filtered(key: &str, required: bool, allowed: &[&str]) -> Self {
        Self::Filtered(FilteredProperty::new(key, required, allowed))
    }

    /// Text that must fully match `expr`.
    pub fn pattern(key: &str, required: bool, expr: &str) -> SchemaResult<Self> {
        Ok(Self::Pattern(PatternProperty::new(
            key,
            required,
            PatternSpec::compile(expr)?,
        )))
    }

    /// ISO 8601 timestamp with a mandatory zone designator.
    pub fn timestamp(key: &str, required: bool) -> Self {
        Self::Pattern(PatternProperty::new(key, required, PatternSpec::timestamp()))
    }

    /// Content hash URI, `hash://<algorithm>/<hex>`.
    pub fn hash_uri(key: &str, required: bool) -> Self {
        Self::Pattern(PatternProperty::new(key, required, PatternSpec::hash_uri()))
    }

    /// LikeCoin chain address URI.
    pub fn chain_address(key: &str, required: bool) -> Self {
        Self::Pattern(PatternProperty::new(
            key,
            required,
            PatternSpec::chain_address(),
        ))
    }

    /// Absolute http, https, or ftp URL.
    pub fn url(key: &str, required: bool) -> Self {
        Self::Url(UrlProperty::new(key, required))
    }

    /// Integer of the given width and signedness.
    pub fn number(key: &str, required: bool, kind: NumberKind) -> Self {
        Self::Number(NumberProperty::new(key, required, kind))
    }

    /// Byte string of exactly `len` bytes.
    pub fn bytes(key: &str, required: bool, len: usize) -> Self {
        Self::Bytes(BytesProperty::new(key, required, len))
    }

    /// Content link, optionally scoped to one codec tag.
    pub fn link(key: &str, required: bool, codec: Option<u64>) -> Self {
        Self::Link(LinkProperty::new(key, required, codec))
    }

    /// Either a content link or a URL string.
    pub fn link_or_text(key: &str, required: bool, codec: Option<u64>) -> Self {
        Self::LinkOrText(LinkOrTextProperty::new(key, required, codec))
    }

    /// Sequence whose items are handled by `element`.
    pub fn array(key: &str, required: bool, element: Property) -> Self {
        Self::Array(ArrayProperty::new(key, required, element))
    }

    /// Embedded object of another schema.
    pub fn object(key: &str, required: bool, schema: Arc<Schema>) -> Self {
        Self::Object(ObjectProperty::new(key, required, schema))
    }

    /// Short name of the handler kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Filtered(_) => "filtered",
            Self::Pattern(_) => "pattern",
            Self::Url(_) => "url",
            Self::Number(h) => h.kind().name(),
            Self::Bytes(_) => "bytes",
            Self::Link(_) => "link",
            Self::LinkOrText(_) => "link-or-text",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    pub fn as_array(&self) -> Option<&ArrayProperty> {
        match self {
            Self::Array(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectProperty> {
        match self {
            Self::Object(h) => Some(h),
            _ => None,
        }
    }
}

impl PropertyHandler for Property {
    fn key(&self) -> &str {
        dispatch!(self, h => h.key())
    }

    fn is_required(&self) -> bool {
        dispatch!(self, h => h.is_required())
    }

    fn is_defined(&self) -> bool {
        dispatch!(self, h => h.is_defined())
    }

    fn prototype(&self) -> Self {
        match self {
            Self::Text(h) => Self::Text(h.prototype()),
            Self::Filtered(h) => Self::Filtered(h.prototype()),
            Self::Pattern(h) => Self::Pattern(h.prototype()),
            Self::Url(h) => Self::Url(h.prototype()),
            Self::Number(h) => Self::Number(h.prototype()),
            Self::Bytes(h) => Self::Bytes(h.prototype()),
            Self::Link(h) => Self::Link(h.prototype()),
            Self::LinkOrText(h) => Self::LinkOrText(h.prototype()),
            Self::Array(h) => Self::Array(h.prototype()),
            Self::Object(h) => Self::Object(h.prototype()),
        }
    }

    fn set(&mut self, value: &Value) -> SchemaResult<()> {
        dispatch!(self, h => h.set(value))
    }

    fn value(&self) -> Option<Value> {
        dispatch!(self, h => h.value())
    }

    fn encode(&self) -> SchemaResult<Value> {
        dispatch!(self, h => h.encode())
    }

    fn decode(&mut self, wire: &Value) -> SchemaResult<Value> {
        dispatch!(self, h => h.decode(wire))
    }

    fn to_json(&self) -> Json {
        dispatch!(self, h => h.to_json())
    }

    fn resolve<'a>(&'a self, path: &[&str]) -> SchemaResult<Resolution<'a>> {
        dispatch!(self, h => h.resolve(path))
    }
}
