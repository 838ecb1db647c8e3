use std::fmt;
use std::sync::{Arc, LazyLock};

use iscn_types::Value;
use regex::Regex;
use serde_json::Value as Json;
use url::Url;

use super::{Meta, PropertyHandler, TextProperty};
use crate::error::{SchemaError, SchemaResult};
use crate::resolve::Resolution;

/// ISO 8601 date-time with seconds and a mandatory zone designator.
pub const TIMESTAMP_PATTERN: &str = concat!(
    r"[0-9]{4}-(?:1[0-2]|0[1-9])-(?:3[01]|0[1-9]|[12][0-9])",
    r"T(?:2[0-3]|[01][0-9]):[0-5][0-9]:[0-5][0-9]",
    r"(?:Z|[+-](?:2[0-3]|[01][0-9]):[0-5][0-9])",
);

/// `hash://<algorithm>/<lowercase hex digest>`.
pub const HASH_URI_PATTERN: &str = r"hash://[^/]+/[0-9a-f]+";

/// LikeCoin chain address: `lcc://id/` followed by a bech32 cosmos address.
pub const CHAIN_ADDRESS_PATTERN: &str = r"lcc://id/cosmos1[02-9ac-hj-np-z]{38}";

/// URL schemes accepted by [`UrlProperty`].
pub const URL_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

static TIMESTAMP: LazyLock<Arc<PatternSpec>> = LazyLock::new(|| builtin(TIMESTAMP_PATTERN));
static HASH_URI: LazyLock<Arc<PatternSpec>> = LazyLock::new(|| builtin(HASH_URI_PATTERN));
static CHAIN_ADDRESS: LazyLock<Arc<PatternSpec>> =
    LazyLock::new(|| builtin(CHAIN_ADDRESS_PATTERN));

fn builtin(expr: &str) -> Arc<PatternSpec> {
    PatternSpec::compile(expr).expect("built-in pattern compiles")
}

/// A compiled pattern that must match a whole string.
pub struct PatternSpec {
    source: String,
    regex: Regex,
}

impl PatternSpec {
    /// Compile `expr`, anchored at both ends.
    pub fn compile(expr: &str) -> SchemaResult<Arc<Self>> {
        let regex = Regex::new(&format!("^(?:{expr})$")).map_err(|e| SchemaError::InvalidPattern {
            pattern: expr.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Arc::new(Self {
            source: expr.to_string(),
            regex,
        }))
    }

    pub fn timestamp() -> Arc<Self> {
        Arc::clone(&TIMESTAMP)
    }

    pub fn hash_uri() -> Arc<Self> {
        Arc::clone(&HASH_URI)
    }

    pub fn chain_address() -> Arc<Self> {
        Arc::clone(&CHAIN_ADDRESS)
    }

    /// The expression as written, without anchors.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }
}

impl fmt::Debug for PatternSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PatternSpec").field(&self.source).finish()
    }
}

/// Text that must fully match a pattern.
#[derive(Clone, Debug)]
pub struct PatternProperty {
    text: TextProperty,
    pattern: Arc<PatternSpec>,
}

impl PatternProperty {
    pub fn new(key: &str, required: bool, pattern: Arc<PatternSpec>) -> Self {
        Self {
            text: TextProperty::new(key, required),
            pattern,
        }
    }

    pub fn pattern(&self) -> &PatternSpec {
        &self.pattern
    }

    pub fn get(&self) -> Option<&str> {
        self.text.get()
    }
}

impl PropertyHandler for PatternProperty {
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
            pattern: Arc::clone(&self.pattern),
        }
    }

    fn set(&mut self, value: &Value) -> SchemaResult<()> {
        self.text.value = None;
        let s = TextProperty::accept(&self.text.meta, value)?;
        if !self.pattern.is_match(&s) {
            return Err(SchemaError::constraint(
                self.key(),
                format!("{s:?} must match the pattern {}", self.pattern.source()),
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

/// Absolute URL with an http, https, or ftp scheme.
#[derive(Clone, Debug)]
pub struct UrlProperty {
    text: TextProperty,
}

impl UrlProperty {
    pub fn new(key: &str, required: bool) -> Self {
        Self {
            text: TextProperty::new(key, required),
        }
    }

    pub fn get(&self) -> Option<&str> {
        self.text.get()
    }

    pub(crate) fn check(meta: &Meta, s: &str) -> SchemaResult<()> {
        let url = Url::parse(s)
            .map_err(|e| SchemaError::constraint(meta.key(), format!("invalid URL {s:?}: {e}")))?;
        if !URL_SCHEMES.contains(&url.scheme()) {
            return Err(SchemaError::constraint(
                meta.key(),
                format!("scheme {:?} is not one of http, https, ftp", url.scheme()),
            ));
        }
        Ok(())
    }
}

impl PropertyHandler for UrlProperty {
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
        }
    }

    fn set(&mut self, value: &Value) -> SchemaResult<()> {
        self.text.value = None;
        let s = TextProperty::accept(&self.text.meta, value)?;
        Self::check(&self.text.meta, &s)?;
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
