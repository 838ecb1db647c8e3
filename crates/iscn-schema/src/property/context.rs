use iscn_types::Value;
use serde_json::Value as Json;

use super::{past_leaf, PropertyHandler};
use crate::error::{SchemaError, SchemaResult};
use crate::resolve::{Resolution, Resolved};

/// Key of the context field.
pub const CONTEXT_KEY: &str = "context";

/// Synthetic first field of every top-level object.
///
/// Contributes only the schema version to the canonical form and projects to
/// the schema URL in JSON. Always defined; setting or decoding it only checks
/// that the supplied version is this schema's version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextProperty {
    base_url: String,
    version: u64,
}

impl ContextProperty {
    pub fn new(base_url: impl Into<String>, version: u64) -> Self {
        Self {
            base_url: base_url.into(),
            version,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Schema URL, `<base>-v<version>`.
    pub fn url(&self) -> String {
        format!("{}-v{}", self.base_url, self.version)
    }

    /// Read the version number out of a wire context value.
    pub fn read_version(wire: &Value) -> SchemaResult<u64> {
        match wire {
            Value::Integer(n) => u64::try_from(*n).map_err(|_| {
                SchemaError::type_mismatch(CONTEXT_KEY, "version number", n.to_string())
            }),
            other => Err(SchemaError::type_mismatch(
                CONTEXT_KEY,
                "version number",
                other.type_name(),
            )),
        }
    }
}

impl PropertyHandler for ContextProperty {
    fn key(&self) -> &str {
        CONTEXT_KEY
    }

    fn is_required(&self) -> bool {
        true
    }

    fn is_defined(&self) -> bool {
        true
    }

    fn prototype(&self) -> Self {
        self.clone()
    }

    fn set(&mut self, value: &Value) -> SchemaResult<()> {
        let version = Self::read_version(value)?;
        if version != self.version {
            return Err(SchemaError::MalformedWire(format!(
                "context names version {version} but the schema is version {}",
                self.version
            )));
        }
        Ok(())
    }

    fn value(&self) -> Option<Value> {
        Some(Value::from(self.version))
    }

    fn encode(&self) -> SchemaResult<Value> {
        Ok(Value::from(self.version))
    }

    fn decode(&mut self, wire: &Value) -> SchemaResult<Value> {
        self.set(wire)?;
        self.encode()
    }

    fn to_json(&self) -> Json {
        Json::String(self.url())
    }

    fn resolve<'a>(&'a self, path: &[&str]) -> SchemaResult<Resolution<'a>> {
        if !path.is_empty() {
            return Err(past_leaf(CONTEXT_KEY, path));
        }
        Ok(Resolution::done(Resolved::Value(Value::Text(self.url()))))
    }
}
