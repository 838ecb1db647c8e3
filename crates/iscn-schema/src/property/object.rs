use std::sync::Arc;

use iscn_types::Value;
use serde_json::Value as Json;

use super::{Meta, PropertyHandler};
use crate::error::{SchemaError, SchemaResult};
use crate::object::SchemaObject;
use crate::resolve::Resolution;
use crate::schema::{ObjectFactory, Schema};

/// An object of another schema embedded as a field.
///
/// The embedded object is marked nested: it carries no context and is not
/// independently addressed. Every operation delegates to it.
#[derive(Clone, Debug)]
pub struct ObjectProperty {
    meta: Meta,
    schema: Arc<Schema>,
    object: Option<Box<SchemaObject>>,
}

impl ObjectProperty {
    pub fn new(key: &str, required: bool, schema: Arc<Schema>) -> Self {
        Self {
            meta: Meta::new(key, required),
            schema,
            object: None,
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The embedded object, if defined.
    pub fn object(&self) -> Option<&SchemaObject> {
        self.object.as_deref()
    }

    fn fresh(&self) -> SchemaObject {
        let mut object = self.schema.instantiate();
        object.mark_nested();
        object
    }

    fn expect_map<'v>(&self, value: &'v Value) -> SchemaResult<&'v iscn_types::Fields> {
        match value {
            Value::Map(fields) => Ok(fields),
            other => Err(self.meta.mismatch("map", other)),
        }
    }
}

impl PropertyHandler for ObjectProperty {
    fn key(&self) -> &str {
        self.meta.key()
    }

    fn is_required(&self) -> bool {
        self.meta.required()
    }

    fn is_defined(&self) -> bool {
        self.object.is_some()
    }

    fn prototype(&self) -> Self {
        Self {
            meta: self.meta.clone(),
            schema: Arc::clone(&self.schema),
            object: None,
        }
    }

    fn set(&mut self, value: &Value) -> SchemaResult<()> {
        self.object = None;
        let fields = self.expect_map(value)?;
        let mut object = self.fresh();
        object.set_data(fields)?;
        self.object = Some(Box::new(object));
        Ok(())
    }

    fn value(&self) -> Option<Value> {
        self.object.as_ref().map(|o| Value::Map(o.to_fields()))
    }

    fn encode(&self) -> SchemaResult<Value> {
        let object = self.object.as_ref().ok_or_else(|| self.meta.undefined())?;
        Ok(Value::Map(object.encode_fields()?))
    }

    fn decode(&mut self, wire: &Value) -> SchemaResult<Value> {
        self.object = None;
        let fields = self.expect_map(wire)?;
        let mut object = self.fresh();
        object.decode(fields)?;
        let value = Value::Map(object.to_fields());
        self.object = Some(Box::new(object));
        Ok(value)
    }

    fn to_json(&self) -> Json {
        self.object.as_ref().map_or(Json::Null, |o| o.get_data())
    }

    fn resolve<'a>(&'a self, path: &[&str]) -> SchemaResult<Resolution<'a>> {
        self.object
            .as_deref()
            .ok_or_else(|| SchemaError::NoSuchLink(self.key().into()))?
            .resolve(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Property;
    use crate::resolve::Resolved;
    use crate::schema::SchemaBuilder;
    use iscn_types::Fields;

    fn period() -> Arc<Schema> {
        SchemaBuilder::new(0x033f, "timeperiod", 1)
            .property(Property::timestamp("from", false))
            .property(Property::timestamp("to", false))
            .build()
            .unwrap()
    }

    #[test]
    fn nested_objects_carry_no_context() {
        let mut h = ObjectProperty::new("period", false, period());
        let input = Fields::new().with("from", "2024-03-01T12:00:00Z");
        h.set(&Value::Map(input.clone())).unwrap();

        let object = h.object().unwrap();
        assert!(object.is_nested());
        let wire = h.encode().unwrap();
        let wire_map = wire.as_map().unwrap();
        assert!(!wire_map.contains_key("context"));
        assert_eq!(wire_map.get("from"), Some(&Value::from("2024-03-01T12:00:00Z")));

        let json = h.to_json();
        assert!(json.get("context").is_none());
        assert_eq!(json["from"], "2024-03-01T12:00:00Z");

        let mut fresh = h.prototype();
        assert_eq!(fresh.decode(&wire).unwrap(), Value::Map(input));
    }

    #[test]
    fn errors_propagate_from_nested_fields() {
        let mut h = ObjectProperty::new("period", false, period());
        let input = Fields::new().with("from", "yesterday");
        let err = h.set(&Value::Map(input)).unwrap_err();
        assert!(matches!(err, SchemaError::ConstraintViolation { ref key, .. } if key == "from"));
        assert!(!h.is_defined());

        assert!(matches!(
            h.set(&Value::from("x")),
            Err(SchemaError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn resolution_delegates() {
        let mut h = ObjectProperty::new("period", false, period());
        h.set(&Value::Map(Fields::new().with("to", "2024-03-01T12:00:00Z")))
            .unwrap();
        assert!(matches!(h.resolve(&[]).unwrap().node, Resolved::Object(_)));
        assert!(matches!(
            h.resolve(&["to"]).unwrap().node,
            Resolved::Value(Value::Text(_))
        ));
        assert!(matches!(h.resolve(&["from"]), Err(SchemaError::NoSuchLink(_))));
    }
}
