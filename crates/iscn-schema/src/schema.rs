use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{SchemaError, SchemaResult};
use crate::object::SchemaObject;
use crate::property::{ContextProperty, Property, PropertyHandler, CONTEXT_KEY};

/// Cross-field check run after every property of an object is set or
/// decoded.
pub type Validator = Arc<dyn Fn(&SchemaObject) -> SchemaResult<()> + Send + Sync>;

/// Produces fresh, undefined objects of one schema version.
pub trait ObjectFactory: Send + Sync {
    fn instantiate(&self) -> SchemaObject;
}

impl<F> ObjectFactory for F
where
    F: Fn() -> SchemaObject + Send + Sync,
{
    fn instantiate(&self) -> SchemaObject {
        self()
    }
}

/// Immutable template for one version of one document kind.
///
/// Holds the handler templates in declaration order. Objects are created
/// from it with [`ObjectFactory::instantiate`], which prototypes every
/// handler; the template itself is never mutated after [`SchemaBuilder::build`].
pub struct Schema {
    codec: u64,
    name: Arc<str>,
    context: ContextProperty,
    properties: Vec<Property>,
    index: Arc<HashMap<String, usize>>,
    validator: Option<Validator>,
}

impl Schema {
    pub fn codec(&self) -> u64 {
        self.codec
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u64 {
        self.context.version()
    }

    pub fn context(&self) -> &ContextProperty {
        &self.context
    }

    /// Handler templates in declaration order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.index.get(key).map(|&i| &self.properties[i])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.key())
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }
}

impl ObjectFactory for Schema {
    fn instantiate(&self) -> SchemaObject {
        SchemaObject::from_parts(
            self.codec,
            Arc::clone(&self.name),
            self.context.prototype(),
            self.properties.iter().map(Property::prototype).collect(),
            Arc::clone(&self.index),
            self.validator.clone(),
        )
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("codec", &format_args!("0x{:x}", self.codec))
            .field("name", &self.name)
            .field("version", &self.version())
            .field("keys", &self.keys().collect::<Vec<_>>())
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// Builder for [`Schema`].
///
/// ```
/// use iscn_schema::{Property, SchemaBuilder};
///
/// let entity = SchemaBuilder::new(0x0268, "entity", 1)
///     .property(Property::text("id", true))
///     .property(Property::text("name", false))
///     .build()
///     .unwrap();
/// assert_eq!(entity.context().url(), "https://iscn/entity-v1");
/// ```
pub struct SchemaBuilder {
    codec: u64,
    name: String,
    version: u64,
    base_url: Option<String>,
    properties: Vec<Property>,
    validator: Option<Validator>,
}

impl SchemaBuilder {
    pub fn new(codec: u64, name: impl Into<String>, version: u64) -> Self {
        Self {
            codec,
            name: name.into(),
            version,
            base_url: None,
            properties: Vec::new(),
            validator: None,
        }
    }

    /// Base of the schema URL. Defaults to `https://iscn/<name>`.
    pub fn context_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = Some(base.into());
        self
    }

    /// Append a property. Declaration order is canonical order.
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn properties(mut self, properties: impl IntoIterator<Item = Property>) -> Self {
        self.properties.extend(properties);
        self
    }

    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&SchemaObject) -> SchemaResult<()> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn build(self) -> SchemaResult<Arc<Schema>> {
        if self.version == 0 {
            return Err(SchemaError::UnimplementedVersion {
                name: self.name,
                version: 0,
            });
        }

        let mut index = HashMap::with_capacity(self.properties.len());
        for (i, property) in self.properties.iter().enumerate() {
            let key = property.key();
            if key == CONTEXT_KEY || index.insert(key.to_string(), i).is_some() {
                return Err(SchemaError::DuplicateProperty(key.to_string()));
            }
        }

        let base_url = self
            .base_url
            .unwrap_or_else(|| format!("https://iscn/{}", self.name));
        Ok(Arc::new(Schema {
            codec: self.codec,
            name: Arc::from(self.name),
            context: ContextProperty::new(base_url, self.version),
            properties: self.properties,
            index: Arc::new(index),
            validator: self.validator,
        }))
    }
}
