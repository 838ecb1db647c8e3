use iscn_types::Value;
use serde_json::Value as Json;

use super::{Meta, Property, PropertyHandler};
use crate::error::{SchemaError, SchemaResult};
use crate::resolve::{Resolution, Resolved};

/// Sequence of items, each handled by a fresh prototype of one element
/// template.
///
/// Item failures are annotated with the item's index.
#[derive(Clone, Debug)]
pub struct ArrayProperty {
    meta: Meta,
    element: Box<Property>,
    items: Option<Vec<Property>>,
}

impl ArrayProperty {
    pub fn new(key: &str, required: bool, element: Property) -> Self {
        Self {
            meta: Meta::new(key, required),
            element: Box::new(element),
            items: None,
        }
    }

    /// The element template.
    pub fn element(&self) -> &Property {
        &self.element
    }

    /// The item handlers, if defined.
    pub fn items(&self) -> Option<&[Property]> {
        self.items.as_deref()
    }

    pub fn len(&self) -> usize {
        self.items.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fill<F>(&mut self, input: &Value, expected: &str, mut apply: F) -> SchemaResult<()>
    where
        F: FnMut(&mut Property, &Value) -> SchemaResult<()>,
    {
        self.items = None;
        let input = match input {
            Value::Array(items) => items,
            other => return Err(self.meta.mismatch(expected, other)),
        };
        let mut items = Vec::with_capacity(input.len());
        for (index, value) in input.iter().enumerate() {
            let mut item = self.element.prototype();
            apply(&mut item, value).map_err(|e| e.at_index(index))?;
            items.push(item);
        }
        self.items = Some(items);
        Ok(())
    }

    fn defined_items(&self) -> SchemaResult<&[Property]> {
        self.items.as_deref().ok_or_else(|| self.meta.undefined())
    }
}

impl PropertyHandler for ArrayProperty {
    fn key(&self) -> &str {
        self.meta.key()
    }

    fn is_required(&self) -> bool {
        self.meta.required()
    }

    fn is_defined(&self) -> bool {
        self.items.is_some()
    }

    fn prototype(&self) -> Self {
        Self {
            meta: self.meta.clone(),
            element: self.element.clone(),
            items: None,
        }
    }

    fn set(&mut self, value: &Value) -> SchemaResult<()> {
        self.fill(value, "array", |item, v| item.set(v))
    }

    fn value(&self) -> Option<Value> {
        let items = self.items.as_ref()?;
        items
            .iter()
            .map(Property::value)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array)
    }

    fn encode(&self) -> SchemaResult<Value> {
        self.defined_items()?
            .iter()
            .enumerate()
            .map(|(index, item)| item.encode().map_err(|e| e.at_index(index)))
            .collect::<SchemaResult<Vec<_>>>()
            .map(Value::Array)
    }

    fn decode(&mut self, wire: &Value) -> SchemaResult<Value> {
        self.fill(wire, "array", |item, v| item.decode(v).map(drop))?;
        self.value().ok_or_else(|| self.meta.undefined())
    }

    fn to_json(&self) -> Json {
        match &self.items {
            Some(items) => Json::Array(items.iter().map(Property::to_json).collect()),
            None => Json::Null,
        }
    }

    fn resolve<'a>(&'a self, path: &[&str]) -> SchemaResult<Resolution<'a>> {
        let items = self
            .items
            .as_deref()
            .ok_or_else(|| SchemaError::NoSuchLink(self.key().into()))?;

        let Some((first, rest)) = path.split_first() else {
            let nodes = items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    item.resolve(&[])
                        .map(|r| r.node)
                        .map_err(|e| e.at_index(index))
                })
                .collect::<SchemaResult<Vec<_>>>()?;
            return Ok(Resolution::done(Resolved::List(nodes)));
        };

        let index: u64 = first.parse().map_err(|_| {
            SchemaError::NoSuchLink(format!(
                "unexpected path elements past {}: {first} is not an index",
                self.key()
            ))
        })?;
        let item = usize::try_from(index)
            .ok()
            .and_then(|i| items.get(i))
            .ok_or(SchemaError::IndexOutOfRange {
                index,
                len: items.len(),
            })?;
        item.resolve(rest)
    }
}
