//! Schema object instances.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use iscn_codec::encode_fields;
use iscn_crypto::ContentHasher;
use iscn_types::{Cid, Fields, HashAlgorithm, Value};
use serde::{Serialize, Serializer};
use serde_json::{Map as JsonMap, Value as Json};
use tracing::debug;

use crate::error::{SchemaError, SchemaResult};
use crate::property::{ContextProperty, Property, PropertyHandler, CONTEXT_KEY};
use crate::resolve::{split_path, Link, Resolution, Resolved};
use crate::schema::Validator;

#[derive(Clone, Debug)]
struct Encoded {
    bytes: Vec<u8>,
    cid: Cid,
}

/// One document of one schema version.
///
/// Created undefined from a [`Schema`](crate::Schema) template, populated by
/// [`set_data`](Self::set_data) or [`decode`](Self::decode), then encoded.
/// A failed population leaves the object undefined; callers discard it
/// rather than retry in place.
#[derive(Clone)]
pub struct SchemaObject {
    codec: u64,
    name: Arc<str>,
    context: ContextProperty,
    properties: Vec<Property>,
    index: Arc<HashMap<String, usize>>,
    validator: Option<Validator>,
    nested: bool,
    hasher: ContentHasher,
    values: Fields,
    custom: Fields,
    encoded: Option<Encoded>,
}

impl SchemaObject {
    pub(crate) fn from_parts(
        codec: u64,
        name: Arc<str>,
        context: ContextProperty,
        properties: Vec<Property>,
        index: Arc<HashMap<String, usize>>,
        validator: Option<Validator>,
    ) -> Self {
        Self {
            codec,
            name,
            context,
            properties,
            index,
            validator,
            nested: false,
            hasher: ContentHasher::default(),
            values: Fields::new(),
            custom: Fields::new(),
            encoded: None,
        }
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

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

    pub fn is_nested(&self) -> bool {
        self.nested
    }

    /// Mark this object as embedded in another: its context is dropped from
    /// both the canonical form and the JSON projection.
    pub fn mark_nested(&mut self) {
        self.nested = true;
        self.encoded = None;
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hasher.algorithm()
    }

    /// Choose the hash the next [`encode`](Self::encode) derives the CID with.
    pub fn set_hash_algorithm(&mut self, algorithm: HashAlgorithm) {
        self.hasher = ContentHasher::new(algorithm);
        self.encoded = None;
    }

    /// CID from the last successful [`encode`](Self::encode).
    pub fn cid(&self) -> Option<Cid> {
        self.encoded.as_ref().map(|e| e.cid)
    }

    /// Canonical bytes from the last successful [`encode`](Self::encode).
    pub fn raw_data(&self) -> Option<&[u8]> {
        self.encoded.as_ref().map(|e| e.bytes.as_slice())
    }

    // -----------------------------------------------------------------------
    // Population
    // -----------------------------------------------------------------------

    fn reset(&mut self) {
        for property in &mut self.properties {
            *property = property.prototype();
        }
        self.values.clear();
        self.custom.clear();
        self.encoded = None;
    }

    /// Populate from structured input.
    ///
    /// A declared key holding null counts as absent. Input keys the schema
    /// does not declare are kept verbatim, in input order, as custom fields.
    /// A `context` key in the input is ignored.
    pub fn set_data(&mut self, fields: &Fields) -> SchemaResult<()> {
        self.populate(fields, |property, value| property.set(value).map(|()| None))
    }

    /// Populate from a wire map.
    ///
    /// The wire's own context is not consulted here; version dispatch and
    /// the context check happen in [`CodecRegistry::decode`](crate::CodecRegistry::decode).
    pub fn decode(&mut self, wire: &Fields) -> SchemaResult<()> {
        self.populate(wire, |property, value| property.decode(value).map(Some))
    }

    fn populate<F>(&mut self, input: &Fields, mut apply: F) -> SchemaResult<()>
    where
        F: FnMut(&mut Property, &Value) -> SchemaResult<Option<Value>>,
    {
        self.reset();
        let result = self.populate_inner(input, &mut apply);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn populate_inner<F>(&mut self, input: &Fields, apply: &mut F) -> SchemaResult<()>
    where
        F: FnMut(&mut Property, &Value) -> SchemaResult<Option<Value>>,
    {
        for property in &mut self.properties {
            let key = property.key().to_string();
            match input.get(&key).filter(|v| !v.is_null()) {
                Some(value) => {
                    let stored = match apply(property, value)? {
                        Some(decoded) => decoded,
                        None => property.value().ok_or_else(|| {
                            SchemaError::Internal(format!("{key} is undefined after set"))
                        })?,
                    };
                    self.values.insert(key, stored);
                }
                None if property.is_required() => {
                    return Err(SchemaError::MissingRequiredProperty { key });
                }
                None => {}
            }
        }

        for (key, value) in input.iter() {
            if key != CONTEXT_KEY && !self.index.contains_key(key) {
                self.custom.insert(key, value.clone());
            }
        }

        self.validate()
    }

    /// Run the attached cross-field validator, if any.
    pub fn validate(&self) -> SchemaResult<()> {
        let Some(validator) = &self.validator else {
            return Ok(());
        };
        validator(self).map_err(|e| match e {
            SchemaError::ValidationError(_) => e,
            other => SchemaError::ValidationError(other.to_string()),
        })
    }

    // -----------------------------------------------------------------------
    // Encoding
    // -----------------------------------------------------------------------

    /// The wire map: context (unless nested), defined properties in
    /// declaration order, then custom fields in their original order.
    pub fn encode_fields(&self) -> SchemaResult<Fields> {
        let mut wire = Fields::with_capacity(self.properties.len() + self.custom.len() + 1);
        if !self.nested {
            wire.insert(CONTEXT_KEY, self.context.encode()?);
        }
        for property in &self.properties {
            if property.is_defined() {
                wire.insert(property.key(), property.encode()?);
            } else if property.is_required() {
                return Err(SchemaError::Internal(format!(
                    "required property {:?} is undefined at encode",
                    property.key()
                )));
            }
        }
        for (key, value) in self.custom.iter() {
            wire.insert(key, value.clone());
        }
        Ok(wire)
    }

    /// Canonicalize, derive the CID, and cache both.
    pub fn encode(&mut self) -> SchemaResult<Fields> {
        let wire = self.encode_fields()?;
        let bytes = encode_fields(&wire)?;
        let cid = self.hasher.cid(self.codec, &bytes);
        debug!(
            schema = %self.name,
            version = self.version(),
            cid = %cid,
            size = bytes.len(),
            "encoded object"
        );
        self.encoded = Some(Encoded { bytes, cid });
        Ok(wire)
    }

    // -----------------------------------------------------------------------
    // Projections
    // -----------------------------------------------------------------------

    /// Ordered JSON projection: context URL first (unless nested), defined
    /// properties in declaration order, custom fields last.
    pub fn get_data(&self) -> Json {
        let mut map = JsonMap::new();
        if !self.nested {
            map.insert(CONTEXT_KEY.to_string(), self.context.to_json());
        }
        for property in self.properties.iter().filter(|p| p.is_defined()) {
            map.insert(property.key().to_string(), property.to_json());
        }
        for (key, value) in self.custom.iter() {
            map.insert(key.to_string(), value.to_json());
        }
        Json::Object(map)
    }

    /// Structured values followed by custom fields, i.e. what
    /// [`set_data`](Self::set_data) would need to rebuild this object.
    pub fn to_fields(&self) -> Fields {
        let mut fields = self.values.clone();
        fields.extend(self.custom.clone());
        fields
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Structured values of the defined properties, in declaration order.
    pub fn values(&self) -> &Fields {
        &self.values
    }

    /// Fields the schema does not declare.
    pub fn custom(&self) -> &Fields {
        &self.custom
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.index.get(key).map(|&i| &self.properties[i])
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Structured value of a defined property.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn require(&self, key: &str) -> SchemaResult<&Value> {
        self.get(key)
            .ok_or_else(|| SchemaError::PropertyNotFound(key.to_string()))
    }

    pub fn get_string(&self, key: &str) -> SchemaResult<&str> {
        let value = self.require(key)?;
        value
            .as_str()
            .ok_or_else(|| SchemaError::type_mismatch(key, "text", value.type_name()))
    }

    pub fn get_bytes(&self, key: &str) -> SchemaResult<&[u8]> {
        let value = self.require(key)?;
        value
            .as_bytes()
            .ok_or_else(|| SchemaError::type_mismatch(key, "bytes", value.type_name()))
    }

    pub fn get_link(&self, key: &str) -> SchemaResult<Cid> {
        let value = self.require(key)?;
        value
            .as_link()
            .copied()
            .ok_or_else(|| SchemaError::type_mismatch(key, "link", value.type_name()))
    }

    pub fn get_array(&self, key: &str) -> SchemaResult<&[Value]> {
        let value = self.require(key)?;
        value
            .as_array()
            .ok_or_else(|| SchemaError::type_mismatch(key, "array", value.type_name()))
    }

    fn get_integer<T: TryFrom<i128>>(&self, key: &str, expected: &str) -> SchemaResult<T> {
        let value = self.require(key)?;
        let n = value
            .as_integer()
            .ok_or_else(|| SchemaError::type_mismatch(key, expected, value.type_name()))?;
        T::try_from(n).map_err(|_| SchemaError::type_mismatch(key, expected, n.to_string()))
    }

    pub fn get_i32(&self, key: &str) -> SchemaResult<i32> {
        self.get_integer(key, "int32")
    }

    pub fn get_u32(&self, key: &str) -> SchemaResult<u32> {
        self.get_integer(key, "uint32")
    }

    pub fn get_i64(&self, key: &str) -> SchemaResult<i64> {
        self.get_integer(key, "int64")
    }

    pub fn get_u64(&self, key: &str) -> SchemaResult<u64> {
        self.get_integer(key, "uint64")
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    /// Resolve `path` within this document, stopping at the first link.
    pub fn resolve<'a>(&'a self, path: &[&str]) -> SchemaResult<Resolution<'a>> {
        let Some((first, rest)) = path.split_first() else {
            return Ok(Resolution::done(Resolved::Object(self)));
        };
        match self.property(first) {
            Some(property) if property.is_defined() => property.resolve(rest),
            Some(_) => Err(SchemaError::NoSuchLink(first.to_string())),
            None => self.resolve_custom(first, rest),
        }
    }

    /// Resolve a slash-separated path.
    pub fn resolve_path<'a>(&'a self, path: &str) -> SchemaResult<Resolution<'a>> {
        self.resolve(&split_path(path))
    }

    /// Resolve `path` and require it to end on a link.
    pub fn resolve_link(&self, path: &[&str]) -> SchemaResult<(Link, Vec<String>)> {
        let resolution = self.resolve(path)?;
        match resolution.node {
            Resolved::Link(link) => Ok((link, resolution.remaining)),
            _ => Err(SchemaError::NotALink),
        }
    }

    fn resolve_custom<'a>(&'a self, first: &str, rest: &[&str]) -> SchemaResult<Resolution<'a>> {
        let mut current = self
            .custom
            .get(first)
            .ok_or_else(|| SchemaError::NoSuchLink(first.to_string()))?;
        let mut name = first;
        for (consumed, segment) in rest.iter().enumerate() {
            current = match current {
                Value::Link(cid) => {
                    return Ok(Resolution::partial(
                        Resolved::Link(Link {
                            name: name.to_string(),
                            cid: *cid,
                        }),
                        &rest[consumed..],
                    ));
                }
                Value::Map(fields) => fields
                    .get(segment)
                    .ok_or_else(|| SchemaError::NoSuchLink(segment.to_string()))?,
                Value::Array(items) => {
                    let index: u64 = segment.parse().map_err(|_| {
                        SchemaError::NoSuchLink(format!("{segment} is not an index of {name}"))
                    })?;
                    usize::try_from(index)
                        .ok()
                        .and_then(|i| items.get(i))
                        .ok_or(SchemaError::IndexOutOfRange {
                            index,
                            len: items.len(),
                        })?
                }
                _ => return Err(crate::property::past_leaf(name, &rest[consumed..])),
            };
            name = segment;
        }
        Ok(Resolution::done(match current {
            Value::Link(cid) => Resolved::Link(Link {
                name: name.to_string(),
                cid: *cid,
            }),
            other => Resolved::Value(other.clone()),
        }))
    }

    /// Every link held by this document, in field order. Unlike a plain
    /// top-level listing, this descends into array items, nested objects and
    /// custom fields, so a rights list reports each holder. Links are not
    /// followed into other documents.
    pub fn links(&self) -> Vec<Link> {
        let mut links = Vec::new();
        for property in self.properties.iter().filter(|p| p.is_defined()) {
            collect_property_links(property, property.key(), &mut links);
        }
        for (key, value) in self.custom.iter() {
            collect_value_links(value, key, &mut links);
        }
        links
    }
}

fn collect_property_links(property: &Property, name: &str, out: &mut Vec<Link>) {
    let push = |cid: Cid, out: &mut Vec<Link>| {
        out.push(Link {
            name: name.to_string(),
            cid,
        })
    };
    match property {
        Property::Link(h) => {
            if let Some(cid) = h.get() {
                push(cid, out);
            }
        }
        Property::LinkOrText(h) => {
            if let Some(cid) = h.get_link() {
                push(cid, out);
            }
        }
        Property::Array(h) => {
            for item in h.items().unwrap_or_default() {
                collect_property_links(item, name, out);
            }
        }
        Property::Object(h) => {
            if let Some(object) = h.object() {
                out.extend(object.links());
            }
        }
        _ => {}
    }
}

fn collect_value_links(value: &Value, name: &str, out: &mut Vec<Link>) {
    match value {
        Value::Link(cid) => out.push(Link {
            name: name.to_string(),
            cid: *cid,
        }),
        Value::Array(items) => {
            for item in items {
                collect_value_links(item, name, out);
            }
        }
        Value::Map(fields) => {
            for (key, item) in fields.iter() {
                collect_value_links(item, key, out);
            }
        }
        _ => {}
    }
}

impl fmt::Display for SchemaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} (v{})>", self.name, self.version())
    }
}

impl fmt::Debug for SchemaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaObject")
            .field("codec", &format_args!("0x{:x}", self.codec))
            .field("name", &self.name)
            .field("version", &self.version())
            .field("nested", &self.nested)
            .field("values", &self.values)
            .field("custom", &self.custom)
            .field("cid", &self.cid())
            .finish()
    }
}

impl Serialize for SchemaObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.get_data().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{entity_cid, work_input, work_schema};
    use crate::ObjectFactory;

    #[test]
    fn set_data_fills_values_in_declaration_order() {
        let mut work = work_schema().instantiate();
        work.set_data(&work_input()).unwrap();
        let keys: Vec<_> = work.values().keys().collect();
        assert_eq!(keys, vec!["title", "version", "timestamp", "author", "tags"]);
        assert_eq!(work.get_string("title").unwrap(), "A Title");
        assert_eq!(work.get_u64("version").unwrap(), 1);
        assert_eq!(work.get_link("author").unwrap(), entity_cid());
        assert_eq!(work.get_array("tags").unwrap().len(), 2);
        assert!(work.custom().is_empty());
    }

    #[test]
    fn missing_required_property() {
        let mut input = work_input();
        input.remove("title");
        let mut work = work_schema().instantiate();
        let err = work.set_data(&input).unwrap_err();
        assert!(matches!(err, SchemaError::MissingRequiredProperty { ref key } if key == "title"));
        assert!(work.values().is_empty());
        assert!(!work.property("version").unwrap().is_defined());
    }

    #[test]
    fn null_counts_as_absent_on_set() {
        let mut work = work_schema().instantiate();
        let input = work_input().with("sharing", Value::Null).with("period", Value::Null);
        work.set_data(&input).unwrap();
        assert!(!work.property("sharing").unwrap().is_defined());
        assert!(work.get("period").is_none());
        assert!(work.custom().is_empty());
        assert!(!work.encode().unwrap().contains_key("sharing"));

        let err = work
            .set_data(&work_input().with("title", Value::Null))
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingRequiredProperty { ref key } if key == "title"));
    }

    #[test]
    fn null_counts_as_absent_on_decode() {
        let mut work = work_schema().instantiate();
        work.set_data(&work_input()).unwrap();
        let wire = work.encode().unwrap();

        let mut decoded = work_schema().instantiate();
        decoded
            .decode(&wire.clone().with("sharing", Value::Null))
            .unwrap();
        assert!(!decoded.property("sharing").unwrap().is_defined());
        assert_eq!(decoded.values(), work.values());

        let err = decoded
            .decode(&wire.with("title", Value::Null))
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingRequiredProperty { ref key } if key == "title"));
    }

    #[test]
    fn unknown_fields_are_custom_and_context_is_ignored() {
        let mut input = work_input();
        input.insert("context", 99);
        input.insert("zeta", "last");
        input.insert("alpha", Fields::new().with("n", 1));
        let mut work = work_schema().instantiate();
        work.set_data(&input).unwrap();
        assert_eq!(work.custom().keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);

        let wire = work.encode().unwrap();
        let keys: Vec<_> = wire.keys().collect();
        assert_eq!(
            keys,
            vec!["context", "title", "version", "timestamp", "author", "tags", "zeta", "alpha"]
        );
        assert_eq!(wire.get("context"), Some(&Value::Integer(1)));
    }

    #[test]
    fn encode_caches_bytes_and_cid() {
        let mut work = work_schema().instantiate();
        work.set_data(&work_input()).unwrap();
        assert!(work.cid().is_none());
        work.encode().unwrap();
        let cid = work.cid().unwrap();
        assert_eq!(cid.codec(), work.codec());
        assert!(ContentHasher::verify(work.raw_data().unwrap(), &cid));
    }

    #[test]
    fn hash_algorithm_changes_cid() {
        let mut a = work_schema().instantiate();
        a.set_data(&work_input()).unwrap();
        a.encode().unwrap();
        let mut b = work_schema().instantiate();
        b.set_hash_algorithm(HashAlgorithm::Sha2_256);
        b.set_data(&work_input()).unwrap();
        b.encode().unwrap();
        assert_eq!(a.raw_data(), b.raw_data());
        assert_ne!(a.cid(), b.cid());
        assert_eq!(b.cid().unwrap().hash_algorithm().unwrap(), HashAlgorithm::Sha2_256);
    }

    #[test]
    fn json_projection_order() {
        let mut input = work_input();
        input.insert("extra", true);
        let mut work = work_schema().instantiate();
        work.set_data(&input).unwrap();
        let json = work.get_data();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["context", "title", "version", "timestamp", "author", "tags", "extra"]
        );
        assert_eq!(json["context"], "https://iscn/work-v1");
        assert_eq!(json["author"], serde_json::json!({"/": entity_cid().to_string()}));
        assert_eq!(serde_json::to_value(&work).unwrap(), json);
    }

    #[test]
    fn display() {
        let work = work_schema().instantiate();
        assert_eq!(work.to_string(), "<work (v1)>");
    }

    #[test]
    fn validator_failures_are_validation_errors() {
        let mut input = work_input();
        input.insert("version", 2);
        let mut work = work_schema().instantiate();
        let err = work.set_data(&input).unwrap_err();
        assert!(matches!(err, SchemaError::ValidationError(_)));
        assert!(work.values().is_empty());
    }

    #[test]
    fn resolve_paths() {
        let mut input = work_input();
        input.insert(
            "extra",
            Fields::new()
                .with("list", Value::Array(vec![Value::from("a"), Value::Link(entity_cid())]))
                .with("flag", true),
        );
        input.insert(
            "period",
            Fields::new().with("from", "2024-03-01T12:00:00Z"),
        );
        let mut work = work_schema().instantiate();
        work.set_data(&input).unwrap();

        let res = work.resolve(&[]).unwrap();
        assert!(matches!(res.node, Resolved::Object(o) if std::ptr::eq(o, &work)));

        let res = work.resolve(&["author"]).unwrap();
        assert!(res.remaining.is_empty());
        assert_eq!(res.node.as_link().unwrap().cid, entity_cid());

        let res = work.resolve_path("author/name").unwrap();
        assert_eq!(res.remaining, vec!["name".to_string()]);

        assert!(matches!(
            work.resolve(&["title", "x"]),
            Err(SchemaError::NoSuchLink(_))
        ));
        assert!(matches!(
            work.resolve(&["parent"]),
            Err(SchemaError::NoSuchLink(_))
        ));
        assert!(matches!(
            work.resolve(&["nothing"]),
            Err(SchemaError::NoSuchLink(_))
        ));

        let res = work.resolve(&["tags", "1"]).unwrap();
        assert!(matches!(res.node, Resolved::Value(Value::Text(ref s)) if s == "b"));

        let res = work.resolve(&["period", "from"]).unwrap();
        assert!(matches!(res.node, Resolved::Value(Value::Text(_))));

        let res = work.resolve_path("extra/list/0").unwrap();
        assert!(matches!(res.node, Resolved::Value(Value::Text(ref s)) if s == "a"));
        let res = work.resolve_path("extra/list/1/name").unwrap();
        assert_eq!(res.node.as_link().unwrap().cid, entity_cid());
        assert_eq!(res.remaining, vec!["name".to_string()]);
        assert!(matches!(
            work.resolve_path("extra/list/5"),
            Err(SchemaError::IndexOutOfRange { index: 5, len: 2 })
        ));
        assert!(matches!(
            work.resolve_path("extra/flag/x"),
            Err(SchemaError::NoSuchLink(_))
        ));
        assert!(matches!(
            work.resolve_path("extra/missing"),
            Err(SchemaError::NoSuchLink(_))
        ));
    }

    #[test]
    fn resolve_link_requires_a_link() {
        let mut work = work_schema().instantiate();
        work.set_data(&work_input()).unwrap();
        let (link, remaining) = work.resolve_link(&["author", "name"]).unwrap();
        assert_eq!(link.name, "author");
        assert_eq!(remaining, vec!["name".to_string()]);
        assert!(matches!(
            work.resolve_link(&["title"]),
            Err(SchemaError::NotALink)
        ));
    }

    #[test]
    fn links_are_collected_without_following() {
        let mut input = work_input();
        input.insert("see_also", Value::Array(vec![Value::Link(entity_cid())]));
        let mut work = work_schema().instantiate();
        work.set_data(&input).unwrap();
        let links = work.links();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].name, "author");
        assert_eq!(links[1].name, "see_also");
    }

    #[test]
    fn getters_report_missing_and_mismatched() {
        let mut work = work_schema().instantiate();
        work.set_data(&work_input()).unwrap();
        assert!(matches!(
            work.get_string("parent"),
            Err(SchemaError::PropertyNotFound(_))
        ));
        assert!(matches!(
            work.get_u64("title"),
            Err(SchemaError::TypeMismatch { .. })
        ));
        assert!(matches!(
            work.get_i32("version"),
            Ok(1)
        ));
    }
}
