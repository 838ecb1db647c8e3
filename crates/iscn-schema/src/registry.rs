use std::collections::HashMap;
use std::sync::Arc;

use iscn_codec::decode_fields;
use iscn_crypto::ContentHasher;
use iscn_types::{Cid, Fields, HashAlgorithm};
use tracing::{debug, warn};

use crate::error::{SchemaError, SchemaResult};
use crate::object::SchemaObject;
use crate::property::{ContextProperty, PropertyHandler, CONTEXT_KEY};
use crate::schema::{ObjectFactory, Schema};

struct Entry {
    name: String,
    /// Index 0 is version 1.
    factories: Vec<Arc<dyn ObjectFactory>>,
}

/// Codec tag to versioned object factories.
///
/// Populated once at startup, then shared read-only; encode and decode take
/// `&self`. Every call gets its own fresh [`SchemaObject`].
pub struct CodecRegistry {
    entries: HashMap<u64, Entry>,
    hash: HashAlgorithm,
}

impl CodecRegistry {
    /// Empty registry deriving CIDs with BLAKE3.
    pub fn new() -> Self {
        Self::with_hash(HashAlgorithm::default())
    }

    /// Empty registry deriving CIDs of new encodes with `hash`.
    pub fn with_hash(hash: HashAlgorithm) -> Self {
        Self {
            entries: HashMap::new(),
            hash,
        }
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register the version factories of one codec, version 1 first.
    /// Replaces any earlier registration of the same tag.
    pub fn register_factory(
        &mut self,
        codec: u64,
        name: impl Into<String>,
        factories: Vec<Arc<dyn ObjectFactory>>,
    ) {
        let name = name.into();
        debug!(codec = codec, name = %name, versions = factories.len(), "registered codec");
        self.entries.insert(codec, Entry { name, factories });
    }

    /// Register schema templates, version 1 first.
    pub fn register_schemas(&mut self, codec: u64, name: impl Into<String>, schemas: Vec<Arc<Schema>>) {
        let factories = schemas
            .into_iter()
            .map(|s| s as Arc<dyn ObjectFactory>)
            .collect();
        self.register_factory(codec, name, factories);
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn schema_name(&self, codec: u64) -> Option<&str> {
        self.entries.get(&codec).map(|e| e.name.as_str())
    }

    /// Number of registered versions, or 0 for an unknown codec.
    pub fn version_count(&self, codec: u64) -> usize {
        self.entries.get(&codec).map_or(0, |e| e.factories.len())
    }

    /// Registered codec tags, ascending.
    pub fn codecs(&self) -> Vec<u64> {
        let mut codecs: Vec<_> = self.entries.keys().copied().collect();
        codecs.sort_unstable();
        codecs
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(_, e)| e.name == name)
            .map(|(codec, _)| *codec)
    }

    /// A fresh, undefined object of `codec` at `version` (1-based).
    pub fn instantiate(&self, codec: u64, version: u64) -> SchemaResult<SchemaObject> {
        let entry = self
            .entries
            .get(&codec)
            .ok_or(SchemaError::UnknownCodec(codec))?;
        let factory = version
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| entry.factories.get(i))
            .ok_or_else(|| SchemaError::UnimplementedVersion {
                name: entry.name.clone(),
                version,
            })?;
        let mut object = factory.instantiate();
        object.set_hash_algorithm(self.hash);
        Ok(object)
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Build, validate, and encode a document from structured fields.
    pub fn encode(&self, codec: u64, version: u64, fields: &Fields) -> SchemaResult<SchemaObject> {
        let mut object = self.instantiate(codec, version)?;
        object.set_data(fields)?;
        object.encode()?;
        Ok(object)
    }

    /// Decode canonical bytes and verify they hash to `expected`.
    ///
    /// The version comes from the wire context; the codec and hash algorithm
    /// come from `expected`. Both the re-encoded object and the supplied
    /// bytes must match `expected`, so trailing data and non-canonical
    /// encodings of the same fields are rejected.
    pub fn decode(&self, bytes: &[u8], expected: &Cid) -> SchemaResult<SchemaObject> {
        let wire = decode_fields(bytes).map_err(|e| SchemaError::MalformedWire(e.to_string()))?;
        let context = wire.get(CONTEXT_KEY).ok_or(SchemaError::MissingContext)?;
        let version = ContextProperty::read_version(context)?;
        let hash = expected
            .hash_algorithm()
            .map_err(|_| SchemaError::UnsupportedHash(expected.hash_code()))?;

        let mut object = self.instantiate(expected.codec(), version)?;
        object.set_hash_algorithm(hash);
        object.context().prototype().decode(context)?;
        object.decode(&wire)?;
        object.encode()?;

        let actual = object.cid().ok_or_else(|| {
            SchemaError::Internal("encode completed without a CID".to_string())
        })?;
        if actual != *expected {
            warn!(expected = %expected, actual = %actual, "CID mismatch on decode");
            return Err(SchemaError::CidMismatch {
                expected: *expected,
                actual,
            });
        }
        if object.raw_data() != Some(bytes) {
            let supplied = ContentHasher::new(hash).cid(expected.codec(), bytes);
            warn!(expected = %expected, supplied = %supplied, "non-canonical bytes on decode");
            return Err(SchemaError::CidMismatch {
                expected: *expected,
                actual: supplied,
            });
        }
        debug!(cid = %actual, schema = object.name(), version = version, "decoded object");
        Ok(object)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{entity_cid, registry, work_input, ENTITY, WORK};
    use iscn_codec::encode_fields;
    use iscn_types::Value;
    use proptest::prelude::*;

    #[test]
    fn roundtrip() {
        let registry = registry();
        let encoded = registry.encode(WORK, 1, &work_input()).unwrap();
        let cid = encoded.cid().unwrap();
        let decoded = registry.decode(encoded.raw_data().unwrap(), &cid).unwrap();
        assert_eq!(decoded.values(), encoded.values());
        assert_eq!(decoded.cid(), Some(cid));
        assert_eq!(decoded.get_data(), encoded.get_data());
    }

    #[test]
    fn determinism() {
        let registry = registry();
        let a = registry.encode(WORK, 1, &work_input()).unwrap();
        let b = registry.encode(WORK, 1, &work_input()).unwrap();
        assert_eq!(a.raw_data(), b.raw_data());
        assert_eq!(a.cid(), b.cid());
    }

    #[test]
    fn required_fields() {
        let registry = registry();
        let mut input = work_input();
        input.remove("timestamp");
        assert!(matches!(
            registry.encode(WORK, 1, &input),
            Err(SchemaError::MissingRequiredProperty { ref key }) if key == "timestamp"
        ));
        input.insert("timestamp", "2024-03-01T12:00:00Z");
        registry.encode(WORK, 1, &input).unwrap();
    }

    #[test]
    fn version_bounds() {
        let registry = registry();
        for version in [0, 3] {
            match registry.encode(WORK, version, &work_input()) {
                Err(SchemaError::UnimplementedVersion { name, version: v }) => {
                    assert_eq!(name, "work");
                    assert_eq!(v, version);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        let v2 = registry
            .encode(WORK, 2, &Fields::new().with("title", "Second"))
            .unwrap();
        assert_eq!(v2.version(), 2);
        assert_eq!(v2.encode_fields().unwrap().get("context"), Some(&Value::Integer(2)));
    }

    #[test]
    fn unknown_codec() {
        let registry = registry();
        assert!(matches!(
            registry.encode(0x9999, 1, &work_input()),
            Err(SchemaError::UnknownCodec(0x9999))
        ));
        let entity = registry
            .encode(ENTITY, 1, &Fields::new().with("id", "e1"))
            .unwrap();
        let bogus = Cid::new(0x9999, HashAlgorithm::Blake3, *entity.cid().unwrap().digest());
        assert!(matches!(
            registry.decode(entity.raw_data().unwrap(), &bogus),
            Err(SchemaError::UnknownCodec(0x9999))
        ));
    }

    #[test]
    fn cid_mismatch_is_an_integrity_failure() {
        let registry = registry();
        let encoded = registry.encode(WORK, 1, &work_input()).unwrap();
        let wrong = Cid::new(WORK, HashAlgorithm::Blake3, [0; 32]);
        let err = registry.decode(encoded.raw_data().unwrap(), &wrong).unwrap_err();
        assert!(err.is_integrity_failure());
        match err {
            SchemaError::CidMismatch { expected, actual } => {
                assert_eq!(expected, wrong);
                assert_eq!(Some(actual), encoded.cid());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn appended_bytes_fail_decode() {
        let registry = registry();
        let encoded = registry.encode(WORK, 1, &work_input()).unwrap();
        let cid = encoded.cid().unwrap();
        let mut bytes = encoded.raw_data().unwrap().to_vec();
        bytes.extend_from_slice(b"GARBAGE");
        assert!(matches!(
            registry.decode(&bytes, &cid),
            Err(SchemaError::MalformedWire(_))
        ));
    }

    #[test]
    fn non_canonical_bytes_fail_decode() {
        let registry = registry();
        let encoded = registry
            .encode(ENTITY, 1, &Fields::new().with("id", "e1"))
            .unwrap();
        let cid = encoded.cid().unwrap();
        let canonical = encoded.raw_data().unwrap();

        // map(2), text(7) "context", then the version 1 in its two-byte form.
        assert_eq!(&canonical[..10], &[0xa2, 0x67, b'c', b'o', b'n', b't', b'e', b'x', b't', 0x01]);
        let mut stretched = canonical[..9].to_vec();
        stretched.extend_from_slice(&[0x18, 0x01]);
        stretched.extend_from_slice(&canonical[10..]);

        match registry.decode(&stretched, &cid) {
            Err(SchemaError::CidMismatch { expected, actual }) => {
                assert_eq!(expected, cid);
                assert_eq!(actual, ContentHasher::BLAKE3.cid(ENTITY, &stretched));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decode_follows_the_expected_hash() {
        let registry = CodecRegistry {
            hash: HashAlgorithm::Sha2_256,
            ..registry()
        };
        let encoded = registry.encode(WORK, 1, &work_input()).unwrap();
        let cid = encoded.cid().unwrap();
        assert_eq!(cid.hash_algorithm().unwrap(), HashAlgorithm::Sha2_256);

        let blake = crate::testing::registry();
        let decoded = blake.decode(encoded.raw_data().unwrap(), &cid).unwrap();
        assert_eq!(decoded.cid(), Some(cid));
    }

    #[test]
    fn decode_requires_context() {
        let registry = registry();
        let bytes = encode_fields(&Fields::new().with("id", "e1")).unwrap();
        let cid = Cid::new(ENTITY, HashAlgorithm::Blake3, [0; 32]);
        assert!(matches!(
            registry.decode(&bytes, &cid),
            Err(SchemaError::MissingContext)
        ));

        let bytes = encode_fields(&Fields::new().with("context", "v1").with("id", "e1")).unwrap();
        assert!(matches!(
            registry.decode(&bytes, &cid),
            Err(SchemaError::TypeMismatch { .. })
        ));

        let bytes = encode_fields(&Fields::new().with("context", 7).with("id", "e1")).unwrap();
        assert!(matches!(
            registry.decode(&bytes, &cid),
            Err(SchemaError::UnimplementedVersion { version: 7, .. })
        ));

        assert!(matches!(
            registry.decode(&[0xff, 0x00], &cid),
            Err(SchemaError::MalformedWire(_))
        ));
    }

    #[test]
    fn decode_rejects_wire_shape_mismatch() {
        let registry = registry();
        let wire = Fields::new()
            .with("context", 1)
            .with("id", Value::Integer(5));
        let bytes = encode_fields(&wire).unwrap();
        let cid = Cid::new(ENTITY, HashAlgorithm::Blake3, [0; 32]);
        assert!(matches!(
            registry.decode(&bytes, &cid),
            Err(SchemaError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn custom_fields_survive_decode() {
        let registry = registry();
        let mut input = work_input();
        input.insert("note", "kept");
        input.insert("related", Value::Array(vec![Value::Link(entity_cid())]));
        let encoded = registry.encode(WORK, 1, &input).unwrap();
        let decoded = registry
            .decode(encoded.raw_data().unwrap(), &encoded.cid().unwrap())
            .unwrap();
        assert_eq!(decoded.custom(), encoded.custom());
        assert_eq!(decoded.custom().get("note"), Some(&Value::from("kept")));
    }

    #[test]
    fn nested_and_array_errors_keep_index() {
        let registry = registry();
        let mut input = work_input();
        input.insert(
            "tags",
            Value::Array(vec![Value::from("a"), Value::from("b"), Value::Integer(3)]),
        );
        let err = registry.encode(WORK, 1, &input).unwrap_err();
        assert_eq!(err.element_path(), vec![2]);
    }

    #[test]
    fn int32_roundtrip_at_bound() {
        let registry = registry();
        let mut input = work_input();
        input.insert("sharing", i64::from(i32::MAX));
        let encoded = registry.encode(WORK, 1, &input).unwrap();
        let decoded = registry
            .decode(encoded.raw_data().unwrap(), &encoded.cid().unwrap())
            .unwrap();
        assert_eq!(decoded.get_i32("sharing").unwrap(), i32::MAX);

        input.insert("sharing", i64::from(i32::MAX) + 1);
        assert!(matches!(
            registry.encode(WORK, 1, &input),
            Err(SchemaError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn lookup() {
        let registry = registry();
        assert_eq!(registry.codecs(), vec![WORK, ENTITY]);
        assert_eq!(registry.schema_name(WORK), Some("work"));
        assert_eq!(registry.version_count(WORK), 2);
        assert_eq!(registry.version_count(0x1), 0);
        assert_eq!(registry.lookup_by_name("entity"), Some(ENTITY));
        assert_eq!(registry.lookup_by_name("nothing"), None);
    }

    #[test]
    fn reregistration_replaces() {
        let mut registry = registry();
        registry.register_schemas(WORK, "work", vec![crate::testing::work_schema()]);
        assert_eq!(registry.version_count(WORK), 1);
        assert!(registry.encode(WORK, 2, &work_input()).is_err());
    }

    proptest! {
        #[test]
        fn encode_decode_roundtrip(
            title in "\\PC{1,40}",
            tags in proptest::collection::vec("[a-z]{0,12}", 0..6),
            sharing in any::<i32>(),
            note in proptest::option::of("[ -~]{0,20}"),
        ) {
            let registry = registry();
            let mut input = work_input()
                .with("title", title)
                .with("sharing", sharing)
                .with("tags", Value::Array(tags.into_iter().map(Value::from).collect()));
            if let Some(note) = note {
                input.insert("note", note);
            }

            let a = registry.encode(WORK, 1, &input).unwrap();
            let b = registry.encode(WORK, 1, &input).unwrap();
            prop_assert_eq!(a.raw_data(), b.raw_data());
            prop_assert_eq!(a.cid(), b.cid());

            let decoded = registry.decode(a.raw_data().unwrap(), &a.cid().unwrap()).unwrap();
            prop_assert_eq!(decoded.values(), a.values());
            prop_assert_eq!(decoded.custom(), a.custom());
        }
    }
}
