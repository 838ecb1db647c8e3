use iscn_types::varint::{decode_uvarint, decode_varint, uvarint_bytes, varint_bytes};
use iscn_types::Value;
use serde_json::Value as Json;

use super::{past_leaf, Meta, PropertyHandler};
use crate::error::{SchemaError, SchemaResult};
use crate::resolve::{Resolution, Resolved};

/// Width and signedness of a [`NumberProperty`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberKind {
    Int32,
    Uint32,
    Int64,
    Uint64,
}

impl NumberKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, Self::Int32 | Self::Int64)
    }

    /// Inclusive bounds.
    pub fn range(self) -> (i128, i128) {
        match self {
            Self::Int32 => (i32::MIN.into(), i32::MAX.into()),
            Self::Uint32 => (0, u32::MAX.into()),
            Self::Int64 => (i64::MIN.into(), i64::MAX.into()),
            Self::Uint64 => (0, u64::MAX.into()),
        }
    }

    fn contains(self, n: i128) -> bool {
        let (min, max) = self.range();
        (min..=max).contains(&n)
    }

    fn expectation(self) -> String {
        let (min, max) = self.range();
        format!("{} in [{min}, {max}]", self.name())
    }
}

/// Integer field, range-checked against its declared width.
///
/// Wire form is a byte string holding a varint: zig-zag for signed kinds,
/// plain LEB128 for unsigned ones.
#[derive(Clone, Debug)]
pub struct NumberProperty {
    meta: Meta,
    kind: NumberKind,
    value: Option<i128>,
}

impl NumberProperty {
    pub fn new(key: &str, required: bool, kind: NumberKind) -> Self {
        Self {
            meta: Meta::new(key, required),
            kind,
            value: None,
        }
    }

    pub fn kind(&self) -> NumberKind {
        self.kind
    }

    pub fn get(&self) -> Option<i128> {
        self.value
    }

    fn check(&self, n: i128) -> SchemaResult<i128> {
        if self.kind.contains(n) {
            Ok(n)
        } else {
            Err(SchemaError::type_mismatch(
                self.key(),
                self.kind.expectation(),
                n.to_string(),
            ))
        }
    }

    fn accept(&self, value: &Value) -> SchemaResult<i128> {
        match value {
            Value::Integer(n) => self.check(*n),
            // JSON input may carry integral floats such as `3.0`.
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => {
                if f.abs() > 2f64.powi(64) {
                    return Err(SchemaError::type_mismatch(
                        self.key(),
                        self.kind.expectation(),
                        f.to_string(),
                    ));
                }
                self.check(*f as i128)
            }
            Value::Float(f) => Err(SchemaError::type_mismatch(
                self.key(),
                self.kind.expectation(),
                f.to_string(),
            )),
            other => Err(self.meta.mismatch(self.kind.name(), other)),
        }
    }

    fn malformed(&self, detail: impl std::fmt::Display) -> SchemaError {
        SchemaError::MalformedWire(format!("{}: {detail}", self.key()))
    }
}

impl PropertyHandler for NumberProperty {
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
            kind: self.kind,
            value: None,
        }
    }

    fn set(&mut self, value: &Value) -> SchemaResult<()> {
        self.value = None;
        self.value = Some(self.accept(value)?);
        Ok(())
    }

    fn value(&self) -> Option<Value> {
        self.value.map(Value::Integer)
    }

    fn encode(&self) -> SchemaResult<Value> {
        let n = self.value.ok_or_else(|| self.meta.undefined())?;
        // `set` and `decode` keep `n` within the kind's range.
        let bytes = if self.kind.is_signed() {
            varint_bytes(i64::try_from(n).map_err(|_| self.meta.undefined())?)
        } else {
            uvarint_bytes(u64::try_from(n).map_err(|_| self.meta.undefined())?)
        };
        Ok(Value::Bytes(bytes))
    }

    fn decode(&mut self, wire: &Value) -> SchemaResult<Value> {
        self.value = None;
        let bytes = match wire {
            Value::Bytes(b) => b,
            other => return Err(self.meta.mismatch("bytes", other)),
        };
        let (n, read) = if self.kind.is_signed() {
            decode_varint(bytes).map(|(n, read)| (i128::from(n), read))
        } else {
            decode_uvarint(bytes).map(|(n, read)| (i128::from(n), read))
        }
        .map_err(|e| self.malformed(e))?;
        if read != bytes.len() {
            return Err(self.malformed(format!("{} trailing bytes", bytes.len() - read)));
        }
        self.value = Some(self.check(n)?);
        Ok(Value::Integer(n))
    }

    fn to_json(&self) -> Json {
        self.value().map_or(Json::Null, |v| v.to_json())
    }

    fn resolve<'a>(&'a self, path: &[&str]) -> SchemaResult<Resolution<'a>> {
        if !path.is_empty() {
            return Err(past_leaf(self.key(), path));
        }
        let value = self.value().ok_or_else(|| SchemaError::NoSuchLink(self.key().into()))?;
        Ok(Resolution::done(Resolved::Value(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(kind: NumberKind, n: i128) -> i128 {
        let mut h = NumberProperty::new("n", true, kind);
        h.set(&Value::Integer(n)).unwrap();
        let wire = h.encode().unwrap();
        let mut fresh = h.prototype();
        match fresh.decode(&wire).unwrap() {
            Value::Integer(decoded) => decoded,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn int32_bounds() {
        let mut h = NumberProperty::new("n", true, NumberKind::Int32);
        let max = i128::from(i32::MAX);
        h.set(&Value::Integer(max)).unwrap();
        assert_eq!(roundtrip(NumberKind::Int32, max), max);

        let err = h.set(&Value::Integer(max + 1)).unwrap_err();
        match err {
            SchemaError::TypeMismatch {
                key,
                expected,
                actual,
            } => {
                assert_eq!(key, "n");
                assert_eq!(expected, "int32 in [-2147483648, 2147483647]");
                assert_eq!(actual, "2147483648");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!h.is_defined());
        assert_eq!(roundtrip(NumberKind::Int32, i128::from(i32::MIN)), i128::from(i32::MIN));
    }

    #[test]
    fn unsigned_rejects_negative() {
        let mut h = NumberProperty::new("sharing", true, NumberKind::Uint32);
        assert!(matches!(
            h.set(&Value::Integer(-1)),
            Err(SchemaError::TypeMismatch { .. })
        ));
        assert!(h.set(&Value::Integer(i128::from(u32::MAX) + 1)).is_err());
        assert_eq!(roundtrip(NumberKind::Uint64, u64::MAX.into()), u64::MAX.into());
    }

    #[test]
    fn signed_wire_is_zigzag() {
        let mut h = NumberProperty::new("n", true, NumberKind::Int64);
        h.set(&Value::Integer(-1)).unwrap();
        assert_eq!(h.encode().unwrap(), Value::Bytes(vec![0x01]));
        h.set(&Value::Integer(1)).unwrap();
        assert_eq!(h.encode().unwrap(), Value::Bytes(vec![0x02]));
    }

    #[test]
    fn unsigned_wire_is_leb128() {
        let mut h = NumberProperty::new("version", true, NumberKind::Uint64);
        h.set(&Value::Integer(300)).unwrap();
        assert_eq!(h.encode().unwrap(), Value::Bytes(vec![0xac, 0x02]));
    }

    #[test]
    fn integral_floats_accepted() {
        let mut h = NumberProperty::new("n", true, NumberKind::Uint32);
        h.set(&Value::Float(3.0)).unwrap();
        assert_eq!(h.get(), Some(3));
        assert!(h.set(&Value::Float(3.5)).is_err());
        assert!(h.set(&Value::Float(f64::INFINITY)).is_err());
    }

    #[test]
    fn decode_rejects_bad_wire() {
        let mut h = NumberProperty::new("n", true, NumberKind::Uint32);
        assert!(matches!(
            h.decode(&Value::Integer(1)),
            Err(SchemaError::TypeMismatch { .. })
        ));
        assert!(matches!(
            h.decode(&Value::Bytes(vec![0x80])),
            Err(SchemaError::MalformedWire(_))
        ));
        assert!(matches!(
            h.decode(&Value::Bytes(vec![0x01, 0x00])),
            Err(SchemaError::MalformedWire(_))
        ));
        // In range for the varint, out of range for the kind.
        let wire = Value::Bytes(uvarint_bytes(u64::from(u32::MAX) + 1));
        assert!(matches!(h.decode(&wire), Err(SchemaError::TypeMismatch { .. })));
        assert!(!h.is_defined());
    }

    #[test]
    fn non_numbers_rejected() {
        let mut h = NumberProperty::new("n", true, NumberKind::Int64);
        let err = h.set(&Value::from("12")).unwrap_err();
        assert_eq!(err.to_string(), "n: int64 is expected but text is found");
    }
}
