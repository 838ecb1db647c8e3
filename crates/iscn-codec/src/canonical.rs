use ciborium::value::{Integer, Value as Cbor};
use iscn_types::{Cid, Fields, Value};

use crate::error::{CodecError, CodecResult};

/// CBOR tag for content links (multiformats registry).
pub const CID_TAG: u64 = 42;

/// Encode an ordered field map to canonical bytes.
pub fn encode_fields(fields: &Fields) -> CodecResult<Vec<u8>> {
    let cbor = fields_to_cbor(fields)?;
    write(&cbor)
}

/// Decode canonical bytes into an ordered field map.
///
/// The top-level item must be a map with text keys. Key order is preserved
/// exactly as it appears on the wire.
pub fn decode_fields(data: &[u8]) -> CodecResult<Fields> {
    match decode_value(data)? {
        Value::Map(fields) => Ok(fields),
        other => Err(CodecError::NotAMap(other.type_name())),
    }
}

/// Encode any value.
pub fn encode_value(value: &Value) -> CodecResult<Vec<u8>> {
    let cbor = to_cbor(value)?;
    write(&cbor)
}

/// Decode exactly one value. Bytes left after the item are an error.
pub fn decode_value(data: &[u8]) -> CodecResult<Value> {
    let mut rest = data;
    let cbor: Cbor = ciborium::de::from_reader(&mut rest)
        .map_err(|e| CodecError::Deserialization(e.to_string()))?;
    if !rest.is_empty() {
        return Err(CodecError::TrailingBytes(rest.len()));
    }
    from_cbor(cbor)
}

fn write(cbor: &Cbor) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(cbor, &mut buf)
        .map_err(|e| CodecError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn fields_to_cbor(fields: &Fields) -> CodecResult<Cbor> {
    let entries = fields
        .iter()
        .map(|(k, v)| -> CodecResult<(Cbor, Cbor)> { Ok((Cbor::Text(k.to_string()), to_cbor(v)?)) })
        .collect::<CodecResult<Vec<_>>>()?;
    Ok(Cbor::Map(entries))
}

fn to_cbor(value: &Value) -> CodecResult<Cbor> {
    Ok(match value {
        Value::Null => Cbor::Null,
        Value::Bool(b) => Cbor::Bool(*b),
        Value::Integer(i) => {
            Cbor::Integer(Integer::try_from(*i).map_err(|_| CodecError::IntegerOutOfRange(*i))?)
        }
        Value::Float(f) => Cbor::Float(*f),
        Value::Text(s) => Cbor::Text(s.clone()),
        Value::Bytes(b) => Cbor::Bytes(b.clone()),
        Value::Link(cid) => {
            // Multibase identity prefix, as DAG-CBOR writes links.
            let mut payload = Vec::with_capacity(40);
            payload.push(0x00);
            payload.extend_from_slice(&cid.to_bytes());
            Cbor::Tag(CID_TAG, Box::new(Cbor::Bytes(payload)))
        }
        Value::Array(items) => Cbor::Array(items.iter().map(to_cbor).collect::<CodecResult<_>>()?),
        Value::Map(fields) => fields_to_cbor(fields)?,
    })
}

fn from_cbor(cbor: Cbor) -> CodecResult<Value> {
    Ok(match cbor {
        Cbor::Null => Value::Null,
        Cbor::Bool(b) => Value::Bool(b),
        Cbor::Integer(i) => Value::Integer(i128::from(i)),
        Cbor::Float(f) => Value::Float(f),
        Cbor::Text(s) => Value::Text(s),
        Cbor::Bytes(b) => Value::Bytes(b),
        Cbor::Array(items) => {
            Value::Array(items.into_iter().map(from_cbor).collect::<CodecResult<_>>()?)
        }
        Cbor::Map(entries) => {
            let mut fields = Fields::with_capacity(entries.len());
            for (k, v) in entries {
                let key = match k {
                    Cbor::Text(s) => s,
                    other => return Err(CodecError::NonTextKey(cbor_kind(&other).to_string())),
                };
                let value = from_cbor(v)?;
                if fields.contains_key(&key) {
                    return Err(CodecError::DuplicateKey(key));
                }
                fields.insert(key, value);
            }
            Value::Map(fields)
        }
        Cbor::Tag(CID_TAG, inner) => Value::Link(link_from_cbor(*inner)?),
        Cbor::Tag(tag, _) => return Err(CodecError::UnsupportedTag(tag)),
        other => return Err(CodecError::Deserialization(format!(
            "unsupported CBOR item: {}",
            cbor_kind(&other)
        ))),
    })
}

fn link_from_cbor(inner: Cbor) -> CodecResult<Cid> {
    let bytes = match inner {
        Cbor::Bytes(b) => b,
        other => {
            return Err(CodecError::MalformedLink(format!(
                "expected bytes, found {}",
                cbor_kind(&other)
            )))
        }
    };
    match bytes.split_first() {
        Some((0x00, rest)) => {
            Cid::from_bytes(rest).map_err(|e| CodecError::MalformedLink(e.to_string()))
        }
        _ => Err(CodecError::MalformedLink("missing identity prefix".into())),
    }
}

fn cbor_kind(cbor: &Cbor) -> &'static str {
    match cbor {
        Cbor::Null => "null",
        Cbor::Bool(_) => "bool",
        Cbor::Integer(_) => "integer",
        Cbor::Float(_) => "float",
        Cbor::Text(_) => "text",
        Cbor::Bytes(_) => "bytes",
        Cbor::Array(_) => "array",
        Cbor::Map(_) => "map",
        Cbor::Tag(..) => "tag",
        _ => "unknown",
    }
}
