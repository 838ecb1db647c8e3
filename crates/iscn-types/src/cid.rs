use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;
use crate::hash::HashAlgorithm;
use crate::varint::{decode_uvarint, encode_uvarint};

/// Version byte of every CID this crate produces or accepts.
const CID_VERSION: u64 = 1;

/// Multibase prefix for lowercase base16.
const MULTIBASE_BASE16: char = 'f';

/// Self-describing content identifier.
///
/// A `Cid` names a document by the codec tag of its kind, the multihash code
/// of the algorithm that produced the digest, and the digest of the
/// document's canonical bytes. Identical canonical bytes under the same codec
/// and algorithm always produce the same `Cid`.
///
/// Binary layout (CIDv1): `uvarint(1) ‖ uvarint(codec) ‖ uvarint(hash code)
/// ‖ uvarint(32) ‖ digest`. The string form is the binary form in multibase
/// base16, i.e. `'f'` followed by lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cid {
    codec: u64,
    hash_code: u64,
    digest: [u8; HashAlgorithm::DIGEST_LEN],
}

impl Cid {
    /// Assemble a CID from its parts.
    pub const fn new(codec: u64, hash: HashAlgorithm, digest: [u8; 32]) -> Self {
        Self {
            codec,
            hash_code: hash.code(),
            digest,
        }
    }

    /// The codec tag naming the document kind.
    pub fn codec(&self) -> u64 {
        self.codec
    }

    /// The multihash code of the digest algorithm.
    pub fn hash_code(&self) -> u64 {
        self.hash_code
    }

    /// The digest algorithm.
    pub fn hash_algorithm(&self) -> Result<HashAlgorithm, TypeError> {
        HashAlgorithm::from_code(self.hash_code)
    }

    /// The raw digest.
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    /// The binary form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + 8 + self.digest.len());
        encode_uvarint(CID_VERSION, &mut buf);
        encode_uvarint(self.codec, &mut buf);
        encode_uvarint(self.hash_code, &mut buf);
        encode_uvarint(self.digest.len() as u64, &mut buf);
        buf.extend_from_slice(&self.digest);
        buf
    }

    /// Parse the binary form. The whole slice must be consumed.
    pub fn from_bytes(data: &[u8]) -> Result<Self, TypeError> {
        let (version, mut offset) = decode_uvarint(data)?;
        if version != CID_VERSION {
            return Err(TypeError::UnsupportedCidVersion(version));
        }
        let (codec, len) = decode_uvarint(&data[offset..])?;
        offset += len;
        let (hash_code, len) = decode_uvarint(&data[offset..])?;
        offset += len;
        HashAlgorithm::from_code(hash_code)?;
        let (digest_len, len) = decode_uvarint(&data[offset..])?;
        offset += len;
        if digest_len != HashAlgorithm::DIGEST_LEN as u64 {
            return Err(TypeError::InvalidLength {
                expected: HashAlgorithm::DIGEST_LEN,
                actual: digest_len as usize,
            });
        }
        let rest = &data[offset..];
        if rest.len() < HashAlgorithm::DIGEST_LEN {
            return Err(TypeError::InvalidLength {
                expected: HashAlgorithm::DIGEST_LEN,
                actual: rest.len(),
            });
        }
        if rest.len() > HashAlgorithm::DIGEST_LEN {
            return Err(TypeError::TrailingBytes(rest.len() - HashAlgorithm::DIGEST_LEN));
        }
        let mut digest = [0u8; 32];
        digest.copy_from_slice(rest);
        Ok(Self {
            codec,
            hash_code,
            digest,
        })
    }

    /// The multibase string form.
    pub fn to_string_form(&self) -> String {
        let mut s = String::with_capacity(1 + 2 * (12 + self.digest.len()));
        s.push(MULTIBASE_BASE16);
        s.push_str(&hex::encode(self.to_bytes()));
        s
    }

    /// Short form for logs: the first 8 hex characters of the digest.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.digest[..4])
    }

    /// Parse the multibase string form.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let mut chars = s.chars();
        match chars.next() {
            Some(MULTIBASE_BASE16) => {}
            other => return Err(TypeError::UnsupportedMultibase(other)),
        }
        let bytes = hex::decode(chars.as_str()).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid(0x{:x}:{})", self.codec, self.short_hex())
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_form())
    }
}

impl FromStr for Cid {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Cid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_form())
    }
}

impl<'de> Deserialize<'de> for Cid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Cid {
        Cid::new(0x0264, HashAlgorithm::Blake3, [0xab; 32])
    }

    #[test]
    fn accessors() {
        let cid = sample();
        assert_eq!(cid.codec(), 0x0264);
        assert_eq!(cid.hash_code(), 0x1e);
        assert_eq!(cid.hash_algorithm().unwrap(), HashAlgorithm::Blake3);
        assert_eq!(cid.digest(), &[0xab; 32]);
    }

    #[test]
    fn binary_layout() {
        let bytes = sample().to_bytes();
        // version, codec 0x0264 as two varint bytes, hash code, digest length
        assert_eq!(&bytes[..5], &[0x01, 0xe4, 0x04, 0x1e, 0x20]);
        assert_eq!(bytes.len(), 5 + 32);
    }

    #[test]
    fn bytes_roundtrip() {
        let cid = sample();
        assert_eq!(Cid::from_bytes(&cid.to_bytes()).unwrap(), cid);
    }

    #[test]
    fn string_roundtrip() {
        let cid = sample();
        let s = cid.to_string();
        assert!(s.starts_with('f'));
        assert_eq!(s.parse::<Cid>().unwrap(), cid);
    }

    #[test]
    fn rejects_unknown_multibase() {
        let s = sample().to_string().replacen('f', "z", 1);
        assert_eq!(
            Cid::parse(&s),
            Err(TypeError::UnsupportedMultibase(Some('z')))
        );
        assert_eq!(Cid::parse(""), Err(TypeError::UnsupportedMultibase(None)));
    }

    #[test]
    fn rejects_wrong_version() {
        let mut bytes = sample().to_bytes();
        bytes[0] = 0x02;
        assert_eq!(
            Cid::from_bytes(&bytes),
            Err(TypeError::UnsupportedCidVersion(2))
        );
    }

    #[test]
    fn rejects_truncated_digest() {
        let bytes = sample().to_bytes();
        let err = Cid::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 31
            }
        );
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut bytes = sample().to_bytes();
        bytes.push(0);
        assert_eq!(Cid::from_bytes(&bytes), Err(TypeError::TrailingBytes(1)));
    }

    #[test]
    fn rejects_unknown_hash() {
        let mut bytes = sample().to_bytes();
        bytes[3] = 0x13;
        assert_eq!(Cid::from_bytes(&bytes), Err(TypeError::UnsupportedHash(0x13)));
    }

    #[test]
    fn codec_distinguishes_ids() {
        let a = Cid::new(0x0264, HashAlgorithm::Blake3, [1; 32]);
        let b = Cid::new(0x0265, HashAlgorithm::Blake3, [1; 32]);
        assert_ne!(a, b);
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn serde_uses_string_form() {
        let cid = sample();
        let json = serde_json::to_string(&cid).unwrap();
        assert_eq!(json, format!("\"{cid}\""));
        let parsed: Cid = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cid);
    }

    #[test]
    fn debug_is_short() {
        let debug = format!("{:?}", sample());
        assert_eq!(debug, "Cid(0x264:abababab)");
    }
}
