use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Multihash algorithm used to derive a [`Cid`](crate::Cid) digest.
///
/// Both supported algorithms produce 32-byte digests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashAlgorithm {
    /// BLAKE3 (multihash code `0x1e`).
    #[default]
    Blake3,
    /// SHA2-256 (multihash code `0x12`).
    #[serde(rename = "sha2-256")]
    Sha2_256,
}

impl HashAlgorithm {
    /// Length in bytes of every digest this crate handles.
    pub const DIGEST_LEN: usize = 32;

    /// The multihash code of this algorithm.
    pub const fn code(&self) -> u64 {
        match self {
            Self::Blake3 => 0x1e,
            Self::Sha2_256 => 0x12,
        }
    }

    /// Look up an algorithm by its multihash code.
    pub fn from_code(code: u64) -> Result<Self, TypeError> {
        match code {
            0x1e => Ok(Self::Blake3),
            0x12 => Ok(Self::Sha2_256),
            other => Err(TypeError::UnsupportedHash(other)),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blake3 => write!(f, "blake3"),
            Self::Sha2_256 => write!(f, "sha2-256"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_roundtrip() {
        for algo in [HashAlgorithm::Blake3, HashAlgorithm::Sha2_256] {
            assert_eq!(HashAlgorithm::from_code(algo.code()).unwrap(), algo);
        }
    }

    #[test]
    fn unknown_code() {
        assert_eq!(
            HashAlgorithm::from_code(0x13),
            Err(TypeError::UnsupportedHash(0x13))
        );
    }

    #[test]
    fn default_is_blake3() {
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Blake3);
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&HashAlgorithm::Sha2_256).unwrap();
        assert_eq!(json, "\"sha2-256\"");
        let parsed: HashAlgorithm = serde_json::from_str("\"blake3\"").unwrap();
        assert_eq!(parsed, HashAlgorithm::Blake3);
    }
}
