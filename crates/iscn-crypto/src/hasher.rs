use iscn_types::{Cid, HashAlgorithm};
use sha2::{Digest, Sha256};

/// Content hasher bound to one multihash algorithm.
///
/// The codec tag is not mixed into the digest; it travels in the [`Cid`]
/// alongside it. Two documents of different kinds with identical canonical
/// bytes therefore share a digest but never a `Cid`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    algorithm: HashAlgorithm,
}

impl ContentHasher {
    /// BLAKE3 hasher.
    pub const BLAKE3: Self = Self {
        algorithm: HashAlgorithm::Blake3,
    };
    /// SHA2-256 hasher.
    pub const SHA2_256: Self = Self {
        algorithm: HashAlgorithm::Sha2_256,
    };

    pub const fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// The algorithm this hasher applies.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Raw digest of `data`.
    pub fn digest(&self, data: &[u8]) -> [u8; 32] {
        match self.algorithm {
            HashAlgorithm::Blake3 => *blake3::hash(data).as_bytes(),
            HashAlgorithm::Sha2_256 => Sha256::digest(data).into(),
        }
    }

    /// Derive the CID of `data` for a document of kind `codec`.
    pub fn cid(&self, codec: u64, data: &[u8]) -> Cid {
        Cid::new(codec, self.algorithm, self.digest(data))
    }

    /// Verify that `data` hashes to `expected` under the algorithm and codec
    /// recorded in `expected` itself.
    ///
    /// Returns `false` when `expected` names an algorithm this crate does not
    /// support.
    pub fn verify(data: &[u8], expected: &Cid) -> bool {
        match expected.hash_algorithm() {
            Ok(algorithm) => Self::new(algorithm).cid(expected.codec(), data) == *expected,
            Err(_) => false,
        }
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::BLAKE3
    }
}
