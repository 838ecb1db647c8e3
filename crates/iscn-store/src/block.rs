use iscn_crypto::ContentHasher;
use iscn_types::Cid;

use crate::error::{StoreError, StoreResult};

/// Encoded document bytes together with the CID they hash to.
///
/// A `Block` can only be built from bytes that verify against the CID, so
/// every block held by a store is known to be intact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    cid: Cid,
    data: Vec<u8>,
}

impl Block {
    /// Pair `data` with `cid`, checking the digest.
    pub fn new(cid: Cid, data: Vec<u8>) -> StoreResult<Self> {
        if cid.hash_algorithm().is_err() {
            return Err(StoreError::UnsupportedHash(cid));
        }
        if !ContentHasher::verify(&data, &cid) {
            return Err(StoreError::HashMismatch(cid));
        }
        Ok(Self { cid, data })
    }

    /// Hash `data` as a document of kind `codec`.
    pub fn from_data(hasher: &ContentHasher, codec: u64, data: Vec<u8>) -> Self {
        Self {
            cid: hasher.cid(codec, &data),
            data,
        }
    }

    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iscn_types::HashAlgorithm;

    #[test]
    fn verifies_on_construction() {
        let hasher = ContentHasher::default();
        let block = Block::from_data(&hasher, 0x0268, b"payload".to_vec());
        let again = Block::new(*block.cid(), b"payload".to_vec()).unwrap();
        assert_eq!(again, block);
        assert_eq!(again.len(), 7);

        assert!(matches!(
            Block::new(*block.cid(), b"tampered".to_vec()),
            Err(StoreError::HashMismatch(_))
        ));
    }

    #[test]
    fn sha2_blocks_verify() {
        let hasher = ContentHasher::new(HashAlgorithm::Sha2_256);
        let block = Block::from_data(&hasher, 0x0264, vec![1, 2, 3]);
        Block::new(*block.cid(), vec![1, 2, 3]).unwrap();
    }

    #[test]
    fn codec_is_part_of_the_address() {
        let hasher = ContentHasher::default();
        let block = Block::from_data(&hasher, 0x0268, b"payload".to_vec());
        let other = Cid::new(0x0264, HashAlgorithm::Blake3, *block.cid().digest());
        assert!(Block::new(other, b"payload".to_vec()).is_err());
    }
}
