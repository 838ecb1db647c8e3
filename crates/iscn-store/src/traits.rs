use iscn_types::Cid;

use crate::block::Block;
use crate::error::{StoreError, StoreResult};

/// Content-addressed block store.
///
/// Implementations only ever hold verified [`Block`]s, so a block returned
/// from `get` hashes to the CID it was asked for. Writes are idempotent: the
/// same CID always names the same bytes.
pub trait BlockStore: Send + Sync {
    /// Read a block by CID. Returns `Ok(None)` if it is not stored.
    fn get(&self, cid: &Cid) -> StoreResult<Option<Block>>;

    /// Store a block and return its CID. Storing a present block is a no-op.
    fn put(&self, block: &Block) -> StoreResult<Cid>;

    /// Check whether a block is stored.
    fn has(&self, cid: &Cid) -> StoreResult<bool>;

    /// Remove a block. Returns `true` if it existed.
    fn delete(&self, cid: &Cid) -> StoreResult<bool>;

    /// Read a block that must exist.
    fn require(&self, cid: &Cid) -> StoreResult<Block> {
        self.get(cid)?.ok_or(StoreError::NotFound(*cid))
    }

    /// Read several blocks. Default implementation calls `get()` for each.
    fn get_many(&self, cids: &[Cid]) -> StoreResult<Vec<Option<Block>>> {
        cids.iter().map(|cid| self.get(cid)).collect()
    }

    /// Store several blocks. Default implementation calls `put()` for each.
    fn put_many(&self, blocks: &[Block]) -> StoreResult<Vec<Cid>> {
        blocks.iter().map(|block| self.put(block)).collect()
    }
}
