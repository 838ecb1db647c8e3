use std::collections::HashMap;
use std::sync::RwLock;

use iscn_types::Cid;
use tracing::debug;

use crate::block::Block;
use crate::error::StoreResult;
use crate::traits::BlockStore;

/// `HashMap`-backed block store for tests and embedding.
pub struct InMemoryBlockStore {
    blocks: RwLock<HashMap<Cid, Block>>,
}

impl InMemoryBlockStore {
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.blocks.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blocks.
    pub fn total_bytes(&self) -> usize {
        self.blocks
            .read()
            .expect("lock poisoned")
            .values()
            .map(Block::len)
            .sum()
    }

    /// All stored CIDs, sorted.
    pub fn cids(&self) -> Vec<Cid> {
        let map = self.blocks.read().expect("lock poisoned");
        let mut cids: Vec<Cid> = map.keys().copied().collect();
        cids.sort();
        cids
    }
}

impl Default for InMemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn get(&self, cid: &Cid) -> StoreResult<Option<Block>> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.get(cid).cloned())
    }

    fn put(&self, block: &Block) -> StoreResult<Cid> {
        let cid = *block.cid();
        let mut map = self.blocks.write().expect("lock poisoned");
        map.entry(cid).or_insert_with(|| {
            debug!(cid = %cid.short_hex(), bytes = block.len(), "stored block");
            block.clone()
        });
        Ok(cid)
    }

    fn has(&self, cid: &Cid) -> StoreResult<bool> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.contains_key(cid))
    }

    fn delete(&self, cid: &Cid) -> StoreResult<bool> {
        let mut map = self.blocks.write().expect("lock poisoned");
        Ok(map.remove(cid).is_some())
    }
}

impl std::fmt::Debug for InMemoryBlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlockStore")
            .field("block_count", &self.len())
            .finish()
    }
}
