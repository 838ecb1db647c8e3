//! One file per block, named by the CID string form.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use iscn_types::Cid;
use tracing::debug;

use crate::block::Block;
use crate::error::{StoreError, StoreResult};
use crate::traits::BlockStore;

const TMP_SUFFIX: &str = ".tmp";

/// Filesystem block store rooted at a directory.
///
/// Block bytes are re-verified against their CID on every read, so a file
/// altered on disk surfaces as [`StoreError::HashMismatch`].
#[derive(Debug, Clone)]
pub struct FsBlockStore {
    root: PathBuf,
}

impl FsBlockStore {
    /// Open a store at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, cid: &Cid) -> PathBuf {
        self.root.join(cid.to_string())
    }

    /// Every CID stored under the root, sorted. Stray files are rejected.
    pub fn cids(&self) -> StoreResult<Vec<Cid>> {
        let mut cids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(TMP_SUFFIX) {
                continue;
            }
            let cid = name.parse::<Cid>().map_err(|e| StoreError::CorruptEntry {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            cids.push(cid);
        }
        cids.sort();
        Ok(cids)
    }
}

impl BlockStore for FsBlockStore {
    fn get(&self, cid: &Cid) -> StoreResult<Option<Block>> {
        match fs::read(self.path_for(cid)) {
            Ok(data) => Block::new(*cid, data).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, block: &Block) -> StoreResult<Cid> {
        let cid = *block.cid();
        let path = self.path_for(&cid);
        if path.exists() {
            return Ok(cid);
        }
        // Write then rename so readers never see a partial block.
        let tmp = self.root.join(format!("{cid}{TMP_SUFFIX}"));
        fs::write(&tmp, block.data())?;
        fs::rename(&tmp, &path)?;
        debug!(cid = %cid.short_hex(), bytes = block.len(), "wrote block");
        Ok(cid)
    }

    fn has(&self, cid: &Cid) -> StoreResult<bool> {
        Ok(self.path_for(cid).is_file())
    }

    fn delete(&self, cid: &Cid) -> StoreResult<bool> {
        match fs::remove_file(self.path_for(cid)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
