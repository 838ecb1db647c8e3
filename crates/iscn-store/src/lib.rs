//! Content-addressed block storage for ISCN documents.
//!
//! Blocks are encoded documents keyed by their CID. Every backend implements
//! [`BlockStore`] and only ever hands back bytes that hash to the CID asked
//! for. [`DagWalker`] sits on top of a store and a
//! [`CodecRegistry`](iscn_schema::CodecRegistry) to load documents and follow
//! links between them.
//!
//! # Storage Backends
//!
//! - [`InMemoryBlockStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsBlockStore`] -- one file per block under a root directory

pub mod block;
pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;
pub mod walker;

pub use block::Block;
pub use error::{StoreError, StoreResult};
pub use fs::FsBlockStore;
pub use memory::InMemoryBlockStore;
pub use traits::BlockStore;
pub use walker::{DagWalker, Walk};
