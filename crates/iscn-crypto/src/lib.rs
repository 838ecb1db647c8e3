//! Content hashing for ISCN documents.
//!
//! Derives a [`Cid`](iscn_types::Cid) from a codec tag and the digest of a
//! document's canonical bytes, using `blake3` or `sha2`.

pub mod hasher;

pub use hasher::ContentHasher;
