//! Foundation types for ISCN documents.
//!
//! This crate provides the identifier and value types shared by every other
//! ISCN crate. It performs no hashing and no canonical encoding of its own.
//!
//! # Key Types
//!
//! - [`Cid`] -- Self-describing content identifier (codec tag, hash algorithm, digest)
//! - [`HashAlgorithm`] -- Multihash algorithms a [`Cid`] may be derived with
//! - [`Value`] -- Closed variant type for field values, wire values, and custom data
//! - [`Fields`] -- Insertion-ordered string-keyed map of [`Value`]s

pub mod cid;
pub mod error;
pub mod hash;
pub mod value;
pub mod varint;

pub use cid::Cid;
pub use error::TypeError;
pub use hash::HashAlgorithm;
pub use value::{Fields, Value};
