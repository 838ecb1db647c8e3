//! Deterministic binary encoding for ISCN documents.
//!
//! A document on the wire is an ordered map of field name to value, written
//! as CBOR. The encoder never reorders keys: the order a schema declares is
//! part of the canonical form, and byte-identical logical input always yields
//! byte-identical output.

pub mod canonical;
pub mod error;

pub use canonical::{decode_fields, decode_value, encode_fields, encode_value};
pub use error::{CodecError, CodecResult};
