//! Schema engine for content-addressed ISCN documents.
//!
//! A document kind is declared once as a [`Schema`]: an ordered list of typed
//! [`Property`] handlers plus an optional cross-field validator. The
//! [`CodecRegistry`] maps codec tags to the schema versions of each kind and
//! is the entry point for both directions:
//!
//! - **encode**: fields → validate → canonical bytes → CID
//! - **decode**: bytes → validate → re-encode → CID check against the
//!   expected address
//!
//! Decoded objects can be walked with [`SchemaObject::resolve`], which stops
//! at content links and hands back a [`Link`] plus the unconsumed path.
//!
//! # Key Types
//!
//! - [`SchemaBuilder`] / [`Schema`] -- Immutable schema templates
//! - [`SchemaObject`] -- One populated document instance
//! - [`Property`] -- Closed set of handler kinds, see [`PropertyHandler`]
//! - [`CodecRegistry`] -- Versioned dispatch by codec tag
//! - [`SchemaError`] -- Everything that can go wrong, with index annotations

pub mod error;
pub mod object;
pub mod property;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{SchemaError, SchemaResult};
pub use object::SchemaObject;
pub use property::{NumberKind, Property, PropertyHandler};
pub use registry::CodecRegistry;
pub use resolve::{Link, Resolution, Resolved};
pub use schema::{ObjectFactory, Schema, SchemaBuilder, Validator};
