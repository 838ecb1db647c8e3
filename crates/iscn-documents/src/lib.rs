//! ISCN document kinds.
//!
//! One module per kind, each exposing its schema versions. A complete ISCN
//! record is a graph: a kernel links to a rights list, a stakeholders list,
//! and a content description, and those link on to entities.
//!
//! ```
//! use iscn_documents::{codec, default_registry};
//! use iscn_types::Fields;
//!
//! let registry = default_registry().unwrap();
//! let entity = registry
//!     .encode(codec::ENTITY, 1, &Fields::new().with("id", "likecoin:alice"))
//!     .unwrap();
//! assert_eq!(entity.cid().unwrap().codec(), codec::ENTITY);
//! ```

pub mod codec;
pub mod content;
pub mod entity;
pub mod kernel;
pub mod right;
pub mod rights;
pub mod stakeholder;
pub mod stakeholders;
pub mod time_period;

use iscn_schema::{CodecRegistry, SchemaResult};
use iscn_types::HashAlgorithm;
use tracing::debug;

/// Register every ISCN document kind.
pub fn register_all(registry: &mut CodecRegistry) -> SchemaResult<()> {
    registry.register_schemas(codec::KERNEL, kernel::SCHEMA_NAME, kernel::schemas()?);
    registry.register_schemas(codec::RIGHTS, rights::SCHEMA_NAME, rights::schemas()?);
    registry.register_schemas(
        codec::STAKEHOLDERS,
        stakeholders::SCHEMA_NAME,
        stakeholders::schemas()?,
    );
    registry.register_schemas(codec::CONTENT, content::SCHEMA_NAME, content::schemas()?);
    registry.register_schemas(codec::ENTITY, entity::SCHEMA_NAME, entity::schemas()?);
    registry.register_schemas(codec::RIGHT, right::SCHEMA_NAME, right::schemas()?);
    registry.register_schemas(
        codec::STAKEHOLDER,
        stakeholder::SCHEMA_NAME,
        stakeholder::schemas()?,
    );
    registry.register_schemas(
        codec::TIME_PERIOD,
        time_period::SCHEMA_NAME,
        time_period::schemas()?,
    );
    debug!(kinds = codec::ALL.len(), "registered ISCN document kinds");
    Ok(())
}

/// A registry holding every ISCN document kind, hashing with BLAKE3.
pub fn default_registry() -> SchemaResult<CodecRegistry> {
    registry_with_hash(HashAlgorithm::default())
}

/// A registry holding every ISCN document kind, hashing with `hash`.
pub fn registry_with_hash(hash: HashAlgorithm) -> SchemaResult<CodecRegistry> {
    let mut registry = CodecRegistry::with_hash(hash);
    register_all(&mut registry)?;
    Ok(registry)
}
